//! Storage abstractions for consent string persistence.
//!
//! Consent strings are stored under string keys: the TC string under the
//! configured cookie name (`euconsent-v2` by default) and the AC string
//! under its own key (`addtl_consent`).
//!
//! ## Directory Structure (`LocalStorage`)
//!
//! ```text
//! storage/
//! ├── euconsent-v2          # TC string
//! └── addtl_consent         # AC string
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Trait for key-value persistence backends.
#[async_trait]
pub trait ConsentStorage: Send + Sync {
    /// Read a value, `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read a value, treating backend failures as absence.
pub async fn get_or_absent(storage: &dyn ConsentStorage, key: &str) -> Option<String> {
    match storage.get(key).await {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to read '{}' from storage: {}", key, e);
            None
        }
    }
}

/// Write a value, logging backend failures. Returns whether it was stored.
pub async fn set_or_log(storage: &dyn ConsentStorage, key: &str, value: &str) -> bool {
    match storage.set(key, value).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to write '{}' to storage: {}", key, e);
            false
        }
    }
}
