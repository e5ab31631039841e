//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::LegalBasisFlags;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// CMP identity written into every TC string
    #[serde(default)]
    pub cmp: CmpConfig,

    /// Legitimate-interest handling
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Where the vendor lists come from
    #[serde(default)]
    pub sources: SourcesConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Consent string persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.cmp.cmp_id <= 1 {
            return Err(AppError::validation("cmp.cmp_id must be > 1"));
        }
        if !is_two_letter_code(&self.cmp.consent_language) {
            return Err(AppError::validation(
                "cmp.consent_language must be a two-letter code",
            ));
        }
        if !is_two_letter_code(&self.cmp.publisher_country_code) {
            return Err(AppError::validation(
                "cmp.publisher_country_code must be a two-letter code",
            ));
        }
        if self.sources.gvl.trim().is_empty() {
            return Err(AppError::validation("sources.gvl is empty"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.storage.tc_key.trim().is_empty() || self.storage.ac_key.trim().is_empty() {
            return Err(AppError::validation("storage keys must not be empty"));
        }
        if self.storage.tc_key == self.storage.ac_key {
            return Err(AppError::validation(
                "storage.tc_key and storage.ac_key must differ",
            ));
        }
        Ok(())
    }
}

fn is_two_letter_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// CMP identity and publisher metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmpConfig {
    /// IAB-registered CMP id
    #[serde(default)]
    pub cmp_id: u16,

    #[serde(default = "defaults::cmp_version")]
    pub cmp_version: u16,

    #[serde(default)]
    pub consent_screen: u8,

    #[serde(default = "defaults::consent_language")]
    pub consent_language: String,

    #[serde(default = "defaults::publisher_country_code")]
    pub publisher_country_code: String,

    #[serde(default)]
    pub is_service_specific: bool,
}

impl Default for CmpConfig {
    fn default() -> Self {
        Self {
            cmp_id: 0,
            cmp_version: defaults::cmp_version(),
            consent_screen: 0,
            consent_language: defaults::consent_language(),
            publisher_country_code: defaults::publisher_country_code(),
            is_service_specific: false,
        }
    }
}

/// Legitimate-interest policy switches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Never signal legitimate interest on "accept all"
    #[serde(default)]
    pub legitimate_interest_disabled: bool,

    /// Derive legitimate interest from the consent choices
    #[serde(default)]
    pub legitimate_mirror: bool,
}

impl PolicyConfig {
    /// Policy flags for a consent flow.
    pub fn flags(&self, first_time: bool) -> LegalBasisFlags {
        LegalBasisFlags {
            first_time,
            legitimate_interest_disabled: self.legitimate_interest_disabled,
            legitimate_mirror: self.legitimate_mirror,
        }
    }
}

/// Vendor list locations. Each may be an http(s) URL, a file URL or a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "defaults::gvl")]
    pub gvl: String,

    #[serde(default = "defaults::google_vendors")]
    pub google_vendors: String,

    /// Additional Consent specification version
    #[serde(default = "defaults::ac_version")]
    pub ac_version: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            gvl: defaults::gvl(),
            google_vendors: defaults::google_vendors(),
            ac_version: defaults::ac_version(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Consent string persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for file-backed storage
    #[serde(default = "defaults::storage_dir")]
    pub dir: String,

    /// Key of the TC string
    #[serde(default = "defaults::tc_key")]
    pub tc_key: String,

    /// Key of the AC string
    #[serde(default = "defaults::ac_key")]
    pub ac_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::storage_dir(),
            tc_key: defaults::tc_key(),
            ac_key: defaults::ac_key(),
        }
    }
}

mod defaults {
    // CMP defaults
    pub fn cmp_version() -> u16 {
        1
    }
    pub fn consent_language() -> String {
        "EN".into()
    }
    pub fn publisher_country_code() -> String {
        "AA".into()
    }

    // Source defaults
    pub fn gvl() -> String {
        "https://vendor-list.consensu.org/v3/vendor-list.json".into()
    }
    pub fn google_vendors() -> String {
        "data/google-vendors.json".into()
    }
    pub fn ac_version() -> u32 {
        1
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; tcf-cmp/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }

    // Storage defaults
    pub fn storage_dir() -> String {
        "storage".into()
    }
    pub fn tc_key() -> String {
        "euconsent-v2".into()
    }
    pub fn ac_key() -> String {
        "addtl_consent".into()
    }
}
