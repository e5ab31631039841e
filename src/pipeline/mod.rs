//! Consent flow entry points.
//!
//! - `load_sources`: Fetch the vendor list and the Google provider list
//! - `ConsentGenerator`: Build choices, apply the user's decision, persist strings

pub mod context;
pub mod generator;

pub use context::{ConsentContext, ConsentSources, StoredConsent, load_sources};
pub use generator::{ChoicesRenderer, ConsentGenerator, ConsentStrings, UserDecision};
