// src/services/mod.rs

//! Service layer for the consent platform.
//!
//! - `ChoiceBridgeBuilder`: consent models to UI choices
//! - `ChoicesParser`: UI choices back to consent models
//! - `AcModelService`: Google provider list to AC model

pub mod ac_string;
pub mod builder;
pub mod codec;
pub mod google_vendors;
pub mod parser;
pub mod policy;
pub mod sources;

pub use ac_string::{AcString, build_ac_string};
pub use builder::ChoiceBridgeBuilder;
pub use codec::{ConsentStringCodec, NoTcStringCodec, encode_or_empty};
pub use google_vendors::{AcModelService, parse_google_vendor_list};
pub use parser::ChoicesParser;
pub use policy::{AcceptAllLegInt, LegIntDefault, LegIntSource, LegalBasisFlags, LegalBasisPolicy};
pub use sources::{DefaultFetcher, SourceFetcher, SourceLocation, load_vendor_list};
