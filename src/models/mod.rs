// src/models/mod.rs

//! Domain models for the consent platform.
//!
//! This module contains the vendor list, the two consent models, the
//! choice bundle exchanged with the UI and the configuration.

mod ac_model;
mod choices;
mod config;
mod gvl;
mod tc_model;

// Re-export all public types
pub use ac_model::{AcModel, GoogleProvider, GoogleVendorOption};
pub use choices::{
    ChoicesBridgeDto, DeclarationRef, PurposeChoice, SpecialFeatureChoice, VendorChoice,
    VendorRef,
};
pub use config::{CmpConfig, Config, HttpConfig, PolicyConfig, SourcesConfig, StorageConfig};
pub use gvl::{GlobalVendorList, GvlDeclaration, Vendor};
pub use tc_model::TcModel;

/// Purpose 1 (store and/or access information on a device). It can never
/// rest on legitimate interest.
pub const PURPOSE_ONE: u32 = 1;
