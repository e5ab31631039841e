//! Google Additional Consent model.

use serde::{Deserialize, Serialize};

/// One entry of the Google ad-tech provider list, as published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoogleProvider {
    pub provider_id: u32,
    pub provider_name: String,
    pub policy_url: String,
    pub domains: String,
}

/// Opt-in state of one Google ad-tech provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleVendorOption {
    pub id: u32,
    pub name: String,
    pub policy_url: String,
    pub domains: String,
    #[serde(default)]
    pub state: bool,
}

impl GoogleVendorOption {
    /// Build a disabled option from a provider list entry.
    pub fn from_provider(provider: GoogleProvider) -> Self {
        Self {
            id: provider.provider_id,
            name: provider.provider_name,
            policy_url: provider.policy_url,
            domains: provider.domains,
            state: false,
        }
    }
}

/// The Additional Consent snapshot: every known provider and whether the
/// user opted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcModel {
    version: u32,
    google_vendor_options: Vec<GoogleVendorOption>,
}

impl AcModel {
    pub fn new(version: u32, google_vendor_options: Vec<GoogleVendorOption>) -> Self {
        Self {
            version,
            google_vendor_options,
        }
    }

    /// A model with no providers, used when the provider list is unavailable.
    pub fn empty(version: u32) -> Self {
        Self::new(version, Vec::new())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn google_vendor_options(&self) -> &[GoogleVendorOption] {
        &self.google_vendor_options
    }

    pub fn google_vendor_options_mut(&mut self) -> &mut [GoogleVendorOption] {
        &mut self.google_vendor_options
    }

    pub fn set_google_vendor_options(&mut self, options: Vec<GoogleVendorOption>) {
        self.google_vendor_options = options;
    }

    /// Ids of opted-in providers, ascending.
    pub fn enabled_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .google_vendor_options
            .iter()
            .filter(|option| option.state)
            .map(|option| option.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.google_vendor_options.is_empty()
    }
}
