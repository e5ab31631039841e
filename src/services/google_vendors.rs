// src/services/google_vendors.rs

//! Builds the Additional Consent model from Google's provider list.

use std::collections::{BTreeSet, HashSet};

use crate::error::Result;
use crate::models::{AcModel, GoogleProvider, GoogleVendorOption};
use crate::services::ac_string::AcString;
use crate::services::sources::SourceFetcher;

/// Parse the provider list.
///
/// Decoding is all-or-nothing: a single entry with a missing or mistyped
/// field rejects the whole list.
pub fn parse_google_vendor_list(json: &str) -> Result<Vec<GoogleProvider>> {
    Ok(serde_json::from_str(json)?)
}

/// Service producing [`AcModel`]s for one AC specification version.
#[derive(Debug, Clone, Copy)]
pub struct AcModelService {
    version: u32,
}

impl AcModelService {
    pub fn new(version: u32) -> Self {
        Self { version }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Build a model from the provider list, restoring opt-ins from a
    /// stored AC string when it is valid.
    pub fn build(&self, providers: Vec<GoogleProvider>, stored: Option<&str>) -> AcModel {
        let mut seen = HashSet::new();
        let mut options: Vec<GoogleVendorOption> = providers
            .into_iter()
            .filter(|provider| seen.insert(provider.provider_id))
            .map(GoogleVendorOption::from_provider)
            .collect();

        if let Some(encoded) = stored.filter(|s| !s.is_empty()) {
            match AcString::parse_versioned(encoded, self.version) {
                Ok(ac_string) => {
                    let enabled: BTreeSet<u32> = ac_string.provider_ids.into_iter().collect();
                    for option in &mut options {
                        option.state = enabled.contains(&option.id);
                    }
                    let unknown = enabled.iter().filter(|id| !seen.contains(*id)).count();
                    if unknown > 0 {
                        log::debug!("Dropped {} AC provider id(s) missing from the provider list", unknown);
                    }
                }
                Err(e) => log::debug!("Ignoring stored AC string: {}", e),
            }
        }

        AcModel::new(self.version, options)
    }

    /// Fetch the provider list and build the model.
    ///
    /// Any fetch or decode failure yields an empty model.
    pub async fn load(&self, fetcher: &dyn SourceFetcher, source: &str, stored: Option<&str>) -> AcModel {
        let providers = match fetcher.fetch_text(source).await {
            Ok(json) => parse_google_vendor_list(&json),
            Err(e) => Err(e),
        };

        match providers {
            Ok(providers) => {
                let model = self.build(providers, stored);
                log::info!("Loaded {} Google providers", model.google_vendor_options().len());
                model
            }
            Err(e) => {
                log::debug!("Google provider list unavailable from {}: {}", source, e);
                AcModel::empty(self.version)
            }
        }
    }
}
