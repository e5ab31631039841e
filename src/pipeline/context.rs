// src/pipeline/context.rs

//! Inputs of one consent flow.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{AcModel, Config, GlobalVendorList, TcModel};
use crate::services::{AcModelService, SourceFetcher, load_vendor_list};

/// Vendor list and AC model fetched for a flow.
#[derive(Debug, Clone)]
pub struct ConsentSources {
    pub gvl: Arc<GlobalVendorList>,
    pub ac_model: AcModel,
}

/// Fetch the vendor list and the Google provider list concurrently.
///
/// The vendor list is required; without the provider list the flow
/// continues with an empty AC model.
pub async fn load_sources(
    config: &Config,
    fetcher: &dyn SourceFetcher,
    stored_ac: Option<&str>,
) -> Result<ConsentSources> {
    let ac_service = AcModelService::new(config.sources.ac_version);

    let (gvl, ac_model) = futures::join!(
        load_vendor_list(fetcher, &config.sources.gvl),
        ac_service.load(fetcher, &config.sources.google_vendors, stored_ac)
    );

    Ok(ConsentSources {
        gvl: Arc::new(gvl?),
        ac_model,
    })
}

/// Consent strings as read from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredConsent {
    pub tc: Option<String>,
    pub ac: Option<String>,
}

impl StoredConsent {
    /// Whether both strings are present and non-empty.
    pub fn is_complete(&self) -> bool {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.tc) && present(&self.ac)
    }

    pub fn tc(&self) -> Option<&str> {
        self.tc.as_deref().filter(|s| !s.is_empty())
    }

    pub fn ac(&self) -> Option<&str> {
        self.ac.as_deref().filter(|s| !s.is_empty())
    }
}

/// Everything a consent flow works on.
#[derive(Debug, Clone)]
pub struct ConsentContext {
    pub tc_model: TcModel,
    pub ac_model: AcModel,
    /// No usable TC string was stored
    pub first_time: bool,
}

impl ConsentContext {
    pub fn new(tc_model: TcModel, ac_model: AcModel, first_time: bool) -> Self {
        Self {
            tc_model,
            ac_model,
            first_time,
        }
    }

    /// Context for a user without stored consent.
    pub fn fresh(config: &Config, sources: ConsentSources) -> Self {
        let tc_model = TcModel::with_cmp(sources.gvl, &config.cmp);
        Self::new(tc_model, sources.ac_model, true)
    }

    pub fn gvl(&self) -> &GlobalVendorList {
        self.tc_model.gvl()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;

    struct MapFetcher {
        gvl: Option<&'static str>,
        google: Option<&'static str>,
    }

    #[async_trait]
    impl SourceFetcher for MapFetcher {
        async fn fetch_text(&self, location: &str) -> Result<String> {
            let body = if location.contains("vendor-list") {
                self.gvl
            } else {
                self.google
            };
            body.map(str::to_string)
                .ok_or_else(|| AppError::config(format!("{location} unreachable")))
        }
    }

    const GVL: &str = r#"{"vendorListVersion": 9, "purposes": {"1": {"id": 1, "name": "Store"}}}"#;
    const GOOGLE: &str = r#"[{"provider_id": 3, "provider_name": "P", "policy_url": "u", "domains": "d"}]"#;

    #[tokio::test]
    async fn test_load_sources() {
        let fetcher = MapFetcher {
            gvl: Some(GVL),
            google: Some(GOOGLE),
        };
        let sources = load_sources(&Config::default(), &fetcher, Some("1~3"))
            .await
            .unwrap();

        assert_eq!(sources.gvl.vendor_list_version, 9);
        assert_eq!(sources.ac_model.enabled_ids(), vec![3]);
    }

    #[tokio::test]
    async fn test_google_list_failure_is_not_fatal() {
        let fetcher = MapFetcher {
            gvl: Some(GVL),
            google: None,
        };
        let sources = load_sources(&Config::default(), &fetcher, None).await.unwrap();
        assert!(sources.ac_model.is_empty());
    }

    #[tokio::test]
    async fn test_vendor_list_failure_is_fatal() {
        let fetcher = MapFetcher {
            gvl: None,
            google: Some(GOOGLE),
        };
        assert!(load_sources(&Config::default(), &fetcher, None).await.is_err());
    }

    #[test]
    fn test_stored_consent_completeness() {
        let mut stored = StoredConsent::default();
        assert!(!stored.is_complete());

        stored.tc = Some("CP".to_string());
        stored.ac = Some(String::new());
        assert!(!stored.is_complete());
        assert_eq!(stored.ac(), None);

        stored.ac = Some("1~".to_string());
        assert!(stored.is_complete());
    }
}
