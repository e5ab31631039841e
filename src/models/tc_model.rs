//! IAB TCF consent model.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{CmpConfig, GlobalVendorList};

/// The consent state encoded into a TC string.
///
/// The vendor list is shared, so cloning a model is cheap.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TcModel {
    #[serde(skip)]
    gvl: Arc<GlobalVendorList>,

    pub cmp_id: u16,
    pub cmp_version: u16,
    pub consent_screen: u8,
    pub consent_language: String,
    pub publisher_country_code: String,
    pub is_service_specific: bool,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,

    pub purpose_consents: BTreeSet<u32>,
    pub purpose_legitimate_interests: BTreeSet<u32>,
    pub vendor_consents: BTreeSet<u32>,
    pub vendor_legitimate_interests: BTreeSet<u32>,
    pub special_feature_optins: BTreeSet<u32>,
    pub publisher_consents: BTreeSet<u32>,
    pub publisher_legitimate_interests: BTreeSet<u32>,
}

impl TcModel {
    /// Create an empty model bound to a vendor list.
    pub fn new(gvl: Arc<GlobalVendorList>) -> Self {
        let now = Utc::now();
        Self {
            gvl,
            cmp_id: 0,
            cmp_version: 0,
            consent_screen: 0,
            consent_language: "EN".to_string(),
            publisher_country_code: "AA".to_string(),
            is_service_specific: false,
            created: now,
            last_updated: now,
            purpose_consents: BTreeSet::new(),
            purpose_legitimate_interests: BTreeSet::new(),
            vendor_consents: BTreeSet::new(),
            vendor_legitimate_interests: BTreeSet::new(),
            special_feature_optins: BTreeSet::new(),
            publisher_consents: BTreeSet::new(),
            publisher_legitimate_interests: BTreeSet::new(),
        }
    }

    /// Create an empty model carrying the CMP metadata from configuration.
    pub fn with_cmp(gvl: Arc<GlobalVendorList>, cmp: &CmpConfig) -> Self {
        Self {
            cmp_id: cmp.cmp_id,
            cmp_version: cmp.cmp_version,
            consent_screen: cmp.consent_screen,
            consent_language: cmp.consent_language.to_uppercase(),
            publisher_country_code: cmp.publisher_country_code.to_uppercase(),
            is_service_specific: cmp.is_service_specific,
            ..Self::new(gvl)
        }
    }

    pub fn gvl(&self) -> &GlobalVendorList {
        &self.gvl
    }

    /// Shared handle to the vendor list, for building sibling models.
    pub fn gvl_handle(&self) -> Arc<GlobalVendorList> {
        Arc::clone(&self.gvl)
    }

    pub fn vendor_list_version(&self) -> u32 {
        self.gvl.vendor_list_version
    }

    pub fn policy_version(&self) -> u32 {
        self.gvl.tcf_policy_version
    }

    /// Clear every consent and legitimate-interest set.
    pub fn unset_all(&mut self) {
        self.purpose_consents.clear();
        self.purpose_legitimate_interests.clear();
        self.vendor_consents.clear();
        self.vendor_legitimate_interests.clear();
        self.special_feature_optins.clear();
        self.publisher_consents.clear();
        self.publisher_legitimate_interests.clear();
    }

    pub fn set_all_vendor_consents(&mut self) {
        self.vendor_consents = self.gvl.vendors.keys().copied().collect();
    }

    pub fn set_all_vendor_legitimate_interests(&mut self) {
        self.vendor_legitimate_interests = self.gvl.vendors.keys().copied().collect();
    }

    pub fn set_all_purpose_consents(&mut self) {
        self.purpose_consents = self.gvl.purposes.keys().copied().collect();
    }

    pub fn set_all_purpose_legitimate_interests(&mut self) {
        self.purpose_legitimate_interests = self.gvl.purposes.keys().copied().collect();
    }

    pub fn set_all_special_feature_optins(&mut self) {
        self.special_feature_optins = self.gvl.special_features.keys().copied().collect();
    }

    /// Enable every vendor, purpose and special feature.
    ///
    /// Publisher consents and publisher legitimate interests are left
    /// untouched; callers that want them populated copy them over.
    pub fn set_all(&mut self) {
        self.set_all_vendor_consents();
        self.set_all_purpose_legitimate_interests();
        self.set_all_special_feature_optins();
        self.set_all_purpose_consents();
        self.set_all_vendor_legitimate_interests();
    }

    /// Mark the model as updated now.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}
