//! IAB Global Vendor List data structures.
//!
//! Maps are keyed by numeric id and therefore iterate in ascending id
//! order, which is the order the choice screens render in.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A purpose, special purpose, feature or special feature declared by the GVL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GvlDeclaration {
    pub id: u32,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Legal text. Older lists call this `descriptionLegal`, newer ones
    /// only ship `illustrations`.
    #[serde(default, alias = "descriptionLegal")]
    pub legal_description: String,
}

/// A vendor registered in the GVL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: u32,
    pub name: String,

    #[serde(default)]
    pub purposes: Vec<u32>,

    #[serde(default)]
    pub leg_int_purposes: Vec<u32>,

    #[serde(default)]
    pub flexible_purposes: Vec<u32>,

    #[serde(default)]
    pub special_purposes: Vec<u32>,

    #[serde(default)]
    pub features: Vec<u32>,

    #[serde(default)]
    pub special_features: Vec<u32>,

    #[serde(default)]
    pub policy_url: String,

    /// `None` when absent, null, negative or not a number.
    #[serde(default, deserialize_with = "cookie_max_age")]
    pub cookie_max_age_seconds: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_date: Option<String>,
}

fn cookie_max_age<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|secs| secs.is_finite() && *secs >= 0.0))
}

/// The Global Vendor List.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GlobalVendorList {
    #[serde(default)]
    pub gvl_specification_version: u32,

    #[serde(default)]
    pub vendor_list_version: u32,

    #[serde(default)]
    pub tcf_policy_version: u32,

    #[serde(default)]
    pub last_updated: Option<String>,

    #[serde(default)]
    pub purposes: BTreeMap<u32, GvlDeclaration>,

    #[serde(default)]
    pub special_purposes: BTreeMap<u32, GvlDeclaration>,

    #[serde(default)]
    pub features: BTreeMap<u32, GvlDeclaration>,

    #[serde(default)]
    pub special_features: BTreeMap<u32, GvlDeclaration>,

    #[serde(default)]
    pub vendors: BTreeMap<u32, Vendor>,
}

impl GlobalVendorList {
    /// Parse a vendor list from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a vendor list from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn purpose(&self, id: u32) -> Option<&GvlDeclaration> {
        self.purposes.get(&id)
    }

    pub fn special_purpose(&self, id: u32) -> Option<&GvlDeclaration> {
        self.special_purposes.get(&id)
    }

    pub fn feature(&self, id: u32) -> Option<&GvlDeclaration> {
        self.features.get(&id)
    }

    pub fn special_feature(&self, id: u32) -> Option<&GvlDeclaration> {
        self.special_features.get(&id)
    }

    /// Vendors declaring `purpose_id` under the consent legal basis.
    pub fn vendors_with_consent_purpose(&self, purpose_id: u32) -> BTreeMap<u32, &Vendor> {
        self.vendors_where(|v| v.purposes.contains(&purpose_id))
    }

    /// Vendors declaring `purpose_id` under the legitimate-interest legal basis.
    pub fn vendors_with_leg_int_purpose(&self, purpose_id: u32) -> BTreeMap<u32, &Vendor> {
        self.vendors_where(|v| v.leg_int_purposes.contains(&purpose_id))
    }

    /// Vendors that use `feature_id` as a special feature.
    pub fn vendors_with_special_feature(&self, feature_id: u32) -> BTreeMap<u32, &Vendor> {
        self.vendors_where(|v| v.special_features.contains(&feature_id))
    }

    fn vendors_where(&self, predicate: impl Fn(&Vendor) -> bool) -> BTreeMap<u32, &Vendor> {
        self.vendors
            .iter()
            .filter(|(_, vendor)| predicate(vendor))
            .map(|(id, vendor)| (*id, vendor))
            .collect()
    }
}
