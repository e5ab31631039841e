//! Choice records exchanged with the consent UI.
//!
//! The bundle's shape is fixed once built: the UI receives it, flips the
//! `state` flag of individual records and hands it back. Every other field
//! is read-only by convention.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::GoogleVendorOption;

/// Lightweight vendor reference attached to purpose and feature choices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VendorRef {
    pub id: u32,
    pub name: String,
}

/// A purpose or feature resolved from the vendor list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationRef {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub legal_description: String,
}

/// A purpose (or special feature) the user can toggle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurposeChoice {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub legal_description: String,
    #[serde(default)]
    pub state: bool,
    #[serde(default)]
    pub vendors: BTreeMap<u32, VendorRef>,
}

/// Special features share the purpose record shape.
pub type SpecialFeatureChoice = PurposeChoice;

/// A vendor the user can toggle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorChoice {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub policy_url: String,
    /// `None` when the vendor list carries no usable value.
    #[serde(default)]
    pub cookie_max_age_seconds: Option<f64>,
    #[serde(default)]
    pub features: Vec<DeclarationRef>,
    #[serde(default)]
    pub special_features: Vec<DeclarationRef>,
    #[serde(default)]
    pub purposes: Vec<DeclarationRef>,
    #[serde(default)]
    pub special_purposes: Vec<DeclarationRef>,
    #[serde(default)]
    pub flexible_purposes: Vec<u32>,
    #[serde(default)]
    pub leg_int_purposes: Vec<u32>,
    #[serde(default)]
    pub state: bool,
}

/// The bundle of choices handed to the UI and read back after submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChoicesBridgeDto {
    #[serde(default, deserialize_with = "lenient::records")]
    purpose_choices: Vec<PurposeChoice>,

    #[serde(default, deserialize_with = "lenient::records")]
    special_feature_choices: Vec<SpecialFeatureChoice>,

    #[serde(default, deserialize_with = "lenient::records")]
    vendor_choices: Vec<VendorChoice>,

    #[serde(default, deserialize_with = "lenient::records")]
    legitimate_interest_purpose_choices: Vec<PurposeChoice>,

    #[serde(default, deserialize_with = "lenient::records")]
    legitimate_interest_vendor_choices: Vec<VendorChoice>,

    #[serde(default, deserialize_with = "lenient::records")]
    google_vendor_options: Vec<GoogleVendorOption>,
}

impl ChoicesBridgeDto {
    pub fn new(
        purpose_choices: Vec<PurposeChoice>,
        special_feature_choices: Vec<SpecialFeatureChoice>,
        vendor_choices: Vec<VendorChoice>,
        legitimate_interest_purpose_choices: Vec<PurposeChoice>,
        legitimate_interest_vendor_choices: Vec<VendorChoice>,
        google_vendor_options: Vec<GoogleVendorOption>,
    ) -> Self {
        Self {
            purpose_choices,
            special_feature_choices,
            vendor_choices,
            legitimate_interest_purpose_choices,
            legitimate_interest_vendor_choices,
            google_vendor_options,
        }
    }

    /// Decode a bundle returned by the UI.
    ///
    /// Records whose id is not a non-negative integer, or which fail to
    /// decode for any other reason, are dropped rather than rejected.
    pub fn from_ui_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the bundle for the UI.
    pub fn to_ui_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn purpose_choices(&self) -> &[PurposeChoice] {
        &self.purpose_choices
    }

    pub fn special_feature_choices(&self) -> &[SpecialFeatureChoice] {
        &self.special_feature_choices
    }

    pub fn vendor_choices(&self) -> &[VendorChoice] {
        &self.vendor_choices
    }

    pub fn legitimate_interest_purpose_choices(&self) -> &[PurposeChoice] {
        &self.legitimate_interest_purpose_choices
    }

    pub fn legitimate_interest_vendor_choices(&self) -> &[VendorChoice] {
        &self.legitimate_interest_vendor_choices
    }

    pub fn google_vendor_options(&self) -> &[GoogleVendorOption] {
        &self.google_vendor_options
    }

    // Mutable access hands out slices so records can be edited but the
    // collections cannot grow or shrink.

    pub fn purpose_choices_mut(&mut self) -> &mut [PurposeChoice] {
        &mut self.purpose_choices
    }

    pub fn special_feature_choices_mut(&mut self) -> &mut [SpecialFeatureChoice] {
        &mut self.special_feature_choices
    }

    pub fn vendor_choices_mut(&mut self) -> &mut [VendorChoice] {
        &mut self.vendor_choices
    }

    pub fn legitimate_interest_purpose_choices_mut(&mut self) -> &mut [PurposeChoice] {
        &mut self.legitimate_interest_purpose_choices
    }

    pub fn legitimate_interest_vendor_choices_mut(&mut self) -> &mut [VendorChoice] {
        &mut self.legitimate_interest_vendor_choices
    }

    pub fn google_vendor_options_mut(&mut self) -> &mut [GoogleVendorOption] {
        &mut self.google_vendor_options
    }

    /// Set the `state` of every record in every collection.
    pub fn set_all_states(&mut self, state: bool) {
        self.purpose_choices.iter_mut().for_each(|c| c.state = state);
        self.special_feature_choices.iter_mut().for_each(|c| c.state = state);
        self.vendor_choices.iter_mut().for_each(|c| c.state = state);
        self.legitimate_interest_purpose_choices
            .iter_mut()
            .for_each(|c| c.state = state);
        self.legitimate_interest_vendor_choices
            .iter_mut()
            .for_each(|c| c.state = state);
        self.google_vendor_options.iter_mut().for_each(|o| o.state = state);
    }
}

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Deserialize a record list, skipping records that do not decode.
    pub(super) fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw.into_iter().filter_map(decode_record).collect())
    }

    fn decode_record<T: DeserializeOwned>(mut value: Value) -> Option<T> {
        if !normalize_id(&mut value) {
            log::debug!("Dropping choice record with invalid id: {}", value);
            return None;
        }
        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Dropping malformed choice record: {}", e);
                None
            }
        }
    }

    /// Coerce `id` to an unsigned integer, accepting integral floats.
    fn normalize_id(value: &mut Value) -> bool {
        let id = match value.get("id") {
            Some(Value::Number(n)) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 0.0)
                    .map(|f| f as u64)
            }),
            _ => None,
        };

        match id.filter(|id| *id <= u64::from(u32::MAX)) {
            Some(id) => {
                value["id"] = Value::from(id);
                true
            }
            None => false,
        }
    }
}
