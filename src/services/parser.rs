// src/services/parser.rs

//! Reconciles an edited choice bundle back into consent models.

use std::collections::BTreeSet;

use crate::models::{
    AcModel, ChoicesBridgeDto, PURPOSE_ONE, PurposeChoice, TcModel, VendorChoice,
};
use crate::services::policy::{AcceptAllLegInt, LegIntSource, LegalBasisFlags, LegalBasisPolicy};

/// A choice record with an id and an on/off state.
trait Toggle {
    fn id(&self) -> u32;
    fn enabled(&self) -> bool;
}

impl Toggle for PurposeChoice {
    fn id(&self) -> u32 {
        self.id
    }
    fn enabled(&self) -> bool {
        self.state
    }
}

impl Toggle for VendorChoice {
    fn id(&self) -> u32 {
        self.id
    }
    fn enabled(&self) -> bool {
        self.state
    }
}

fn enabled_ids<T: Toggle>(choices: &[T]) -> BTreeSet<u32> {
    choices
        .iter()
        .filter(|choice| choice.enabled())
        .map(|choice| choice.id())
        .collect()
}

fn without_purpose_one(ids: &BTreeSet<u32>) -> BTreeSet<u32> {
    ids.iter().copied().filter(|id| *id != PURPOSE_ONE).collect()
}

/// Turns a [`ChoicesBridgeDto`] into a TC model and an AC model.
///
/// Every TC model produced starts from a copy of the source model with all
/// consent and legitimate-interest sets cleared, so only what the bundle
/// enables ends up set. The AC model is edited in place.
pub struct ChoicesParser<'a> {
    baseline: TcModel,
    ac_model: &'a mut AcModel,
    policy: LegalBasisPolicy,
}

impl<'a> ChoicesParser<'a> {
    pub fn new(
        tc_model: &TcModel,
        ac_model: &'a mut AcModel,
        is_legitimate_interest_disabled: bool,
        legitimate_mirror: bool,
    ) -> Self {
        let flags = LegalBasisFlags {
            first_time: false,
            legitimate_interest_disabled: is_legitimate_interest_disabled,
            legitimate_mirror,
        };
        Self::with_policy(tc_model, ac_model, LegalBasisPolicy::resolve(flags))
    }

    pub fn with_policy(tc_model: &TcModel, ac_model: &'a mut AcModel, policy: LegalBasisPolicy) -> Self {
        let mut baseline = tc_model.clone();
        baseline.unset_all();
        Self {
            baseline,
            ac_model,
            policy,
        }
    }

    /// Build the TC model the user's choices describe.
    pub fn parse_tc_model(&self, dto: &ChoicesBridgeDto) -> TcModel {
        let mut model = self.baseline.clone();

        let enabled_purposes = enabled_ids(dto.purpose_choices());
        let enabled_vendors = enabled_ids(dto.vendor_choices());

        model.purpose_consents = enabled_purposes.clone();
        model.vendor_consents = enabled_vendors.clone();
        model.special_feature_optins = enabled_ids(dto.special_feature_choices());

        match self.policy.li_source {
            LegIntSource::MirrorConsent => {
                let li_purposes = without_purpose_one(&enabled_purposes);
                model.purpose_legitimate_interests = li_purposes.clone();
                model.vendor_legitimate_interests = enabled_vendors;
                model.publisher_legitimate_interests = li_purposes;
            }
            LegIntSource::Independent => {
                // Publisher legitimate interest keeps purpose 1 if the user left it on.
                let li_purposes = enabled_ids(dto.legitimate_interest_purpose_choices());
                model.purpose_legitimate_interests = without_purpose_one(&li_purposes);
                model.vendor_legitimate_interests =
                    enabled_ids(dto.legitimate_interest_vendor_choices());
                model.publisher_legitimate_interests = li_purposes;
            }
        }

        model.publisher_consents = enabled_purposes;
        model.touch();

        log::debug!(
            "Parsed TC model: {} purposes, {} vendors, {} legitimate-interest purposes, {} legitimate-interest vendors",
            model.purpose_consents.len(),
            model.vendor_consents.len(),
            model.purpose_legitimate_interests.len(),
            model.vendor_legitimate_interests.len()
        );
        model
    }

    /// Build the TC model for "accept all".
    pub fn build_tc_model_all_enabled(&self) -> TcModel {
        let mut model = self.baseline.clone();
        model.set_all();
        // set_all() leaves publisher consents empty.
        model.publisher_consents = model.purpose_consents.clone();

        match self.policy.accept_all_li {
            AcceptAllLegInt::Cleared => {
                model.purpose_legitimate_interests.clear();
                model.vendor_legitimate_interests.clear();
            }
            AcceptAllLegInt::AllExceptPurposeOne => {
                model.purpose_legitimate_interests.remove(&PURPOSE_ONE);
                model.publisher_legitimate_interests = model.purpose_legitimate_interests.clone();
            }
        }

        model.touch();
        model
    }

    /// Replace the AC model's options with the bundle's.
    pub fn parse_ac_model(&mut self, dto: &ChoicesBridgeDto) -> &AcModel {
        self.ac_model
            .set_google_vendor_options(dto.google_vendor_options().to_vec());
        &*self.ac_model
    }

    /// Opt in to every Google provider.
    pub fn build_ac_model_all_enabled(&mut self) -> &AcModel {
        for option in self.ac_model.google_vendor_options_mut() {
            option.state = true;
        }
        &*self.ac_model
    }
}
