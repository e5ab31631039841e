// src/services/builder.rs

//! Projects the consent models into the choice bundle shown to the user.

use std::collections::BTreeMap;

use crate::error::{AppError, Result};
use crate::models::{
    AcModel, ChoicesBridgeDto, DeclarationRef, GoogleVendorOption, GvlDeclaration, PurposeChoice,
    SpecialFeatureChoice, TcModel, Vendor, VendorChoice, VendorRef,
};
use crate::services::policy::{LegIntDefault, LegalBasisFlags, LegalBasisPolicy};

/// Builds a [`ChoicesBridgeDto`] from a TC model and an AC model.
///
/// The builder only reads its inputs. A vendor that references a purpose
/// or feature missing from the vendor list fails the whole build.
pub struct ChoiceBridgeBuilder<'a> {
    tc_model: &'a TcModel,
    ac_model: &'a AcModel,
    li_default: LegIntDefault,
}

impl<'a> ChoiceBridgeBuilder<'a> {
    pub fn new(tc_model: &'a TcModel, ac_model: &'a AcModel, first_time_consent_request: bool) -> Self {
        let flags = LegalBasisFlags {
            first_time: first_time_consent_request,
            ..LegalBasisFlags::default()
        };
        Self::with_policy(tc_model, ac_model, LegalBasisPolicy::resolve(flags))
    }

    pub fn with_policy(tc_model: &'a TcModel, ac_model: &'a AcModel, policy: LegalBasisPolicy) -> Self {
        Self {
            tc_model,
            ac_model,
            li_default: policy.li_default,
        }
    }

    /// Build the complete choice bundle.
    pub fn build(&self) -> Result<ChoicesBridgeDto> {
        let purposes = self.purpose_choices();
        let special_features = self.special_feature_choices();
        let vendors = self.vendor_choices()?;
        let (li_purposes, li_vendors) = self.legitimate_interest_choices()?;
        let google_vendors = self.google_vendor_options();

        log::debug!(
            "Built choices: {} purposes, {} special features, {} vendors, {}/{} legitimate-interest purposes/vendors, {} Google vendors",
            purposes.len(),
            special_features.len(),
            vendors.len(),
            li_purposes.len(),
            li_vendors.len(),
            google_vendors.len()
        );

        Ok(ChoicesBridgeDto::new(
            purposes,
            special_features,
            vendors,
            li_purposes,
            li_vendors,
            google_vendors,
        ))
    }

    /// One choice per vendor-list purpose, checked when consented.
    pub fn purpose_choices(&self) -> Vec<PurposeChoice> {
        let gvl = self.tc_model.gvl();
        gvl.purposes
            .iter()
            .map(|(id, purpose)| {
                let state = self.tc_model.purpose_consents.contains(id);
                declaration_choice(purpose, state, &gvl.vendors_with_consent_purpose(*id))
            })
            .collect()
    }

    /// One choice per vendor-list special feature, checked when opted in.
    pub fn special_feature_choices(&self) -> Vec<SpecialFeatureChoice> {
        let gvl = self.tc_model.gvl();
        gvl.special_features
            .iter()
            .map(|(id, feature)| {
                let state = self.tc_model.special_feature_optins.contains(id);
                declaration_choice(feature, state, &gvl.vendors_with_special_feature(*id))
            })
            .collect()
    }

    /// One choice per vendor-list vendor, checked when consented.
    pub fn vendor_choices(&self) -> Result<Vec<VendorChoice>> {
        self.tc_model
            .gvl()
            .vendors
            .values()
            .map(|vendor| {
                let state = self.tc_model.vendor_consents.contains(&vendor.id);
                self.vendor_choice(vendor, state)
            })
            .collect()
    }

    /// Legitimate-interest purpose and vendor choices.
    ///
    /// Only purposes claimed by at least one vendor under legitimate
    /// interest are listed; the vendor choices cover every such vendor once.
    pub fn legitimate_interest_choices(&self) -> Result<(Vec<PurposeChoice>, Vec<VendorChoice>)> {
        let gvl = self.tc_model.gvl();
        let mut purposes = Vec::new();
        let mut li_vendors: BTreeMap<u32, &Vendor> = BTreeMap::new();

        for (id, purpose) in &gvl.purposes {
            let vendors = gvl.vendors_with_leg_int_purpose(*id);
            if vendors.is_empty() {
                continue;
            }
            let state = self.li_state(self.tc_model.purpose_legitimate_interests.contains(id));
            purposes.push(declaration_choice(purpose, state, &vendors));
            li_vendors.extend(vendors);
        }

        let vendors = li_vendors
            .values()
            .map(|vendor| {
                let state =
                    self.li_state(self.tc_model.vendor_legitimate_interests.contains(&vendor.id));
                self.vendor_choice(vendor, state)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((purposes, vendors))
    }

    /// Copy of the AC model's provider options.
    pub fn google_vendor_options(&self) -> Vec<GoogleVendorOption> {
        self.ac_model.google_vendor_options().to_vec()
    }

    fn li_state(&self, stored: bool) -> bool {
        match self.li_default {
            LegIntDefault::ForceEnabled => true,
            LegIntDefault::FromModel => stored,
        }
    }

    fn vendor_choice(&self, vendor: &Vendor, state: bool) -> Result<VendorChoice> {
        let gvl = self.tc_model.gvl();
        Ok(VendorChoice {
            id: vendor.id,
            name: vendor.name.clone(),
            policy_url: vendor.policy_url.clone(),
            cookie_max_age_seconds: vendor
                .cookie_max_age_seconds
                .filter(|secs| secs.is_finite() && *secs >= 0.0),
            features: self.resolve(vendor, "feature", &vendor.features, |id| gvl.feature(id))?,
            special_features: self.resolve(vendor, "special feature", &vendor.special_features, |id| {
                gvl.special_feature(id)
            })?,
            purposes: self.resolve(vendor, "purpose", &vendor.purposes, |id| gvl.purpose(id))?,
            special_purposes: self.resolve(vendor, "special purpose", &vendor.special_purposes, |id| {
                gvl.special_purpose(id)
            })?,
            flexible_purposes: self.checked_purposes(vendor, "flexible purpose", &vendor.flexible_purposes)?,
            leg_int_purposes: self.checked_purposes(
                vendor,
                "legitimate-interest purpose",
                &vendor.leg_int_purposes,
            )?,
            state,
        })
    }

    /// Purpose ids kept as plain ids, each of which must be declared.
    fn checked_purposes(&self, vendor: &Vendor, kind: &str, ids: &[u32]) -> Result<Vec<u32>> {
        let gvl = self.tc_model.gvl();
        self.resolve(vendor, kind, ids, |id| gvl.purpose(id))?;
        Ok(ids.to_vec())
    }

    fn resolve<'g>(
        &self,
        vendor: &Vendor,
        kind: &str,
        ids: &[u32],
        lookup: impl Fn(u32) -> Option<&'g GvlDeclaration>,
    ) -> Result<Vec<DeclarationRef>> {
        ids.iter()
            .map(|id| {
                lookup(*id).map(declaration_ref).ok_or_else(|| {
                    AppError::contract(
                        format!("vendor {} ({})", vendor.id, vendor.name),
                        format!(
                            "{} {} is not declared in vendor list version {}",
                            kind,
                            id,
                            self.tc_model.vendor_list_version()
                        ),
                    )
                })
            })
            .collect()
    }
}

fn declaration_ref(declaration: &GvlDeclaration) -> DeclarationRef {
    DeclarationRef {
        id: declaration.id,
        name: declaration.name.clone(),
        description: declaration.description.clone(),
        legal_description: declaration.legal_description.clone(),
    }
}

fn declaration_choice(
    declaration: &GvlDeclaration,
    state: bool,
    vendors: &BTreeMap<u32, &Vendor>,
) -> PurposeChoice {
    PurposeChoice {
        id: declaration.id,
        title: declaration.name.clone(),
        description: declaration.description.clone(),
        legal_description: declaration.legal_description.clone(),
        state,
        vendors: vendors
            .iter()
            .map(|(id, vendor)| {
                (
                    *id,
                    VendorRef {
                        id: *id,
                        name: vendor.name.clone(),
                    },
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{sample_ac_model, sample_gvl, sample_tc_model, scenario_gvl};

    fn ids(choices: &[PurposeChoice]) -> Vec<u32> {
        choices.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_coverage_matches_vendor_list() {
        let tc = sample_tc_model();
        let ac = sample_ac_model();
        let dto = ChoiceBridgeBuilder::new(&tc, &ac, false).build().unwrap();

        assert_eq!(dto.purpose_choices().len(), tc.gvl().purposes.len());
        assert_eq!(dto.vendor_choices().len(), tc.gvl().vendors.len());
        assert_eq!(dto.special_feature_choices().len(), tc.gvl().special_features.len());
        assert_eq!(dto.google_vendor_options(), ac.google_vendor_options());
    }

    #[test]
    fn test_states_reflect_model() {
        let mut tc = sample_tc_model();
        tc.purpose_consents.insert(3);
        tc.vendor_consents.insert(10);
        tc.special_feature_optins.insert(2);
        let ac = sample_ac_model();

        let dto = ChoiceBridgeBuilder::new(&tc, &ac, false).build().unwrap();

        let enabled: Vec<u32> = dto
            .purpose_choices()
            .iter()
            .filter(|c| c.state)
            .map(|c| c.id)
            .collect();
        assert_eq!(enabled, vec![3]);
        assert!(dto.vendor_choices().iter().all(|v| v.state == (v.id == 10)));
        assert!(dto.special_feature_choices().iter().all(|f| f.state == (f.id == 2)));
    }

    #[test]
    fn test_purpose_vendors_are_refs() {
        let tc = sample_tc_model();
        let ac = sample_ac_model();
        let purposes = ChoiceBridgeBuilder::new(&tc, &ac, false).purpose_choices();

        let purpose_one = &purposes[0];
        assert_eq!(purpose_one.vendors.keys().copied().collect::<Vec<_>>(), vec![8, 10]);
        assert_eq!(purpose_one.vendors[&8].name, "Emerse");
    }

    #[test]
    fn test_vendor_choice_resolves_declarations() {
        let tc = sample_tc_model();
        let ac = sample_ac_model();
        let vendors = ChoiceBridgeBuilder::new(&tc, &ac, false).vendor_choices().unwrap();

        let v8 = &vendors[0];
        assert_eq!(v8.id, 8);
        assert_eq!(v8.purposes[0].name, "Store and access information");
        assert_eq!(v8.features[0].id, 1);
        assert_eq!(v8.special_purposes[0].name, "Security");
        assert_eq!(v8.leg_int_purposes, vec![2]);
        assert_eq!(v8.cookie_max_age_seconds, Some(3600.0));

        let v10 = &vendors[1];
        assert_eq!(v10.special_features[0].name, "Precise geolocation");
        assert_eq!(v10.flexible_purposes, vec![3]);
        assert_eq!(v10.cookie_max_age_seconds, None);
    }

    #[test]
    fn test_invalid_cookie_age_becomes_none() {
        let tc = sample_tc_model();
        let ac = sample_ac_model();
        let vendors = ChoiceBridgeBuilder::new(&tc, &ac, false).vendor_choices().unwrap();
        assert_eq!(vendors[2].id, 12);
        assert_eq!(vendors[2].cookie_max_age_seconds, None);

        let mut gvl = sample_gvl();
        gvl.vendors.get_mut(&12).unwrap().cookie_max_age_seconds = Some(f64::NAN);
        let tc = TcModel::new(Arc::new(gvl));
        let vendors = ChoiceBridgeBuilder::new(&tc, &ac, false).vendor_choices().unwrap();
        assert_eq!(vendors[2].cookie_max_age_seconds, None);
    }

    #[test]
    fn test_dangling_purpose_fails_fast() {
        let mut gvl = sample_gvl();
        gvl.vendors.get_mut(&10).unwrap().purposes.push(9);
        let tc = TcModel::new(Arc::new(gvl));
        let ac = sample_ac_model();

        let err = ChoiceBridgeBuilder::new(&tc, &ac, false).build().unwrap_err();
        match err {
            AppError::Contract { context, message } => {
                assert!(context.contains("vendor 10"));
                assert!(message.contains("purpose 9"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_special_feature_fails_fast() {
        let mut gvl = sample_gvl();
        gvl.vendors.get_mut(&8).unwrap().special_features.push(5);
        let tc = TcModel::new(Arc::new(gvl));
        let ac = sample_ac_model();

        assert!(matches!(
            ChoiceBridgeBuilder::new(&tc, &ac, false).vendor_choices(),
            Err(AppError::Contract { .. })
        ));
    }

    #[test]
    fn test_dangling_legitimate_interest_purpose_fails_fast() {
        let mut gvl = sample_gvl();
        gvl.vendors.get_mut(&8).unwrap().leg_int_purposes.push(9);
        let tc = TcModel::new(Arc::new(gvl));
        let ac = sample_ac_model();

        match ChoiceBridgeBuilder::new(&tc, &ac, false).build().unwrap_err() {
            AppError::Contract { context, message } => {
                assert!(context.contains("vendor 8"));
                assert!(message.contains("legitimate-interest purpose 9"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_flexible_purpose_fails_fast() {
        let mut gvl = sample_gvl();
        gvl.vendors.get_mut(&10).unwrap().flexible_purposes.push(42);
        let tc = TcModel::new(Arc::new(gvl));
        let ac = sample_ac_model();

        match ChoiceBridgeBuilder::new(&tc, &ac, false).vendor_choices().unwrap_err() {
            AppError::Contract { context, message } => {
                assert!(context.contains("vendor 10"));
                assert!(message.contains("flexible purpose 42"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_legitimate_interest_union() {
        let tc = sample_tc_model();
        let ac = sample_ac_model();
        let (purposes, vendors) = ChoiceBridgeBuilder::new(&tc, &ac, false)
            .legitimate_interest_choices()
            .unwrap();

        // Purpose 1 has no legitimate-interest vendor.
        assert_eq!(ids(&purposes), vec![2, 3]);
        assert_eq!(purposes[0].vendors.keys().copied().collect::<Vec<_>>(), vec![8, 12]);

        // Vendor 12 claims purposes 2 and 3 but appears once.
        let vendor_ids: Vec<u32> = vendors.iter().map(|v| v.id).collect();
        assert_eq!(vendor_ids, vec![8, 12]);
        assert!(purposes.iter().all(|p| !p.state));
        assert!(vendors.iter().all(|v| !v.state));
    }

    #[test]
    fn test_returning_user_keeps_stored_legitimate_interest() {
        let mut tc = sample_tc_model();
        tc.purpose_legitimate_interests.insert(3);
        tc.vendor_legitimate_interests.insert(12);
        let ac = sample_ac_model();

        let (purposes, vendors) = ChoiceBridgeBuilder::new(&tc, &ac, false)
            .legitimate_interest_choices()
            .unwrap();

        assert!(purposes.iter().all(|p| p.state == (p.id == 3)));
        assert!(vendors.iter().all(|v| v.state == (v.id == 12)));
    }

    #[test]
    fn test_first_time_forces_legitimate_interest() {
        let tc = sample_tc_model();
        let ac = sample_ac_model();
        let dto = ChoiceBridgeBuilder::new(&tc, &ac, true).build().unwrap();

        assert!(!dto.legitimate_interest_purpose_choices().is_empty());
        assert!(dto.legitimate_interest_purpose_choices().iter().all(|p| p.state));
        assert!(dto.legitimate_interest_vendor_choices().iter().all(|v| v.state));

        // Consent choices are not affected by the first-time default.
        assert!(dto.purpose_choices().iter().all(|p| !p.state));
        assert!(dto.vendor_choices().iter().all(|v| !v.state));
    }

    #[test]
    fn test_first_time_with_legitimate_interest_disabled() {
        let tc = sample_tc_model();
        let ac = sample_ac_model();
        let policy = LegalBasisPolicy::resolve(LegalBasisFlags {
            first_time: true,
            legitimate_interest_disabled: true,
            legitimate_mirror: false,
        });

        let dto = ChoiceBridgeBuilder::with_policy(&tc, &ac, policy).build().unwrap();

        assert!(!dto.legitimate_interest_purpose_choices().is_empty());
        assert!(dto.legitimate_interest_purpose_choices().iter().all(|p| !p.state));
        assert!(dto.legitimate_interest_vendor_choices().iter().all(|v| !v.state));
    }

    #[test]
    fn test_builder_does_not_mutate_inputs() {
        let mut tc = sample_tc_model();
        tc.purpose_consents.insert(1);
        let before = tc.purpose_consents.clone();
        let ac = sample_ac_model();

        let mut dto = ChoiceBridgeBuilder::new(&tc, &ac, true).build().unwrap();
        dto.set_all_states(false);

        assert_eq!(tc.purpose_consents, before);
        assert!(ac.google_vendor_options()[1].state);
    }

    #[test]
    fn test_scenario_build() {
        let mut tc = TcModel::new(Arc::new(scenario_gvl()));
        tc.vendor_consents.insert(8);
        tc.purpose_consents.insert(1);
        let ac = AcModel::empty(1);

        let dto = ChoiceBridgeBuilder::new(&tc, &ac, false).build().unwrap();

        let purposes: Vec<(u32, bool)> =
            dto.purpose_choices().iter().map(|c| (c.id, c.state)).collect();
        assert_eq!(purposes, vec![(1, true), (2, false)]);

        let vendors: Vec<(u32, bool)> =
            dto.vendor_choices().iter().map(|c| (c.id, c.state)).collect();
        assert_eq!(vendors, vec![(8, true)]);

        let li: Vec<(u32, bool)> = dto
            .legitimate_interest_purpose_choices()
            .iter()
            .map(|c| (c.id, c.state))
            .collect();
        assert_eq!(li, vec![(2, false)]);
    }
}
