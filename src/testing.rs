//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::models::{
    AcModel, GlobalVendorList, GoogleVendorOption, GvlDeclaration, TcModel, Vendor,
};

fn declaration(id: u32, name: &str) -> GvlDeclaration {
    GvlDeclaration {
        id,
        name: name.to_string(),
        description: format!("{name} description"),
        legal_description: format!("{name} legal"),
    }
}

fn vendor(id: u32, name: &str) -> Vendor {
    Vendor {
        id,
        name: name.to_string(),
        purposes: Vec::new(),
        leg_int_purposes: Vec::new(),
        flexible_purposes: Vec::new(),
        special_purposes: Vec::new(),
        features: Vec::new(),
        special_features: Vec::new(),
        policy_url: format!("https://vendor{id}.example/privacy"),
        cookie_max_age_seconds: None,
        deleted_date: None,
    }
}

/// Purposes {1, 2} and a single vendor 8 with consent purpose 1 and
/// legitimate-interest purpose 2.
pub(crate) fn scenario_gvl() -> GlobalVendorList {
    let mut gvl = GlobalVendorList::default();
    gvl.purposes.insert(1, declaration(1, "Store and access information"));
    gvl.purposes.insert(2, declaration(2, "Basic ads"));

    let mut v8 = vendor(8, "Emerse");
    v8.purposes = vec![1];
    v8.leg_int_purposes = vec![2];
    gvl.vendors.insert(8, v8);
    gvl
}

/// Three purposes, one special purpose, one feature, two special
/// features and vendors 8, 10 and 12.
pub(crate) fn sample_gvl() -> GlobalVendorList {
    let mut gvl = scenario_gvl();
    gvl.vendor_list_version = 7;
    gvl.tcf_policy_version = 4;
    gvl.purposes.insert(3, declaration(3, "Personalised ads profile"));
    gvl.special_purposes.insert(1, declaration(1, "Security"));
    gvl.features.insert(1, declaration(1, "Match offline data"));
    gvl.special_features.insert(1, declaration(1, "Precise geolocation"));
    gvl.special_features.insert(2, declaration(2, "Device scanning"));

    if let Some(v8) = gvl.vendors.get_mut(&8) {
        v8.features = vec![1];
        v8.special_purposes = vec![1];
        v8.cookie_max_age_seconds = Some(3600.0);
    }

    let mut v10 = vendor(10, "Adform");
    v10.purposes = vec![1, 3];
    v10.flexible_purposes = vec![3];
    v10.special_features = vec![1];
    gvl.vendors.insert(10, v10);

    let mut v12 = vendor(12, "BeeswaxIO");
    v12.purposes = vec![2];
    v12.leg_int_purposes = vec![2, 3];
    v12.cookie_max_age_seconds = Some(-5.0);
    gvl.vendors.insert(12, v12);

    gvl
}

pub(crate) fn sample_tc_model() -> TcModel {
    TcModel::new(Arc::new(sample_gvl()))
}

pub(crate) fn google_option(id: u32, state: bool) -> GoogleVendorOption {
    GoogleVendorOption {
        id,
        name: format!("Provider {id}"),
        policy_url: format!("https://provider{id}.example/policy"),
        domains: format!("provider{id}.example"),
        state,
    }
}

pub(crate) fn sample_ac_model() -> AcModel {
    AcModel::new(
        1,
        vec![
            google_option(1, false),
            google_option(2, true),
            google_option(4, false),
        ],
    )
}
