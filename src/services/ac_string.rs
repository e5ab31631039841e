// src/services/ac_string.rs

//! Google Additional Consent string: `<version>~<dot-joined provider ids>`.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::AcModel;

fn ac_string_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)~((?:\d+)(?:\.\d+)*)?$").expect("AC string pattern is valid")
    })
}

/// A decoded Additional Consent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcString {
    pub version: u32,
    pub provider_ids: Vec<u32>,
}

impl AcString {
    /// Parse an AC string, rejecting anything that is not `<version>~<ids>`.
    pub fn parse(encoded: &str) -> Result<Self> {
        let caps = ac_string_pattern()
            .captures(encoded)
            .ok_or_else(|| AppError::codec(format!("Malformed AC string: {encoded:?}")))?;

        let version = caps[1]
            .parse()
            .map_err(|e| AppError::codec(format!("Invalid AC version: {e}")))?;

        let provider_ids = match caps.get(2) {
            Some(ids) => ids
                .as_str()
                .split('.')
                .map(|id| {
                    id.parse()
                        .map_err(|e| AppError::codec(format!("Invalid AC provider id {id}: {e}")))
                })
                .collect::<Result<Vec<u32>>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            version,
            provider_ids,
        })
    }

    /// Parse an AC string and check it was written for `version`.
    pub fn parse_versioned(encoded: &str, version: u32) -> Result<Self> {
        let parsed = Self::parse(encoded)?;
        if parsed.version != version {
            return Err(AppError::codec(format!(
                "AC string version {} does not match expected version {}",
                parsed.version, version
            )));
        }
        Ok(parsed)
    }

    pub fn encode(&self) -> String {
        let ids: Vec<String> = self.provider_ids.iter().map(u32::to_string).collect();
        format!("{}~{}", self.version, ids.join("."))
    }
}

/// Encode the opted-in providers of an AC model.
///
/// With no provider enabled the result is `"<version>~"`.
pub fn build_ac_string(model: &AcModel) -> String {
    AcString {
        version: model.version(),
        provider_ids: model.enabled_ids(),
    }
    .encode()
}
