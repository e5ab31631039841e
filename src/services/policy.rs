// src/services/policy.rs

//! Legal-basis policy table.
//!
//! Three switches drive legitimate-interest handling: whether this is the
//! user's first consent request, whether legitimate interest is disabled
//! for the publisher, and whether legitimate interest mirrors consent.
//! All eight combinations resolve through [`LegalBasisPolicy::resolve`].

/// The switches in effect for one consent flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegalBasisFlags {
    pub first_time: bool,
    pub legitimate_interest_disabled: bool,
    pub legitimate_mirror: bool,
}

/// Initial `state` of legitimate-interest choices shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegIntDefault {
    /// Legitimate interest is opt-out: pre-select every choice
    ForceEnabled,
    /// Reflect what the stored consent model says
    FromModel,
}

/// Where parsed legitimate-interest sets come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegIntSource {
    /// The legitimate-interest sections of the choice bundle
    Independent,
    /// The consent choices, minus purpose 1
    MirrorConsent,
}

/// Legitimate-interest outcome of "accept all".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptAllLegInt {
    /// Every purpose except purpose 1, every vendor
    AllExceptPurposeOne,
    /// No legitimate interest at all
    Cleared,
}

/// Resolved behavior for one combination of [`LegalBasisFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalBasisPolicy {
    pub li_default: LegIntDefault,
    pub li_source: LegIntSource,
    pub accept_all_li: AcceptAllLegInt,
}

impl LegalBasisPolicy {
    const fn row(
        li_default: LegIntDefault,
        li_source: LegIntSource,
        accept_all_li: AcceptAllLegInt,
    ) -> Self {
        Self {
            li_default,
            li_source,
            accept_all_li,
        }
    }

    /// Look up the policy row for a flag combination.
    pub const fn resolve(flags: LegalBasisFlags) -> Self {
        use AcceptAllLegInt::{AllExceptPurposeOne, Cleared};
        use LegIntDefault::{ForceEnabled, FromModel};
        use LegIntSource::{Independent, MirrorConsent};

        // (first_time, legitimate_interest_disabled, legitimate_mirror)
        match (
            flags.first_time,
            flags.legitimate_interest_disabled,
            flags.legitimate_mirror,
        ) {
            (false, false, false) => Self::row(FromModel, Independent, AllExceptPurposeOne),
            (false, false, true) => Self::row(FromModel, MirrorConsent, AllExceptPurposeOne),
            (false, true, false) => Self::row(FromModel, Independent, Cleared),
            (false, true, true) => Self::row(FromModel, MirrorConsent, AllExceptPurposeOne),
            (true, false, false) => Self::row(ForceEnabled, Independent, AllExceptPurposeOne),
            (true, false, true) => Self::row(ForceEnabled, MirrorConsent, AllExceptPurposeOne),
            // Legitimate interest is off: nothing to pre-select.
            (true, true, false) => Self::row(FromModel, Independent, Cleared),
            (true, true, true) => Self::row(ForceEnabled, MirrorConsent, AllExceptPurposeOne),
        }
    }
}

impl From<LegalBasisFlags> for LegalBasisPolicy {
    fn from(flags: LegalBasisFlags) -> Self {
        Self::resolve(flags)
    }
}
