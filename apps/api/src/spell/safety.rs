//! Safety filter: rejects ingredient lists that mention harmful materials.
//!
//! Matching is plain case-insensitive substring containment. Short terms can
//! collide with innocent words ("meth" in "something"); that strictness is kept.

use thiserror::Error;

/// Lowercase banned terms. The first match in list order is reported.
pub const BANNED_TERMS: &[&str] = &[
    // weapons
    "gun",
    "firearm",
    "bullet",
    "knife",
    "blade",
    "bomb",
    "explosive",
    "grenade",
    // hazardous substances
    "poison",
    "arsenic",
    "cyanide",
    "bleach",
    "ammonia",
    "gasoline",
    "mercury",
    "lye",
    "antifreeze",
    // controlled substances
    "cocaine",
    "heroin",
    "meth",
    "fentanyl",
    "opium",
    // hate symbols
    "swastika",
    "noose",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Your ingredients include \"{term}\", which can't be used in a spell. \
     Try gentler ingredients like herbs, candles, crystals, flowers, salt, or water."
)]
pub struct SafetyViolation {
    pub term: &'static str,
}

/// Checks free-text ingredients against `BANNED_TERMS`. Empty input passes.
pub fn check_ingredients(text: &str) -> Result<(), SafetyViolation> {
    if text.trim().is_empty() {
        return Ok(());
    }

    let lower = text.to_lowercase();
    match BANNED_TERMS.iter().find(|&&term| lower.contains(term)) {
        Some(&term) => Err(SafetyViolation { term }),
        None => Ok(()),
    }
}
