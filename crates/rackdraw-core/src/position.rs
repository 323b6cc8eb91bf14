//! Rack position parsing.
//!
//! Collectors report positions as free-form unit labels (`U25`, `u07`, `RU 3`, `Unit-12`, `41`).
//! Only the trailing digit run of such a label is meaningful; anything that does not look like a
//! unit label is reported as unusable so the caller can skip the device.

use crate::RACK_UNITS;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A validated rack unit in `1..=42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitIndex(u8);

impl UnitIndex {
    pub const BOTTOM: UnitIndex = UnitIndex(1);
    pub const TOP: UnitIndex = UnitIndex(RACK_UNITS);

    pub fn new(unit: u8) -> Option<Self> {
        (1..=RACK_UNITS).contains(&unit).then_some(Self(unit))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for UnitIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "U{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("position {raw:?} is not a unit label")]
    NoDigits { raw: String },
    #[error("position {raw:?} resolves to unit {value}, outside 1..={max}", max = RACK_UNITS)]
    OutOfRange { raw: String, value: u64 },
}

fn unit_label_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(?:[a-z]+[ \-]?)?([0-9]+)\s*$").expect("valid regex"))
}

/// Extracts the unit number from a position label.
///
/// Accepts an optional alphabetic prefix (any case) optionally followed by a single space or
/// `-`, then the digits. Never panics; values too large for `u64` are reported as out of range.
pub fn parse_position(raw: &str) -> Result<UnitIndex, PositionError> {
    let Some(digits) = unit_label_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return Err(PositionError::NoDigits {
            raw: raw.to_string(),
        });
    };

    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    u8::try_from(value)
        .ok()
        .and_then(UnitIndex::new)
        .ok_or_else(|| PositionError::OutOfRange {
            raw: raw.to_string(),
            value,
        })
}
