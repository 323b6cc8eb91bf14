//! Observational signals raised while building a rack diagram.
//!
//! Diagnostics never change the shape of the output (apart from the placeholder fallback, which is
//! itself reported here). Each one is logged through `tracing` when it is recorded and kept on the
//! finished diagram so callers can surface them.

use crate::DeviceKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// The device span would leave `1..=42` (e.g. a 2U device anchored at unit 1).
    OutOfBounds { top_unit: u8, height_units: u8 },
    /// `unit` is already claimed by `holder`.
    Overlap { unit: u8, holder: String },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds {
                top_unit,
                height_units,
            } => write!(
                f,
                "a {height_units}U device anchored at U{top_unit} does not fit in the rack"
            ),
            Self::Overlap { unit, holder } => write!(f, "U{unit} is already occupied by {holder}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    UnparseablePosition {
        kind: DeviceKind,
        device_id: String,
        position: String,
        message: String,
    },
    UnknownModel {
        kind: DeviceKind,
        device_id: String,
        model: String,
    },
    RejectedPlacement {
        kind: DeviceKind,
        device_id: String,
        reason: RejectReason,
    },
    MissingAsset {
        model: String,
        height_units: u8,
    },
    AssetLoadFailed {
        path: String,
        message: String,
    },
    PlaceholderFallback {
        compute_devices: usize,
        storage_devices: usize,
    },
}

impl Diagnostic {
    /// Whether the signal is worth a warning. Missing assets are the common case and only debug.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::MissingAsset { .. })
    }

    pub fn emit(&self) {
        match self {
            Self::UnparseablePosition {
                kind,
                device_id,
                position,
                message,
            } => tracing::warn!(
                %kind,
                device_id = device_id.as_str(),
                position = position.as_str(),
                "skipping device: {message}"
            ),
            Self::UnknownModel {
                kind,
                device_id,
                model,
            } => tracing::warn!(
                %kind,
                device_id = device_id.as_str(),
                model = model.as_str(),
                "unknown model, assuming 1U"
            ),
            Self::RejectedPlacement {
                kind,
                device_id,
                reason,
            } => tracing::warn!(
                %kind,
                device_id = device_id.as_str(),
                "placement rejected: {reason}"
            ),
            Self::MissingAsset {
                model,
                height_units,
            } => tracing::debug!(
                model = model.as_str(),
                height_units,
                "no image asset, drawing glyph"
            ),
            Self::AssetLoadFailed { path, message } => {
                tracing::warn!(path = path.as_str(), "ignoring image asset: {message}")
            }
            Self::PlaceholderFallback {
                compute_devices,
                storage_devices,
            } => tracing::warn!(
                compute_devices,
                storage_devices,
                "no device has a usable rack position, emitting placeholder diagram"
            ),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnparseablePosition {
                kind,
                device_id,
                message,
                ..
            } => write!(f, "{kind}-{device_id}: {message}"),
            Self::UnknownModel {
                kind,
                device_id,
                model,
            } => write!(f, "{kind}-{device_id}: unknown model {model:?}, assuming 1U"),
            Self::RejectedPlacement {
                kind,
                device_id,
                reason,
            } => write!(f, "{kind}-{device_id}: {reason}"),
            Self::MissingAsset {
                model,
                height_units,
            } => write!(f, "no image asset for {model:?} at {height_units}U"),
            Self::AssetLoadFailed { path, message } => write!(f, "{path}: {message}"),
            Self::PlaceholderFallback {
                compute_devices,
                storage_devices,
            } => write!(
                f,
                "none of {compute_devices} compute and {storage_devices} storage devices has a usable rack position"
            ),
        }
    }
}
