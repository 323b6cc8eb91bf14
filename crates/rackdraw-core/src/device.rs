use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// The two kinds of device placed in a rack. Both go through identical placement logic and only
/// differ in how they are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Compute,
    Storage,
}

impl DeviceKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Compute => "Compute",
            Self::Storage => "Storage",
        }
    }

    /// Short marker drawn on synthetic glyphs.
    pub fn glyph_code(self) -> &'static str {
        match self {
            Self::Compute => "CMP",
            Self::Storage => "STG",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One device as reported by the inventory collector. Read-only to the layout engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(alias = "identifier", alias = "name", deserialize_with = "string_like")]
    pub id: String,
    #[serde(default, deserialize_with = "string_like")]
    pub model: String,
    #[serde(
        default,
        alias = "rack_position",
        alias = "rackPosition",
        alias = "rack_unit",
        deserialize_with = "string_like"
    )]
    pub position: String,
    #[serde(default, alias = "state", deserialize_with = "string_like")]
    pub status: String,
}

impl DeviceRecord {
    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        position: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            position: position.into(),
            status: status.into(),
        }
    }

    /// External label text, e.g. `Compute-7`.
    pub fn label(&self, kind: DeviceKind) -> String {
        format!("{}-{}", kind.display_name(), self.id)
    }
}

/// Already-fetched inventory: the two ordered device collections plus an optional rack name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default, alias = "rackName")]
    pub rack_name: Option<String>,
    #[serde(default, alias = "cnodes", alias = "compute_devices")]
    pub compute: Vec<DeviceRecord>,
    #[serde(default, alias = "dnodes", alias = "storage_devices")]
    pub storage: Vec<DeviceRecord>,
}

impl Inventory {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses an inventory document, picking JSON when the text looks like a JSON object and YAML
    /// otherwise.
    pub fn from_str_auto(text: &str) -> Result<Self> {
        if text.trim_start().starts_with('{') {
            Self::from_json_str(text)
        } else {
            Self::from_yaml_str(text)
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str_auto(&text)
    }

    /// Iterates both collections in processing order: compute first, then storage.
    pub fn devices(&self) -> impl Iterator<Item = (DeviceKind, &DeviceRecord)> {
        self.compute
            .iter()
            .map(|d| (DeviceKind::Compute, d))
            .chain(self.storage.iter().map(|d| (DeviceKind::Storage, d)))
    }

    pub fn is_empty(&self) -> bool {
        self.compute.is_empty() && self.storage.is_empty()
    }
}

/// Accepts strings, numbers, booleans and null (as the empty string). Collectors are inconsistent
/// about whether ids and unit positions are quoted.
fn string_like<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringLike {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
        Null(()),
    }

    Ok(match StringLike::deserialize(deserializer)? {
        StringLike::Str(s) => s,
        StringLike::Int(n) => n.to_string(),
        StringLike::Float(n) => n.to_string(),
        StringLike::Bool(b) => b.to_string(),
        StringLike::Null(()) => String::new(),
    })
}
