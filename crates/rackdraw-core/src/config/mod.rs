use crate::{Error, Result};
use serde_json::{Map, Value, json};
use std::path::Path;

/// Layered rack drawing configuration.
///
/// The value is a JSON object addressed with dotted paths (`rack.unitHeight`). Site defaults come
/// from [`default_site_config`]; user files are deep-merged on top with [`RackConfig::deep_merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct RackConfig(Value);

impl Default for RackConfig {
    fn default() -> Self {
        Self(default_site_config())
    }
}

impl RackConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Site defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::default();
        cfg.deep_merge(overrides);
        cfg
    }

    /// Loads a YAML or JSON override file and merges it over the site defaults.
    ///
    /// Files ending in `.json` are read as JSON; anything else goes through the YAML parser, which
    /// also accepts JSON documents.
    pub fn load_overrides(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let overrides: Value = if is_json {
            serde_json::from_str(&text)?
        } else {
            serde_yaml::from_str(&text)?
        };
        if !(overrides.is_object() || overrides.is_null()) {
            return Err(Error::InvalidConfig {
                message: format!("{} must contain a mapping at the top level", path.display()),
            });
        }
        Ok(Self::with_overrides(&overrides))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        let v = self.get(dotted_path)?;
        v.as_f64()
            .or_else(|| v.as_i64().map(|n| n as f64))
            .or_else(|| v.as_u64().map(|n| n as f64))
    }

    /// Returns a list of strings; non-string entries are skipped.
    pub fn get_str_list(&self, dotted_path: &str) -> Option<Vec<String>> {
        let arr = self.get(dotted_path)?.as_array()?;
        Some(
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // `from_value` accepts any JSON value; coerce to an object so this never panics.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

/// Built-in site defaults. Lengths are in drawing units (px at scale 1).
pub fn default_site_config() -> Value {
    json!({
        "rack": {
            "unitHeight": 20.0,
            "innerWidth": 240.0,
            "railWidth": 22.0,
            "padding": 16.0,
            "titleHeight": 28.0,
            "title": null
        },
        "labels": {
            "columnWidth": 150.0,
            "fontSize": 11.0,
            "gap": 18.0
        },
        "theme": {
            "fontFamily": "\"trebuchet ms\",verdana,arial,sans-serif",
            "frameColor": "#374151",
            "railColor": "#4b5563",
            "slotColor": "#f3f4f6",
            "gridColor": "#d1d5db",
            "textColor": "#111827",
            "computeColor": "#2563eb",
            "storageColor": "#059669",
            "statusActive": "#22c55e",
            "statusOffline": "#ef4444",
            "statusUnknown": "#f59e0b"
        },
        "heights": {
            "oneU": ["_1u", "-1u", " 1u", "1ru"],
            "twoU": ["_2u", "-2u", " 2u", "2ru"]
        }
    })
}
