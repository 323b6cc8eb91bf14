use crate::RackConfig;
use serde::{Deserialize, Serialize};

/// Physical footprint of a device in rack units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeightClass {
    #[serde(rename = "1U")]
    OneU,
    #[serde(rename = "2U")]
    TwoU,
}

impl HeightClass {
    pub fn units(self) -> u8 {
        match self {
            Self::OneU => 1,
            Self::TwoU => 2,
        }
    }
}

impl std::fmt::Display for HeightClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}U", self.units())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightRule {
    /// Lowercased substring matched against the lowercased model name.
    pub pattern: String,
    pub height: HeightClass,
}

impl HeightRule {
    pub fn new(pattern: &str, height: HeightClass) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Matched(HeightClass),
    /// No rule matched; the device is treated as 1U.
    Defaulted,
}

impl Classification {
    pub fn height(self) -> HeightClass {
        match self {
            Self::Matched(h) => h,
            Self::Defaulted => HeightClass::OneU,
        }
    }
}

/// Ordered `(pattern, height)` rules evaluated top-down; the first rule whose pattern is
/// contained in the model name wins.
///
/// Rules built with [`HeightClassifier::from_patterns`] and [`HeightClassifier::from_config`]
/// list every 1U pattern before any 2U pattern, so a model matching both lists is 1U.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightClassifier {
    rules: Vec<HeightRule>,
}

impl Default for HeightClassifier {
    fn default() -> Self {
        Self::from_config(&RackConfig::default())
    }
}

impl HeightClassifier {
    pub fn new(rules: Vec<HeightRule>) -> Self {
        Self { rules }
    }

    pub fn from_patterns<A, B>(one_u: A, two_u: B) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        let rules = one_u
            .into_iter()
            .map(|p| HeightRule::new(p.as_ref(), HeightClass::OneU))
            .chain(
                two_u
                    .into_iter()
                    .map(|p| HeightRule::new(p.as_ref(), HeightClass::TwoU)),
            )
            .filter(|r| !r.pattern.is_empty())
            .collect();
        Self { rules }
    }

    pub fn from_config(config: &RackConfig) -> Self {
        let one_u = config.get_str_list("heights.oneU").unwrap_or_default();
        let two_u = config.get_str_list("heights.twoU").unwrap_or_default();
        Self::from_patterns(one_u, two_u)
    }

    pub fn rules(&self) -> &[HeightRule] {
        &self.rules
    }

    pub fn classify(&self, model: &str) -> Classification {
        let model = model.to_lowercase();
        self.rules
            .iter()
            .find(|r| model.contains(r.pattern.as_str()))
            .map_or(Classification::Defaulted, |r| {
                Classification::Matched(r.height)
            })
    }
}
