//! Plugin settings for the similar-content element.
//!
//! Editors configure `count`, `mode`, `vectorWeight` and `mltWeight` per
//! content element. Values arrive loosely typed (form fields are strings,
//! TOML defaults are numbers), so each one is cast on use. A missing,
//! empty or unparseable value falls back to the built-in default.

use serde::{Deserialize, Serialize};
use smlt_client::types::{DEFAULT_COUNT, DEFAULT_MLT_WEIGHT, DEFAULT_VECTOR_WEIGHT};
use smlt_client::{SimilarityMode, SimilarityRequest};

/// A loosely typed setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    /// Cast to a non-negative count. Negative numbers become 0, fractions
    /// are truncated.
    pub fn as_count(&self) -> Option<u32> {
        let number = match self {
            Self::Integer(i) => *i as f64,
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        if !number.is_finite() {
            return None;
        }
        Some(number.trunc().clamp(0.0, f64::from(u32::MAX)) as u32)
    }

    /// Cast to a finite float.
    pub fn as_weight(&self) -> Option<f64> {
        let number = match self {
            Self::Integer(i) => *i as f64,
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        number.is_finite().then_some(number)
    }

    /// Cast to a similarity mode. Numbers are not modes.
    pub fn as_mode(&self) -> Option<SimilarityMode> {
        match self {
            Self::Text(s) if !s.trim().is_empty() => Some(SimilarityMode::parse(s)),
            _ => None,
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Settings of one similar-content element, as configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<SettingValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SettingValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_weight: Option<SettingValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mlt_weight: Option<SettingValue>,
}

/// Settings after casting and defaulting.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub count: u32,
    pub mode: SimilarityMode,
    pub vector_weight: f64,
    pub mlt_weight: f64,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            mode: SimilarityMode::Hybrid,
            vector_weight: DEFAULT_VECTOR_WEIGHT,
            mlt_weight: DEFAULT_MLT_WEIGHT,
        }
    }
}

impl PluginSettings {
    /// Layer these settings over `base`: values set here win.
    pub fn overlay(&self, base: &PluginSettings) -> PluginSettings {
        PluginSettings {
            count: self.count.clone().or_else(|| base.count.clone()),
            mode: self.mode.clone().or_else(|| base.mode.clone()),
            vector_weight: self
                .vector_weight
                .clone()
                .or_else(|| base.vector_weight.clone()),
            mlt_weight: self.mlt_weight.clone().or_else(|| base.mlt_weight.clone()),
        }
    }

    /// Cast every setting, substituting defaults for unusable values.
    pub fn resolved(&self) -> ResolvedSettings {
        let defaults = ResolvedSettings::default();
        ResolvedSettings {
            count: self
                .count
                .as_ref()
                .and_then(SettingValue::as_count)
                .unwrap_or(defaults.count),
            mode: self
                .mode
                .as_ref()
                .and_then(SettingValue::as_mode)
                .unwrap_or(defaults.mode),
            vector_weight: self
                .vector_weight
                .as_ref()
                .and_then(SettingValue::as_weight)
                .unwrap_or(defaults.vector_weight),
            mlt_weight: self
                .mlt_weight
                .as_ref()
                .and_then(SettingValue::as_weight)
                .unwrap_or(defaults.mlt_weight),
        }
    }
}

impl ResolvedSettings {
    /// Apply these settings to a request.
    pub fn apply(&self, request: SimilarityRequest) -> SimilarityRequest {
        request
            .with_count(self.count)
            .with_mode(self.mode.clone())
            .with_weights(self.vector_weight, self.mlt_weight)
    }
}
