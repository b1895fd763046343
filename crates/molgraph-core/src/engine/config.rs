use crate::core::io::perception::{BondPerception, PerceptionConfig};
use crate::core::io::traits::ParseOptions;
use crate::core::models::annotations::GroupKind;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// What the analyzer computes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Run ring detection. Ring-context group rules are skipped without it.
    pub detect_rings: bool,
    pub classify_groups: bool,
    /// Group kinds that are never assigned.
    pub disabled_groups: BTreeSet<GroupKind>,
}

impl AnalysisConfig {
    pub fn new(detect_rings: bool) -> Self {
        Self {
            detect_rings,
            classify_groups: true,
            disabled_groups: BTreeSet::new(),
        }
    }

    pub fn is_group_enabled(&self, kind: GroupKind) -> bool {
        self.classify_groups && !self.disabled_groups.contains(&kind)
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    detect_rings: Option<bool>,
    classify_groups: Option<bool>,
    disabled_groups: BTreeSet<GroupKind>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detect_rings(mut self, enabled: bool) -> Self {
        self.detect_rings = Some(enabled);
        self
    }
    pub fn classify_groups(mut self, enabled: bool) -> Self {
        self.classify_groups = Some(enabled);
        self
    }
    pub fn disable_group(mut self, kind: GroupKind) -> Self {
        self.disabled_groups.insert(kind);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        Ok(AnalysisConfig {
            detect_rings: self
                .detect_rings
                .ok_or(ConfigError::MissingParameter("detect_rings"))?,
            classify_groups: self.classify_groups.unwrap_or(true),
            disabled_groups: self.disabled_groups,
        })
    }
}

/// The `[analysis]` table of a settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AnalysisSettings {
    pub detect_rings: bool,
    pub classify_groups: bool,
    pub disabled_groups: Vec<GroupKind>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            detect_rings: true,
            classify_groups: true,
            disabled_groups: Vec::new(),
        }
    }
}

/// The `[parsing]` table of a settings file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ParsingSettings {
    pub bond_perception: BondPerception,
    pub tolerance: f64,
    pub min_distance: f64,
}

impl Default for ParsingSettings {
    fn default() -> Self {
        let perception = PerceptionConfig::default();
        Self {
            bond_perception: BondPerception::default(),
            tolerance: perception.tolerance,
            min_distance: perception.min_distance,
        }
    }
}

/// Settings for the parse-then-analyze pipeline, usually read from TOML.
///
/// ```toml
/// [analysis]
/// detect_rings = true
/// disabled_groups = ["methyl"]
///
/// [parsing]
/// bond_perception = "always"
/// tolerance = 1.15
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    pub analysis: AnalysisSettings,
    pub parsing: ParsingSettings,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let settings: Settings = toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.parsing.tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::InvalidValue {
                parameter: "parsing.tolerance",
                reason: format!("must be positive, got {}", tolerance),
            });
        }
        let min_distance = self.parsing.min_distance;
        if !min_distance.is_finite() || min_distance < 0.0 {
            return Err(ConfigError::InvalidValue {
                parameter: "parsing.min_distance",
                reason: format!("must not be negative, got {}", min_distance),
            });
        }
        Ok(())
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            detect_rings: self.analysis.detect_rings,
            classify_groups: self.analysis.classify_groups,
            disabled_groups: self.analysis.disabled_groups.iter().copied().collect(),
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            bond_perception: self.parsing.bond_perception,
            perception: PerceptionConfig {
                tolerance: self.parsing.tolerance,
                min_distance: self.parsing.min_distance,
            },
        }
    }
}
