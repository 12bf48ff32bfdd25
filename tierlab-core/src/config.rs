//! Signal configuration.
//!
//! Every parameter the rule set has been run with in practice is a named
//! field here rather than a constant in the engine. Defaults reproduce the
//! canonical rule set: strategic entry under 16% breadth, tactical entry after
//! a three-day run, exit on breadth above 79% with heat under 1.5.

use crate::domain::ConfigHash;
use crate::regime::Regime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Column feeding the heat z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatSource {
    Volume,
    Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
    pub source: HeatSource,
    pub window: usize,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            source: HeatSource::Volume,
            window: 60,
        }
    }
}

/// Pullback-entry parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalConfig {
    /// Gain streak required on the bar before the entry bar.
    pub min_prior_streak: u32,
    /// Normalized turnover (percent) the entry bar must exceed.
    pub min_turnover_pct: f64,
}

impl Default for TacticalConfig {
    fn default() -> Self {
        Self {
            min_prior_streak: 3,
            min_turnover_pct: 1.0,
        }
    }
}

/// One set of overheat thresholds.
///
/// Overheat holds when breadth is strictly above `breadth_above`, heat is
/// strictly below `heat_below` and, if set, the new-high ratio is strictly
/// below `new_high_below`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverheatThresholds {
    pub breadth_above: f64,
    pub heat_below: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_high_below: Option<f64>,
}

impl OverheatThresholds {
    pub const UNIFORM: Self = Self {
        breadth_above: 79.0,
        heat_below: 1.5,
        new_high_below: None,
    };

    pub const BULL: Self = Self {
        breadth_above: 79.0,
        heat_below: 1.5,
        new_high_below: Some(10.0),
    };

    pub const BEAR: Self = Self {
        breadth_above: 40.0,
        heat_below: 1.0,
        new_high_below: Some(25.0),
    };
}

/// Macro-overheat rule used by both tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExitRules {
    /// Same thresholds in every regime.
    Uniform(OverheatThresholds),
    /// Thresholds picked by the bar's regime. An undetermined regime never
    /// counts as overheated.
    RegimeGated {
        bull: OverheatThresholds,
        bear: OverheatThresholds,
    },
}

impl ExitRules {
    pub fn regime_gated() -> Self {
        ExitRules::RegimeGated {
            bull: OverheatThresholds::BULL,
            bear: OverheatThresholds::BEAR,
        }
    }

    /// Thresholds in force for the given regime, if any.
    pub fn thresholds_for(&self, regime: Regime) -> Option<&OverheatThresholds> {
        match self {
            ExitRules::Uniform(thresholds) => Some(thresholds),
            ExitRules::RegimeGated { bull, bear } => match regime {
                Regime::Bull => Some(bull),
                Regime::Bear => Some(bear),
                Regime::Undetermined => None,
            },
        }
    }

    fn all_thresholds(&self) -> Vec<&OverheatThresholds> {
        match self {
            ExitRules::Uniform(thresholds) => vec![thresholds],
            ExitRules::RegimeGated { bull, bear } => vec![bull, bear],
        }
    }
}

impl Default for ExitRules {
    fn default() -> Self {
        ExitRules::Uniform(OverheatThresholds::UNIFORM)
    }
}

/// Complete parameter set of the signal engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Breadth below which a flat book opens a strategic position.
    pub strategic_entry_breadth: f64,
    /// Breadth below which an open tactical position is promoted.
    pub upgrade_breadth: f64,
    /// Held bars after which a tactical position without a new high may be stopped.
    pub time_stop_days: u32,
    /// Block every entry until the longest rolling window is full. When
    /// off, indeterminate indicators are the only warm-up gate.
    pub strict_warmup: bool,
    pub tactical: TacticalConfig,
    pub heat: HeatConfig,
    pub exit: ExitRules,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            strategic_entry_breadth: 16.0,
            upgrade_breadth: 16.0,
            time_stop_days: 5,
            strict_warmup: true,
            tactical: TacticalConfig::default(),
            heat: HeatConfig::default(),
            exit: ExitRules::default(),
        }
    }
}

impl SignalConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_pct("strategic_entry_breadth", self.strategic_entry_breadth)?;
        check_pct("upgrade_breadth", self.upgrade_breadth)?;
        check_pct("tactical.min_turnover_pct", self.tactical.min_turnover_pct)?;
        if self.heat.window < 2 {
            return Err(ConfigError::Invalid(format!(
                "heat.window must be >= 2, got {}",
                self.heat.window
            )));
        }
        for t in self.exit.all_thresholds() {
            check_pct("exit.breadth_above", t.breadth_above)?;
            if !t.heat_below.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "exit.heat_below must be finite, got {}",
                    t.heat_below
                )));
            }
            if let Some(nh) = t.new_high_below {
                check_pct("exit.new_high_below", nh)?;
            }
        }
        Ok(())
    }

    /// Structural + parameter hash of this configuration.
    ///
    /// Field order is fixed by the struct definition, so the JSON is canonical.
    pub fn config_hash(&self) -> ConfigHash {
        let json = serde_json::to_string(self).unwrap_or_default();
        ConfigHash::from_bytes(json.as_bytes())
    }
}

fn check_pct(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be a percentage in [0, 100], got {value}"
        )))
    }
}
