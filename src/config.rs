//! Engine configuration.
//!
//! Weights and the match threshold are normally produced by an outer
//! configuration layer. With the `config` feature they can also be read
//! from YAML or JSON:
//!
//! ```yaml
//! threshold: 0.6
//! ranking: lexical
//! trace: false
//! weights:
//!   identity: 1.0
//!   lexical: 0.8
//! ```

use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::similarity::Strategy;
use crate::trace::Trace;

/// Matching configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct MatchConfig {
    /// Per-strategy weight overrides. Strategies not listed keep their
    /// evaluator's initial weight.
    pub weights: IndexMap<Strategy, f32>,
    /// Minimum ranking-strategy score for a correspondence.
    pub threshold: f32,
    /// Strategy whose score orders candidates; `None` ranks by aggregate.
    pub ranking: Option<Strategy>,
    /// Emit per-engine debug output.
    pub trace: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            weights: IndexMap::new(),
            threshold: 0.5,
            ranking: None,
            trace: false,
        }
    }
}

impl MatchConfig {
    pub fn with_weight(mut self, strategy: Strategy, weight: f32) -> Self {
        self.weights.insert(strategy, weight);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_ranking(mut self, strategy: Strategy) -> Self {
        self.ranking = Some(strategy);
        self
    }

    /// Effective weight: the override if present, else `initial`.
    pub fn weight_for(&self, strategy: Strategy, initial: f32) -> f32 {
        self.weights.get(&strategy).copied().unwrap_or(initial)
    }

    pub fn trace(&self) -> Trace {
        Trace::new(self.trace)
    }

    /// Check every weight and the threshold lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (strategy, value) in &self.weights {
            if !(0.0..=1.0).contains(value) {
                return Err(ConfigError::WeightOutOfRange {
                    strategy: *strategy,
                    value: *value,
                });
            }
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold));
        }
        Ok(())
    }
}

/// Differencing configuration.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DiffConfig {
    /// Emit per-engine debug output.
    pub trace: bool,
}

impl DiffConfig {
    pub fn trace(&self) -> Trace {
        Trace::new(self.trace)
    }
}

#[cfg(feature = "config")]
impl MatchConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` is read as JSON, anything else as YAML.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        tracing::debug!(path = %path.display(), "loaded match configuration");
        Ok(config)
    }
}
