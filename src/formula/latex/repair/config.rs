// Tunables for the repair pass

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or saving a [`RepairConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid repair configuration: {0}")]
    Yaml(String),
}

/// Thresholds and word lists used by the repair pass.
///
/// Missing YAML keys fall back to the defaults below.
///
/// ```
/// use formula_convert::formula::RepairConfig;
///
/// let config = RepairConfig::from_yaml("garbage_min_count: 5").unwrap();
/// assert_eq!(config.garbage_min_count, 5);
/// assert_eq!(config.garbage_min_ratio, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Input is garbage when it holds more spacing escapes than this...
    pub garbage_min_count: usize,
    /// ...and they cover more than this fraction of its bytes
    pub garbage_min_ratio: f64,
    /// Words OCR tends to emit one letter at a time (`l n` for `ln`)
    pub despaced_words: Vec<String>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            garbage_min_count: 20,
            garbage_min_ratio: 0.5,
            despaced_words: [
                "gen", "log", "sin", "cos", "tan", "exp", "ln", "Enc", "Dec", "CLS", "SEP",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl RepairConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Yaml(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_round_trip() {
        let config = RepairConfig {
            garbage_min_count: 8,
            garbage_min_ratio: 0.25,
            despaced_words: vec!["sec".to_string()],
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(RepairConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = RepairConfig::from_yaml("despaced_words: [arg]").unwrap();
        assert_eq!(config.despaced_words, vec!["arg".to_string()]);
        assert_eq!(config.garbage_min_count, 20);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(RepairConfig::from_yaml("garbage_min_count: [1, 2").is_err());
    }
}
