//! Generation settings, loadable from RON.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::generator::DeadEndPolicy;
use crate::core::preprocess::Normalizer;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything needed to turn a corpus into generated text.
///
/// Missing fields take their defaults, so a file may set only what it
/// changes:
///
/// ```ron
/// (order: 2, length: 40, seed: Some(7), dead_end: halt)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Context length k.
    pub order: usize,
    /// Total output length in tokens, start context included.
    pub length: usize,
    /// Fixed RNG seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Seed words for the first context. `None` picks a random corpus window.
    pub start: Option<String>,
    pub dead_end: DeadEndPolicy,
    pub strip_punctuation: bool,
    pub lowercase: bool,
    /// Report this many most frequent words alongside the output.
    pub top_words: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            order: 3,
            length: 100,
            seed: None,
            start: None,
            dead_end: DeadEndPolicy::default(),
            strip_punctuation: true,
            lowercase: true,
            top_words: None,
        }
    }
}

impl GenerationConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: GenerationConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.order == 0 {
            return Err(ConfigError::Invalid("order must be at least 1".to_string()));
        }
        if self.length == 0 {
            return Err(ConfigError::Invalid("length must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer {
            strip_punctuation: self.strip_punctuation,
            lowercase: self.lowercase,
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = GenerationConfig::from_ron_str("(order: 2, dead_end: halt)").unwrap();
        assert_eq!(config.order, 2);
        assert_eq!(config.length, 100);
        assert_eq!(config.dead_end, DeadEndPolicy::Halt);
        assert!(config.strip_punctuation);
    }

    #[test]
    fn rejects_zero_order() {
        let err = GenerationConfig::from_ron_str("(order: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_ron() {
        let err = GenerationConfig::from_ron_str("(order: \"three\")").unwrap_err();
        assert!(matches!(err, ConfigError::Ron(_)));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let config = GenerationConfig {
            seed: Some(42),
            ..GenerationConfig::default()
        };
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }

    #[test]
    fn ron_round_trip() {
        let config = GenerationConfig {
            order: 2,
            start: Some("the cat".to_string()),
            top_words: Some(5),
            ..GenerationConfig::default()
        };
        let serialized = ron::to_string(&config).unwrap();
        assert_eq!(GenerationConfig::from_ron_str(&serialized).unwrap(), config);
    }
}
