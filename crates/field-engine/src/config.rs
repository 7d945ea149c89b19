//! Engine settings
//!
//! Everything here is plain data passed explicitly into each pipeline run.
//! Defaults mirror the production service configuration.

use serde::{Deserialize, Serialize};

use crate::matcher::MatchPolicy;

/// Characters accepted in `text` fields unless configured otherwise
pub const DEFAULT_ALLOWED_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 -.,/()[]{}";

pub const DEFAULT_MIN_LENGTH: usize = 2;
pub const DEFAULT_MAX_LENGTH: usize = 1000;

/// Length and character-set limits applied by the field validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    #[serde(alias = "min_text_length")]
    pub min_length: usize,
    #[serde(alias = "max_text_length")]
    pub max_length: usize,
    pub allowed_chars: String,
}

impl ValidationConfig {
    pub fn allows(&self, c: char) -> bool {
        self.allowed_chars.contains(c)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            allowed_chars: DEFAULT_ALLOWED_CHARS.to_string(),
        }
    }
}

/// Full configuration of one extraction pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub validation: ValidationConfig,
    pub matching: MatchPolicy,
    /// Spans below this confidence are filtered out during normalization
    pub min_confidence: f64,
}
