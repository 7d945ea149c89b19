//! General-purpose text rules: length, character set, regex

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};
use serde_json::json;

use super::{RuleResult, TextRule};
use crate::config::{ValidationConfig, DEFAULT_ALLOWED_CHARS};

/// Trimmed text length (in characters) must lie within `[min, max]`
pub struct LengthRule {
    min: usize,
    max: usize,
    description: String,
}

impl LengthRule {
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            description: format!("Text length between {} and {}", min, max),
        }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(config.min_length, config.max_length)
    }
}

impl TextRule for LengthRule {
    fn name(&self) -> &str {
        "length"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn check(&self, text: &str) -> RuleResult {
        let length = text.trim().chars().count();
        let valid = (self.min..=self.max).contains(&length);
        let message = if valid {
            format!("Text length: {}", length)
        } else {
            format!("Text length {} not in range [{}, {}]", length, self.min, self.max)
        };
        RuleResult::new(self.name(), valid, message)
            .with_details(json!({"length": length, "min": self.min, "max": self.max}))
    }
}

/// Every character must come from the allowed set
pub struct CharacterRule {
    allowed: String,
    description: String,
}

impl CharacterRule {
    pub fn new(allowed: &str) -> Self {
        let preview: String = allowed.chars().take(50).collect();
        Self {
            allowed: allowed.to_string(),
            description: format!("Only allowed characters: {}...", preview),
        }
    }
}

impl Default for CharacterRule {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_CHARS)
    }
}

impl TextRule for CharacterRule {
    fn name(&self) -> &str {
        "characters"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn check(&self, text: &str) -> RuleResult {
        let invalid: BTreeSet<char> = text.chars().filter(|c| !self.allowed.contains(*c)).collect();
        let valid = invalid.is_empty();
        let message = if valid {
            "All characters are valid".to_string()
        } else {
            let listed: Vec<String> = invalid.iter().map(|c| c.to_string()).collect();
            format!("Invalid characters found: {}", listed.join(", "))
        };
        RuleResult::new(self.name(), valid, message)
            .with_details(json!({"invalid_chars": invalid.into_iter().collect::<Vec<_>>()}))
    }
}

/// Case-insensitive regex that must (or must not) occur in the text
pub struct PatternRule {
    name: String,
    description: String,
    pattern: Regex,
    must_match: bool,
}

impl PatternRule {
    pub fn new(
        pattern: &str,
        name: &str,
        description: &str,
        must_match: bool,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            pattern: RegexBuilder::new(pattern).case_insensitive(true).build()?,
            must_match,
        })
    }
}

impl TextRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn check(&self, text: &str) -> RuleResult {
        let matched = self.pattern.is_match(text);
        let valid = matched == self.must_match;
        let message = format!(
            "Pattern {}: {}",
            if matched { "matched" } else { "not matched" },
            self.description
        );
        RuleResult::new(self.name(), valid, message)
            .with_details(json!({"pattern_matched": matched, "must_match": self.must_match}))
    }
}
