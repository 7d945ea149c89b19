//! Document-level text rules
//!
//! Whole-text checks used when validating recognized blocks or free text
//! against a document type (Aadhaar, PAN, passport, driving licence).

pub mod basic;
pub mod document;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ValidationConfig;

pub use basic::{CharacterRule, LengthRule, PatternRule};
pub use document::{AadhaarRule, DateRule, PanRule, PassportNumberRule};

/// A named check over a piece of text
pub trait TextRule: Send + Sync {
    /// Short identifier, unique within a validator
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn check(&self, text: &str) -> RuleResult;
}

/// Outcome of one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule: String,
    pub valid: bool,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl RuleResult {
    pub fn new(rule: &str, valid: bool, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            valid,
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Outcome of all rules in a validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextReport {
    pub valid: bool,
    pub message: String,
    pub rules_passed: usize,
    pub rules_failed: usize,
    pub rule_results: Vec<RuleResult>,
}

impl TextReport {
    /// Share of rules that passed, 0.0 when no rule ran
    pub fn score(&self) -> f64 {
        let total = self.rule_results.len();
        if total == 0 {
            0.0
        } else {
            self.rules_passed as f64 / total as f64
        }
    }

    pub fn failed_rules(&self) -> Vec<&str> {
        self.rule_results
            .iter()
            .filter(|r| !r.valid)
            .map(|r| r.rule.as_str())
            .collect()
    }
}

/// Document types with dedicated rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Aadhaar,
    Pan,
    Passport,
    DrivingLicense,
    #[default]
    Generic,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::Aadhaar,
        DocumentType::Pan,
        DocumentType::Passport,
        DocumentType::DrivingLicense,
        DocumentType::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "aadhaar",
            DocumentType::Pan => "pan",
            DocumentType::Passport => "passport",
            DocumentType::DrivingLicense => "driving_license",
            DocumentType::Generic => "generic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "Aadhaar Card",
            DocumentType::Pan => "PAN Card",
            DocumentType::Passport => "Passport",
            DocumentType::DrivingLicense => "Driving License",
            DocumentType::Generic => "Generic Document",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to `Generic` (length and character rules only)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Ok(DocumentType::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .unwrap_or(DocumentType::Generic))
    }
}

/// Ordered collection of text rules
pub struct TextValidator {
    rules: Vec<Box<dyn TextRule>>,
}

impl TextValidator {
    /// Length and character-set rules from `config`
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            rules: vec![
                Box::new(LengthRule::from_config(config)),
                Box::new(CharacterRule::new(&config.allowed_chars)),
            ],
        }
    }

    /// Base rules plus the document type's own rules
    pub fn for_document(document_type: DocumentType, config: &ValidationConfig) -> Self {
        let mut validator = Self::new(config);
        match document_type {
            DocumentType::Aadhaar => {
                validator.add_rule(Box::new(AadhaarRule));
                validator.add_rule(Box::new(DateRule));
            }
            DocumentType::Pan => validator.add_rule(Box::new(PanRule)),
            DocumentType::Passport | DocumentType::DrivingLicense => {
                validator.add_rule(Box::new(DateRule));
                validator.add_rule(Box::new(PassportNumberRule));
            }
            DocumentType::Generic => {}
        }
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn TextRule>) {
        debug!("Added validation rule: {}", rule.name());
        self.rules.push(rule);
    }

    /// Remove the first rule with this name; false if there was none
    pub fn remove_rule(&mut self, name: &str) -> bool {
        match self.rules.iter().position(|r| r.name() == name) {
            Some(index) => {
                self.rules.remove(index);
                info!("Removed validation rule: {}", name);
                true
            }
            None => false,
        }
    }

    /// (name, description) of every rule, in order
    pub fn available_rules(&self) -> Vec<(&str, &str)> {
        self.rules.iter().map(|r| (r.name(), r.description())).collect()
    }

    pub fn validate(&self, text: &str) -> TextReport {
        self.validate_with(text, None)
    }

    /// Names in `names` that match no rule in this validator
    pub fn unknown_rules<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .map(|n| n.as_str())
            .filter(|n| !self.rules.iter().any(|r| r.name() == *n))
            .collect()
    }

    /// Apply all rules, or only the named ones. An empty selection, or one
    /// naming no known rule, applies every rule.
    pub fn validate_with(&self, text: &str, only: Option<&[String]>) -> TextReport {
        let only = only.filter(|names| {
            let selects_any = names
                .iter()
                .any(|n| self.rules.iter().any(|r| r.name() == n.as_str()));
            if !names.is_empty() && !selects_any {
                warn!("No known rule in selection {:?}; applying all rules", names);
            }
            selects_any
        });

        if text.trim().is_empty() {
            return TextReport {
                valid: false,
                message: "Empty or whitespace-only text".to_string(),
                rules_passed: 0,
                rules_failed: 0,
                rule_results: Vec::new(),
            };
        }

        let rule_results: Vec<RuleResult> = self
            .rules
            .iter()
            .filter(|r| only.map_or(true, |names| names.iter().any(|n| n == r.name())))
            .map(|r| r.check(text))
            .collect();

        let rules_passed = rule_results.iter().filter(|r| r.valid).count();
        let rules_failed = rule_results.len() - rules_passed;
        let valid = rules_failed == 0;

        TextReport {
            valid,
            message: format!(
                "Validation {}: {} passed, {} failed",
                if valid { "passed" } else { "failed" },
                rules_passed,
                rules_failed
            ),
            rules_passed,
            rules_failed,
            rule_results,
        }
    }
}

impl Default for TextValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(validator: &TextValidator) -> Vec<String> {
        validator
            .available_rules()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    #[test]
    fn test_rule_sets_per_document_type() {
        let config = ValidationConfig::default();
        assert_eq!(
            names(&TextValidator::for_document(DocumentType::Aadhaar, &config)),
            vec!["length", "characters", "aadhaar", "date"]
        );
        assert_eq!(
            names(&TextValidator::for_document(DocumentType::Pan, &config)),
            vec!["length", "characters", "pan"]
        );
        assert_eq!(
            names(&TextValidator::for_document(DocumentType::DrivingLicense, &config)),
            vec!["length", "characters", "date", "passport_number"]
        );
        assert_eq!(
            names(&TextValidator::for_document(DocumentType::Passport, &config)),
            vec!["length", "characters", "date", "passport_number"]
        );
        assert_eq!(
            names(&TextValidator::for_document(DocumentType::Generic, &config)),
            vec!["length", "characters"]
        );
    }

    #[test]
    fn test_empty_text_runs_no_rules() {
        let report = TextValidator::default().validate("   ");
        assert!(!report.valid);
        assert!(report.rule_results.is_empty());
        assert_eq!(report.score(), 0.0);
    }

    #[test]
    fn test_report_counts() {
        let config = ValidationConfig::default();
        let validator = TextValidator::for_document(DocumentType::Pan, &config);

        let report = validator.validate("PAN ABCDE1234F");
        assert!(report.valid);
        assert_eq!(report.rules_passed, 3);
        assert_eq!(report.message, "Validation passed: 3 passed, 0 failed");

        let report = validator.validate("PAN: none");
        assert!(!report.valid);
        assert_eq!(report.failed_rules(), vec!["characters", "pan"]);
    }

    #[test]
    fn test_validate_only_named_rules() {
        let validator = TextValidator::for_document(DocumentType::Aadhaar, &ValidationConfig::default());
        let only = vec!["aadhaar".to_string()];
        let report = validator.validate_with("UID: 1234 5678 9012", Some(&only));
        assert_eq!(report.rule_results.len(), 1);
        assert!(report.valid);
    }

    #[test]
    fn test_empty_or_unknown_selection_applies_all_rules() {
        let validator = TextValidator::default();
        let full = validator.validate("@@@ ###");
        assert!(!full.valid);

        let report = validator.validate_with("@@@ ###", Some(&[]));
        assert_eq!(report, full);

        let typo = vec!["lenght".to_string()];
        let report = validator.validate_with("@@@ ###", Some(&typo));
        assert_eq!(report, full);
        assert_eq!(validator.unknown_rules(&typo), vec!["lenght"]);
    }

    #[test]
    fn test_unknown_rules_lists_only_missing_names() {
        let validator = TextValidator::for_document(DocumentType::Pan, &ValidationConfig::default());
        let names = vec!["pan".to_string(), "aadhaar".to_string(), "length".to_string()];
        assert_eq!(validator.unknown_rules(&names), vec!["aadhaar"]);
    }

    #[test]
    fn test_add_and_remove_rules() {
        let mut validator = TextValidator::default();
        validator.add_rule(Box::new(PanRule));
        assert!(validator.remove_rule("characters"));
        assert!(!validator.remove_rule("characters"));
        assert_eq!(names(&validator), vec!["length", "pan"]);
    }

    #[test]
    fn test_document_type_parsing() {
        assert_eq!("Aadhaar".parse::<DocumentType>().unwrap(), DocumentType::Aadhaar);
        assert_eq!(
            "driving_license".parse::<DocumentType>().unwrap(),
            DocumentType::DrivingLicense
        );
        assert_eq!("voter_id".parse::<DocumentType>().unwrap(), DocumentType::Generic);
    }
}
