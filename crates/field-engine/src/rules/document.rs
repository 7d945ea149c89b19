//! Identity-document number and date rules

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde_json::json;

use super::{RuleResult, TextRule};
use crate::patterns::find_dates;

lazy_static! {
    /// 12 digits, optionally grouped 4-4-4 by whitespace
    static ref AADHAAR_PATTERN: Regex = Regex::new(r"\b\d{4}\s*\d{4}\s*\d{4}\b").unwrap();

    /// Five letters, four digits, one letter
    static ref PAN_PATTERN: Regex = Regex::new(r"\b[A-Z]{5}\d{4}[A-Z]\b").unwrap();

    /// One letter, seven digits; shared by passports and driving licences
    static ref PASSPORT_NUMBER_PATTERN: Regex = RegexBuilder::new(r"\b[A-Z]\d{7}\b")
        .case_insensitive(true)
        .build()
        .unwrap();
}

/// Text must contain a 12-digit Aadhaar number
pub struct AadhaarRule;

impl TextRule for AadhaarRule {
    fn name(&self) -> &str {
        "aadhaar"
    }

    fn description(&self) -> &str {
        "Aadhaar number format validation"
    }

    fn check(&self, text: &str) -> RuleResult {
        let matches: Vec<&str> = AADHAAR_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
        let valid = matches.iter().any(|m| {
            let digits: String = m.chars().filter(|c| !c.is_whitespace()).collect();
            digits.len() == 12 && digits.chars().all(|c| c.is_ascii_digit())
        });
        let message = if valid {
            "Valid Aadhaar format found"
        } else {
            "No valid Aadhaar format found"
        };
        RuleResult::new(self.name(), valid, message).with_details(json!({"matches": matches}))
    }
}

/// Text must contain a PAN (checked on the uppercased text)
pub struct PanRule;

impl TextRule for PanRule {
    fn name(&self) -> &str {
        "pan"
    }

    fn description(&self) -> &str {
        "PAN number format validation"
    }

    fn check(&self, text: &str) -> RuleResult {
        let upper = text.to_uppercase();
        let matches: Vec<&str> = PAN_PATTERN.find_iter(&upper).map(|m| m.as_str()).collect();
        let message = match matches.first() {
            Some(pan) => format!("Valid PAN format found: {}", pan),
            None => "No valid PAN format found".to_string(),
        };
        RuleResult::new(self.name(), !matches.is_empty(), message)
            .with_details(json!({"matches": matches}))
    }
}

/// Text must contain a passport-style document number
pub struct PassportNumberRule;

impl TextRule for PassportNumberRule {
    fn name(&self) -> &str {
        "passport_number"
    }

    fn description(&self) -> &str {
        "Passport number format"
    }

    fn check(&self, text: &str) -> RuleResult {
        let matches: Vec<&str> = PASSPORT_NUMBER_PATTERN
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();
        let message = match matches.first() {
            Some(number) => format!("Valid document number found: {}", number),
            None => "No valid document number found".to_string(),
        };
        RuleResult::new(self.name(), !matches.is_empty(), message)
            .with_details(json!({"matches": matches}))
    }
}

/// Text must contain at least one real calendar date
pub struct DateRule;

impl TextRule for DateRule {
    fn name(&self) -> &str {
        "date"
    }

    fn description(&self) -> &str {
        "Date format validation"
    }

    fn check(&self, text: &str) -> RuleResult {
        let dates: Vec<_> = find_dates(text)
            .into_iter()
            .map(|(original, parsed)| {
                json!({"original": original, "parsed": parsed.format("%Y-%m-%d").to_string()})
            })
            .collect();
        let valid = !dates.is_empty();
        let message = if valid {
            format!("Found {} valid dates", dates.len())
        } else {
            "No valid dates found".to_string()
        };
        RuleResult::new(self.name(), valid, message).with_details(json!({"dates": dates}))
    }
}
