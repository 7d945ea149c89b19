//! Per-field validation
//!
//! Checks are applied in a fixed precedence and the first failing check is
//! reported: missing required, too short, too long, character set (text
//! fields), type pattern (everything else).

use shared_types::{DataType, FieldDefinition, FieldMatch, ValidationOutcome, ValidationReason};

use crate::config::ValidationConfig;
use crate::patterns::matches_data_type;

/// Validate one field match against its definition
pub fn validate_field(
    field_match: &FieldMatch,
    definition: &FieldDefinition,
    config: &ValidationConfig,
) -> ValidationOutcome {
    let reason = match field_match.extracted_value.as_deref() {
        None if definition.required => ValidationReason::MissingRequired,
        None => ValidationReason::Ok,
        Some(value) => check_value(value, definition.data_type, &field_limits(definition, config)),
    };
    ValidationOutcome::new(&definition.name, reason)
}

/// `config` with the field's own length bounds applied
fn field_limits(definition: &FieldDefinition, config: &ValidationConfig) -> ValidationConfig {
    ValidationConfig {
        min_length: definition.min_length.unwrap_or(config.min_length),
        max_length: definition.max_length.unwrap_or(config.max_length),
        allowed_chars: config.allowed_chars.clone(),
    }
}

/// Reason a present value passes or fails
pub fn check_value(value: &str, data_type: DataType, config: &ValidationConfig) -> ValidationReason {
    let length = value.chars().count();

    if length < config.min_length {
        return ValidationReason::TooShort;
    }
    if length > config.max_length {
        return ValidationReason::TooLong;
    }

    match data_type {
        DataType::Text => {
            if value.chars().all(|c| config.allows(c)) {
                ValidationReason::Ok
            } else {
                ValidationReason::InvalidCharacters
            }
        }
        other => {
            if matches_data_type(other, value) {
                ValidationReason::Ok
            } else {
                ValidationReason::PatternMismatch
            }
        }
    }
}
