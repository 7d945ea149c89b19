//! End-to-end pipeline scenarios over raw recognition records

use std::sync::Arc;

use field_engine::{
    EngineConfig, ExtractionEngine, FieldCatalog, FieldSpec, MatchPolicy, ValueSource,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shared_types::{DataType, FieldDefinition, ValidationReason};

fn quad(x: i32, y: i32) -> Value {
    json!([[x, y], [x + 150, y], [x + 150, y + 20], [x, y + 20]])
}

fn engine(defs: Vec<FieldDefinition>) -> ExtractionEngine {
    ExtractionEngine::new(Arc::new(FieldCatalog::new(defs).unwrap()))
}

#[test]
fn name_is_read_from_the_labelled_span() {
    let engine = engine(vec![FieldDefinition::new(
        "Name",
        &["name"],
        DataType::Text,
        true,
    )]);

    let result = engine.process(&[json!(["Name: John Smith", quad(0, 0), 0.95])]);

    let name = &result.fields[0];
    assert_eq!(name.value.as_deref(), Some("John Smith"));
    assert!(name.is_valid);
    assert_eq!(name.reason, ValidationReason::Ok);
    assert_eq!(result.overall_confidence, 0.95);
}

#[test]
fn missing_required_phone_on_empty_page() {
    let engine = engine(vec![FieldDefinition::new(
        "Phone",
        &["phone"],
        DataType::Phone,
        true,
    )]);

    let result = engine.process(&[]);

    assert!(!result.fields[0].is_valid);
    assert_eq!(result.fields[0].reason, ValidationReason::MissingRequired);
    assert_eq!(result.overall_confidence, 0.0);
    assert_eq!(result.span_count, 0);
}

#[test]
fn impossible_date_is_a_pattern_mismatch() {
    let engine = engine(vec![FieldDefinition::new(
        "Date of Birth",
        &["dob"],
        DataType::Date,
        true,
    )]);

    let result = engine.process(&[json!(["DOB 1990-13-40", quad(0, 0), 0.8])]);

    assert_eq!(result.fields[0].value.as_deref(), Some("1990-13-40"));
    assert_eq!(result.fields[0].reason, ValidationReason::PatternMismatch);
    assert!(!result.fields[0].is_valid);
}

#[test]
fn malformed_record_does_not_abort_the_batch() {
    let engine = engine(vec![
        FieldDefinition::new("Name", &["name"], DataType::Text, true),
        FieldDefinition::new("Age", &["age"], DataType::Number, false),
    ]);

    let result = engine.process(&[
        json!(["Name: John Smith", quad(0, 0), 0.95]),
        json!(["Age: 41", quad(0, 30), "very sure"]),
        json!(["Age: 42", quad(0, 60), 0.9]),
    ]);

    assert_eq!(result.span_count, 2);
    assert_eq!(result.dropped_span_count, 1);
    assert_eq!(result.fields[0].value.as_deref(), Some("John Smith"));
    assert_eq!(result.fields[1].value.as_deref(), Some("42"));
}

#[test]
fn identity_card_layout_with_labels_beside_values() {
    // Labels in the left column, values in the right column, read row by row
    let catalog = FieldCatalog::from_specs(vec![
        FieldSpec {
            required: true,
            ..FieldSpec::named("Name")
        },
        FieldSpec::named("Gender"),
        FieldSpec::named("Date"),
    ])
    .unwrap();
    let engine = ExtractionEngine::new(Arc::new(catalog));

    let result = engine.process(&[
        json!([quad(200, 0), "Sita Devi", 0.93]),
        json!([quad(0, 0), "नाम", 0.97]),
        json!([quad(0, 30), "Gender", 0.99]),
        json!([quad(200, 30), "Female", 0.95]),
        json!([quad(0, 60), "DOB", 0.9]),
        json!([quad(200, 60), "05/06/1985", 0.92]),
    ]);

    assert_eq!(result.fields[0].value.as_deref(), Some("Sita Devi"));
    assert_eq!(result.fields[1].value.as_deref(), Some("Female"));
    assert_eq!(result.fields[2].value.as_deref(), Some("05/06/1985"));
    assert!(result.is_valid());
    assert!((result.overall_confidence - (0.93 + 0.95 + 0.92) / 3.0).abs() < 1e-9);
}

#[test]
fn builtin_catalog_accepts_single_character_gender_and_age() {
    let engine = ExtractionEngine::default();

    let result = engine.process(&[
        json!(["Gender: M", quad(0, 0), 0.94]),
        json!(["Age: 7", quad(0, 30), 0.9]),
    ]);

    let gender = result.field("Gender").unwrap();
    assert_eq!(gender.value.as_deref(), Some("M"));
    assert_eq!(gender.reason, ValidationReason::Ok);

    let age = result.field("Age").unwrap();
    assert_eq!(age.value.as_deref(), Some("7"));
    assert_eq!(age.reason, ValidationReason::Ok);
    assert!(result.is_valid());
}

#[test]
fn repeated_labels_are_claimed_once() {
    let engine = engine(vec![
        FieldDefinition::new("Holder", &["name"], DataType::Text, false),
        FieldDefinition::new("Father", &["name"], DataType::Text, false),
    ]);

    let result = engine.process(&[
        json!(["Name: Ravi Kumar", quad(0, 0), 0.9]),
        json!(["Father's Name: Mohan Lal", quad(0, 30), 0.9]),
    ]);

    assert_eq!(result.fields[0].value.as_deref(), Some("Ravi Kumar"));
    assert_eq!(result.fields[1].value.as_deref(), Some("Mohan Lal"));
}

#[test]
fn residual_only_policy_leaves_bare_labels_unmatched() {
    let catalog = FieldCatalog::new(vec![FieldDefinition::new(
        "Name",
        &["name"],
        DataType::Text,
        true,
    )])
    .unwrap();
    let config = EngineConfig {
        matching: MatchPolicy {
            value_source: ValueSource::ResidualOnly,
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = ExtractionEngine::with_config(Arc::new(catalog), config);

    let result = engine.process(&[
        json!(["Name", quad(0, 0), 0.9]),
        json!(["Ravi Kumar", quad(200, 0), 0.9]),
    ]);

    assert_eq!(result.fields[0].reason, ValidationReason::MissingRequired);
}

#[test]
fn result_serializes_with_plain_numbers() {
    let engine = ExtractionEngine::default();
    let result = engine.process(&[json!([
        [[10.6, 20.2], [160.0, 20.0], [160.0, 40.0], [10.0, 40.0]],
        "Email: asha@example.org",
        0.875
    ])]);

    let value = serde_json::to_value(&result).unwrap();
    let email = value["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "Email")
        .unwrap();

    assert_eq!(email["value"], "asha@example.org");
    assert_eq!(email["reason"], "ok");
    assert_eq!(email["bbox"][0], json!([11, 20]));
    assert_eq!(value["overall_confidence"], 0.875);
    assert_eq!(value["span_count"], 1);
}
