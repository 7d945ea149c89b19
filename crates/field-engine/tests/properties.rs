//! Property tests for pipeline invariants

use std::collections::HashMap;
use std::sync::Arc;

use field_engine::matcher::{match_fields, KeywordLocator, MatchPolicy};
use field_engine::{normalize, ExtractionEngine, FieldCatalog};
use proptest::prelude::*;
use serde_json::{json, Value};
use shared_types::{BoundingBox, DataType, FieldDefinition, TextSpan, ValidationReason};

const WORDS: &[&str] = &[
    "name", "age", "phone", "date", "id", "address", "no", "gender", "email", "dob",
];

fn arb_span() -> impl Strategy<Value = TextSpan> {
    (
        prop::sample::select(WORDS),
        "[A-Za-z0-9 :/-]{0,20}",
        0i32..500,
        0i32..800,
        0.0f64..=1.0,
    )
        .prop_map(|(label, rest, x, y, confidence)| TextSpan {
            text: format!("{}{}", label, rest).trim().to_string(),
            bbox: BoundingBox::from_rect(x, y, 100, 20),
            confidence,
        })
}

fn arb_catalog() -> impl Strategy<Value = Vec<FieldDefinition>> {
    prop::collection::vec(
        (
            prop::sample::subsequence(WORDS.to_vec(), 1..3),
            prop::sample::select(DataType::ALL.to_vec()),
            any::<bool>(),
        ),
        0..6,
    )
    .prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(i, (keywords, data_type, required))| FieldDefinition {
                name: format!("Field {}", i),
                keywords: keywords.into_iter().map(String::from).collect(),
                data_type,
                required,
                pattern: None,
                min_length: None,
                max_length: None,
            })
            .collect()
    })
}

fn arb_record() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_span().prop_map(|s| json!([s.bbox, s.text, s.confidence])),
        arb_span().prop_map(|s| json!([s.text, s.bbox, s.confidence])),
        arb_span().prop_map(|s| json!([s.text, s.bbox, "high"])),
        arb_span().prop_map(|s| json!([s.text, [[0, 0], [1, 1]], s.confidence])),
        Just(json!(null)),
    ]
}

proptest! {
    /// Identical input gives byte-identical output
    #[test]
    fn processing_is_deterministic(
        spans in prop::collection::vec(arb_span(), 0..12),
        defs in arb_catalog(),
    ) {
        let engine = ExtractionEngine::new(Arc::new(FieldCatalog::new(defs).unwrap()));
        let first = serde_json::to_string(&engine.process_spans(spans.clone())).unwrap();
        let second = serde_json::to_string(&engine.process_spans(spans)).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Overall confidence stays within [0, 1]
    #[test]
    fn overall_confidence_is_bounded(
        spans in prop::collection::vec(arb_span(), 0..12),
        defs in arb_catalog(),
    ) {
        let engine = ExtractionEngine::new(Arc::new(FieldCatalog::new(defs).unwrap()));
        let result = engine.process_spans(spans);
        prop_assert!((0.0..=1.0).contains(&result.overall_confidence));
    }

    /// One result per catalog field, in catalog order
    #[test]
    fn output_follows_catalog(
        spans in prop::collection::vec(arb_span(), 0..12),
        defs in arb_catalog(),
    ) {
        let names: Vec<String> = defs.iter().map(|d| d.name.clone()).collect();
        let engine = ExtractionEngine::new(Arc::new(FieldCatalog::new(defs).unwrap()));
        let result = engine.process_spans(spans);
        let got: Vec<String> = result.fields.iter().map(|f| f.name.clone()).collect();
        prop_assert_eq!(got, names);
    }

    /// Required and unmatched always means missing_required
    #[test]
    fn unmatched_required_fields_are_invalid(
        spans in prop::collection::vec(arb_span(), 0..12),
        defs in arb_catalog(),
    ) {
        let required: HashMap<String, bool> =
            defs.iter().map(|d| (d.name.clone(), d.required)).collect();
        let engine = ExtractionEngine::new(Arc::new(FieldCatalog::new(defs).unwrap()));
        let result = engine.process_spans(spans);

        for field in &result.fields {
            if field.value.is_none() {
                if required[&field.name] {
                    prop_assert_eq!(field.reason, ValidationReason::MissingRequired);
                    prop_assert!(!field.is_valid);
                } else {
                    prop_assert!(field.is_valid);
                }
            }
        }
    }

    /// No span is claimed by two fields
    #[test]
    fn spans_are_claimed_at_most_once(
        spans in prop::collection::vec(arb_span(), 0..12),
        defs in arb_catalog(),
    ) {
        let catalog = FieldCatalog::new(defs).unwrap();
        let report = match_fields(&spans, &catalog, &KeywordLocator, MatchPolicy::default());

        let mut per_field: HashMap<usize, usize> = HashMap::new();
        for field in report.claims.iter().flatten() {
            *per_field.entry(*field).or_default() += 1;
        }

        // A matched field owns its keyword span and at most one value span
        for (index, field_match) in report.matches.iter().enumerate() {
            let owned = per_field.get(&index).copied().unwrap_or(0);
            if field_match.is_matched() {
                prop_assert!((1..=2).contains(&owned));
            } else {
                prop_assert_eq!(owned, 0);
            }
        }
        prop_assert!(per_field.values().sum::<usize>() <= spans.len());
    }

    /// Normalization never panics and accounts for every record
    #[test]
    fn normalization_accounts_for_every_record(
        records in prop::collection::vec(arb_record(), 0..20),
        threshold in 0.0f64..=1.0,
    ) {
        let out = normalize(&records, threshold);
        prop_assert_eq!(out.spans.len() + out.dropped.len() + out.filtered, records.len());
        prop_assert!(out.spans.iter().all(|s| s.confidence >= threshold));
    }
}
