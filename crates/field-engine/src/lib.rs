pub mod assembler;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractors;
pub mod geometry;
pub mod matcher;
pub mod normalize;
pub mod patterns;
pub mod rules;
pub mod validator;

use std::sync::Arc;

use serde_json::Value;
use shared_types::{ProcessingResult, TextSpan, ValidationOutcome};
use tracing::info;

pub use catalog::{load_catalog, CatalogField, FieldCatalog, FieldSpec};
pub use config::{EngineConfig, ValidationConfig};
pub use error::{CatalogError, NormalizationError};
pub use geometry::{reading_order, sort_spans, SpanOrder};
pub use matcher::{FieldLocator, KeywordLocator, KeywordMode, MatchPolicy, ValueSource};
pub use normalize::{normalize, Normalized};
pub use rules::{DocumentType, TextReport, TextValidator};

/// ExtractionEngine entry point
///
/// Runs Normalize -> Match -> Validate -> Assemble over one batch of
/// recognition records. Holds only immutable state, so one engine can serve
/// any number of concurrent callers.
pub struct ExtractionEngine {
    catalog: Arc<FieldCatalog>,
    config: EngineConfig,
    locator: Box<dyn FieldLocator>,
}

impl ExtractionEngine {
    pub fn new(catalog: Arc<FieldCatalog>) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    pub fn with_config(catalog: Arc<FieldCatalog>, config: EngineConfig) -> Self {
        Self {
            catalog,
            config,
            locator: Box::new(KeywordLocator),
        }
    }

    /// Swap the matching strategy
    pub fn with_locator(mut self, locator: Box<dyn FieldLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full pipeline over raw recognition records
    pub fn process(&self, records: &[Value]) -> ProcessingResult {
        let normalized = normalize(records, self.config.min_confidence);
        self.process_normalized(normalized)
    }

    /// Pipeline over spans that are already normalized
    pub fn process_spans(&self, spans: Vec<TextSpan>) -> ProcessingResult {
        self.process_normalized(Normalized {
            spans,
            ..Default::default()
        })
    }

    pub fn process_normalized(&self, normalized: Normalized) -> ProcessingResult {
        let dropped = normalized.dropped_count();
        let spans = normalized.spans;

        let report = matcher::match_fields(
            &spans,
            &self.catalog,
            self.locator.as_ref(),
            self.config.matching,
        );

        let outcomes: Vec<ValidationOutcome> = report
            .matches
            .iter()
            .zip(self.catalog.iter())
            .map(|(m, field)| {
                validator::validate_field(m, &field.definition, &self.config.validation)
            })
            .collect();

        let result = assembler::assemble(report.matches, outcomes, spans, dropped);

        info!(
            "Processed {} spans: {} fields, {} errors, confidence {:.3}",
            result.span_count,
            result.fields.len(),
            result.errors.len(),
            result.overall_confidence
        );

        result
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new(Arc::new(FieldCatalog::builtin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::{DataType, FieldDefinition, ValidationReason};

    fn quad(y: i32) -> Value {
        json!([[0, y], [200, y], [200, y + 20], [0, y + 20]])
    }

    #[test]
    fn test_engine_extracts_builtin_fields() {
        let engine = ExtractionEngine::default();
        let records = vec![
            json!([quad(0), "Name: Asha Verma", 0.96]),
            json!([quad(30), "Age: 34 years", 0.91]),
            json!([quad(60), "Mobile: 9876543210", 0.89]),
        ];

        let result = engine.process(&records);

        assert_eq!(result.fields.len(), engine.catalog().len());
        assert_eq!(result.field("Name").unwrap().value.as_deref(), Some("Asha Verma"));
        assert_eq!(result.field("Age").unwrap().value.as_deref(), Some("34"));
        assert_eq!(result.field("Phone").unwrap().value.as_deref(), Some("9876543210"));
        assert!(result.field("Phone").unwrap().is_valid);
        assert!(result.field("Email").unwrap().is_valid);
        assert!(result.is_valid());
    }

    #[test]
    fn test_engine_applies_confidence_threshold() {
        let catalog = FieldCatalog::new(vec![FieldDefinition::new(
            "Name",
            &["name"],
            DataType::Text,
            true,
        )])
        .unwrap();
        let config = EngineConfig {
            min_confidence: 0.7,
            ..Default::default()
        };
        let engine = ExtractionEngine::with_config(Arc::new(catalog), config);

        let result = engine.process(&[json!(["Name: Blurry", quad(0), 0.4])]);

        assert_eq!(result.span_count, 0);
        assert_eq!(result.dropped_span_count, 0);
        assert_eq!(result.fields[0].reason, ValidationReason::MissingRequired);
    }

    #[test]
    fn test_engine_with_custom_locator() {
        struct Nothing;
        impl FieldLocator for Nothing {
            fn locate(&self, _: &matcher::SpanView, _: &CatalogField) -> Option<matcher::Located> {
                None
            }
        }

        let engine = ExtractionEngine::default().with_locator(Box::new(Nothing));
        let result = engine.process(&[json!(["Name: Asha", quad(0), 0.9])]);
        assert!(result.fields.iter().all(|f| f.value.is_none()));
        assert_eq!(result.overall_confidence, 0.0);
    }
}
