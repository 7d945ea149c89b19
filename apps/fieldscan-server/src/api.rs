//! API handlers for the fieldscan server
//!
//! Provides REST endpoints for:
//! - Field extraction from recognition output
//! - Text validation against document-type rules
//! - Per-block document processing
//! - Catalog and document-type listing

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use field_engine::{
    normalize, sort_spans, DocumentType, ExtractionEngine, FieldCatalog, FieldSpec, SpanOrder,
    TextReport, TextValidator,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{BoundingBox, FieldDefinition, ProcessingResult};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub catalog_fields: usize,
    pub confidence_threshold: f64,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "fieldscan-server",
        version: env!("CARGO_PKG_VERSION"),
        catalog_fields: state.catalog.len(),
        confidence_threshold: state.config.ocr.confidence_threshold,
    })
}

/// Field list response
#[derive(Serialize)]
pub struct FieldListResponse {
    pub success: bool,
    pub fields: Vec<FieldDefinition>,
    pub count: usize,
}

/// Handler: GET /api/fields
pub async fn handle_list_fields(State(state): State<AppState>) -> Json<FieldListResponse> {
    let fields = state.catalog.definitions();
    let count = fields.len();
    Json(FieldListResponse {
        success: true,
        fields,
        count,
    })
}

/// Document type metadata
#[derive(Serialize)]
pub struct DocumentTypeInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub rules: Vec<String>,
}

/// Document type list response
#[derive(Serialize)]
pub struct DocumentTypeListResponse {
    pub success: bool,
    pub document_types: Vec<DocumentTypeInfo>,
}

/// Handler: GET /api/document-types
pub async fn handle_list_document_types(
    State(state): State<AppState>,
) -> Json<DocumentTypeListResponse> {
    let document_types = DocumentType::ALL
        .into_iter()
        .map(|doc_type| {
            let validator = TextValidator::for_document(doc_type, &state.config.validation);
            DocumentTypeInfo {
                id: doc_type.as_str(),
                name: doc_type.label(),
                rules: validator
                    .available_rules()
                    .into_iter()
                    .map(|(name, _)| name.to_string())
                    .collect(),
            }
        })
        .collect();

    Json(DocumentTypeListResponse {
        success: true,
        document_types,
    })
}

/// Field extraction request
#[derive(Deserialize)]
pub struct ExtractRequest {
    /// Raw recognition records, one per text fragment
    pub recognitions: Vec<Value>,

    /// Field definitions; the server's default catalog when omitted
    #[serde(default)]
    pub fields: Option<Vec<FieldSpec>>,

    /// Minimum span confidence (0.0-1.0)
    pub confidence_threshold: Option<f64>,
}

/// Field extraction response
#[derive(Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: ProcessingResult,
    pub processing_time_ms: u64,
}

pub(crate) fn resolve_threshold(requested: Option<f64>, state: &AppState) -> Result<f64, ServerError> {
    let threshold = requested.unwrap_or(state.config.ocr.confidence_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ServerError::InvalidRequest(format!(
            "confidence_threshold {} must be between 0 and 1",
            threshold
        )));
    }
    Ok(threshold)
}

/// Handler: POST /api/fields/extract
pub async fn handle_extract_fields(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ServerError> {
    let Json(req) = payload?;
    let started = Instant::now();

    let threshold = resolve_threshold(req.confidence_threshold, &state)?;
    let catalog = match req.fields {
        Some(specs) if specs.is_empty() => {
            return Err(ServerError::InvalidRequest(
                "fields must contain at least one definition".to_string(),
            ))
        }
        Some(specs) => Arc::new(FieldCatalog::from_specs(specs)?),
        None => Arc::clone(&state.catalog),
    };

    info!(
        "Extract request: {} records, {} fields, threshold {}",
        req.recognitions.len(),
        catalog.len(),
        threshold
    );

    let engine = ExtractionEngine::with_config(catalog, state.config.engine_config(threshold));
    let records = req.recognitions;
    let result = tokio::task::spawn_blocking(move || engine.process(&records)).await?;

    Ok(Json(ExtractResponse {
        success: true,
        result,
        processing_time_ms: started.elapsed().as_millis() as u64,
    }))
}

/// Text validation request
#[derive(Deserialize)]
pub struct ValidateRequest {
    pub text: String,

    /// aadhaar, pan, passport, driving_license; anything else is generic
    #[serde(default)]
    pub document_type: Option<String>,

    /// Only run these rules; empty means all
    #[serde(default)]
    pub rules: Option<Vec<String>>,
}

/// Text validation response
#[derive(Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub document_type: DocumentType,
    #[serde(flatten)]
    pub report: TextReport,
    pub score: f64,
}

/// Handler: POST /api/validate
pub async fn handle_validate_text(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ServerError> {
    let Json(req) = payload?;

    let document_type = parse_document_type(req.document_type.as_deref());
    debug!("Validate request: document_type={}", document_type);

    let validator = TextValidator::for_document(document_type, &state.config.validation);
    if let Some(names) = req.rules.as_deref() {
        let unknown = validator.unknown_rules(names);
        if !unknown.is_empty() {
            let known: Vec<&str> = validator
                .available_rules()
                .into_iter()
                .map(|(name, _)| name)
                .collect();
            return Err(ServerError::InvalidRequest(format!(
                "unknown rules for {}: {}; available: {}",
                document_type,
                unknown.join(", "),
                known.join(", ")
            )));
        }
    }
    let report = validator.validate_with(&req.text, req.rules.as_deref());
    let score = report.score();

    Ok(Json(ValidateResponse {
        success: true,
        document_type,
        report,
        score,
    }))
}

fn parse_document_type(raw: Option<&str>) -> DocumentType {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

/// Document processing request
#[derive(Deserialize)]
pub struct ProcessRequest {
    pub recognitions: Vec<Value>,

    #[serde(default)]
    pub document_type: Option<String>,

    pub confidence_threshold: Option<f64>,

    /// Run text rules on every block
    #[serde(default = "default_validate_blocks")]
    pub validate_blocks: bool,

    #[serde(default = "default_sort_by")]
    pub sort_by: SpanOrder,
}

fn default_validate_blocks() -> bool {
    true
}

fn default_sort_by() -> SpanOrder {
    SpanOrder::TopToBottom
}

/// Per-block validation summary
#[derive(Serialize)]
pub struct BlockValidation {
    pub is_valid: bool,
    pub message: String,
    pub rules_passed: usize,
    pub rules_failed: usize,
}

/// One recognized block
#[derive(Serialize)]
pub struct TextBlock {
    pub text: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<BlockValidation>,
}

#[derive(Serialize)]
pub struct ProcessSummary {
    pub total_blocks: usize,
    pub valid_blocks: usize,
    pub dropped_records: usize,
    pub filtered_blocks: usize,
    pub average_confidence: f64,
    pub combined_text: String,
}

/// Document processing response
#[derive(Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub document_type: DocumentType,
    pub summary: ProcessSummary,
    pub text_blocks: Vec<TextBlock>,
    /// Document-type rules applied to the combined valid text
    pub document_validation: TextReport,
    pub processing_time_ms: u64,
}

/// Handler: POST /api/document/process
pub async fn handle_process_document(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ServerError> {
    let Json(req) = payload?;
    let started = Instant::now();

    let threshold = resolve_threshold(req.confidence_threshold, &state)?;
    let document_type = parse_document_type(req.document_type.as_deref());
    let validate_blocks = req.validate_blocks;
    let sort_by = req.sort_by;
    let validation = state.config.validation.clone();
    let records = req.recognitions;

    let (summary, text_blocks, document_validation) = tokio::task::spawn_blocking(move || {
        let normalized = normalize(&records, threshold);
        let block_validator = TextValidator::new(&validation);

        let text_blocks: Vec<TextBlock> = sort_spans(&normalized.spans, sort_by)
            .into_iter()
            .map(|span| {
                let validation = validate_blocks.then(|| {
                    let report = block_validator.validate(&span.text);
                    BlockValidation {
                        is_valid: report.valid,
                        message: report.message,
                        rules_passed: report.rules_passed,
                        rules_failed: report.rules_failed,
                    }
                });
                TextBlock {
                    text: span.text,
                    confidence: span.confidence,
                    bbox: span.bbox,
                    validation,
                }
            })
            .collect();

        let valid: Vec<&TextBlock> = text_blocks
            .iter()
            .filter(|b| b.validation.as_ref().map_or(true, |v| v.is_valid))
            .collect();
        let combined_text = valid
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let average_confidence = if text_blocks.is_empty() {
            0.0
        } else {
            text_blocks.iter().map(|b| b.confidence).sum::<f64>() / text_blocks.len() as f64
        };

        let document_validation =
            TextValidator::for_document(document_type, &validation).validate(&combined_text);

        let summary = ProcessSummary {
            total_blocks: text_blocks.len(),
            valid_blocks: valid.len(),
            dropped_records: normalized.dropped_count(),
            filtered_blocks: normalized.filtered,
            average_confidence,
            combined_text,
        };

        (summary, text_blocks, document_validation)
    })
    .await?;

    info!(
        "Document processing completed: {}/{} valid blocks",
        summary.valid_blocks, summary.total_blocks
    );

    Ok(Json(ProcessResponse {
        success: true,
        document_type,
        summary,
        text_blocks,
        document_validation,
        processing_time_ms: started.elapsed().as_millis() as u64,
    }))
}
