// Response assembly: match + outcome pairs -> ProcessingResult
use shared_types::{
    FieldError, FieldMatch, FieldResult, ProcessingResult, TextSpan, ValidationOutcome,
};

/// Combine per-field results, keeping catalog order. `matches` and
/// `outcomes` are paired by position.
pub fn assemble(
    matches: Vec<FieldMatch>,
    outcomes: Vec<ValidationOutcome>,
    spans: Vec<TextSpan>,
    dropped_span_count: usize,
) -> ProcessingResult {
    let overall_confidence = overall_confidence(&matches);

    let mut fields = Vec::with_capacity(matches.len());
    let mut errors = Vec::new();

    for (field_match, outcome) in matches.into_iter().zip(outcomes) {
        if !outcome.is_valid {
            errors.push(FieldError {
                field: outcome.field_name.clone(),
                reason: outcome.reason,
                message: outcome.reason.describe().to_string(),
            });
        }

        let (confidence, bbox) = match field_match.matched_span {
            Some(span) => (Some(span.confidence), Some(span.bbox)),
            None => (None, None),
        };

        fields.push(FieldResult {
            name: outcome.field_name,
            value: field_match.extracted_value,
            is_valid: outcome.is_valid,
            reason: outcome.reason,
            confidence,
            bbox,
        });
    }

    ProcessingResult {
        fields,
        overall_confidence,
        span_count: spans.len(),
        dropped_span_count,
        errors,
        spans,
    }
}

/// Mean confidence of the spans matched to a field, 0.0 when none matched
pub fn overall_confidence(matches: &[FieldMatch]) -> f64 {
    let confidences: Vec<f64> = matches
        .iter()
        .filter_map(|m| m.matched_span.as_ref().map(|s| s.confidence))
        .collect();

    if confidences.is_empty() {
        return 0.0;
    }

    let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
    mean.clamp(0.0, 1.0)
}
