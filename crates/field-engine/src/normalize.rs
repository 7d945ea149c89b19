//! Result normalization
//!
//! Recognition engines hand back tuples whose numbers come from whatever
//! numerics library they use internally. Nothing here trusts that data: every
//! record is coerced into a [`TextSpan`] with plain `f64` confidence and `i32`
//! coordinates, or dropped with a [`NormalizationError`].
//!
//! Accepted record shapes:
//! - `[polygon, text, confidence]` (engine-native order)
//! - `[text, polygon, confidence]`
//! - `{"text": .., "bbox" | "polygon" | "box": .., "confidence" | "score": ..}`

use serde_json::Value;
use shared_types::{BoundingBox, TextSpan};
use tracing::{debug, warn};

use crate::error::NormalizationError;

/// Output of one normalization pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Well-formed spans, in input order
    pub spans: Vec<TextSpan>,
    /// Malformed records that were dropped
    pub dropped: Vec<NormalizationError>,
    /// Well-formed spans discarded for falling below the confidence threshold
    pub filtered: usize,
}

impl Normalized {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Normalize a whole batch, dropping malformed records and spans below
/// `min_confidence`.
pub fn normalize(records: &[Value], min_confidence: f64) -> Normalized {
    let mut out = Normalized::default();

    for (index, record) in records.iter().enumerate() {
        match normalize_record(index, record) {
            Ok(span) if span.confidence < min_confidence => {
                debug!(
                    "Filtered span '{}' (confidence {:.3} < {})",
                    span.text, span.confidence, min_confidence
                );
                out.filtered += 1;
            }
            Ok(span) => out.spans.push(span),
            Err(e) => {
                warn!("Dropping recognition record: {}", e);
                out.dropped.push(e);
            }
        }
    }

    debug!(
        "Normalized {} records: {} spans, {} dropped, {} filtered",
        records.len(),
        out.spans.len(),
        out.dropped.len(),
        out.filtered
    );

    out
}

/// Coerce a single record into a span
pub fn normalize_record(index: usize, record: &Value) -> Result<TextSpan, NormalizationError> {
    let (text, polygon, confidence) = split_record(index, record)?;

    let text = match text {
        Value::String(s) => s.trim(),
        _ => return Err(NormalizationError::MissingText { index }),
    };
    if text.is_empty() {
        return Err(NormalizationError::EmptyText { index });
    }

    let confidence = coerce_confidence(index, confidence)?;
    let bbox = coerce_polygon(index, polygon)?;

    Ok(TextSpan {
        text: text.to_string(),
        bbox,
        confidence,
    })
}

fn split_record(index: usize, record: &Value) -> Result<(&Value, &Value, &Value), NormalizationError> {
    match record {
        Value::Array(items) if items.len() == 3 => {
            if items[0].is_string() {
                Ok((&items[0], &items[1], &items[2]))
            } else if items[0].is_array() {
                Ok((&items[1], &items[0], &items[2]))
            } else {
                Err(NormalizationError::Shape {
                    index,
                    found: format!("tuple starting with {}", kind(&items[0])),
                })
            }
        }
        Value::Array(items) => Err(NormalizationError::Shape {
            index,
            found: format!("{}-element tuple", items.len()),
        }),
        Value::Object(map) => {
            let text = map.get("text").unwrap_or(&Value::Null);
            let polygon = ["bbox", "polygon", "box"]
                .iter()
                .find_map(|key| map.get(*key))
                .unwrap_or(&Value::Null);
            let confidence = ["confidence", "score"]
                .iter()
                .find_map(|key| map.get(*key))
                .unwrap_or(&Value::Null);
            Ok((text, polygon, confidence))
        }
        other => Err(NormalizationError::Shape {
            index,
            found: kind(other).to_string(),
        }),
    }
}

fn coerce_confidence(index: usize, value: &Value) -> Result<f64, NormalizationError> {
    let confidence = value
        .as_f64()
        .ok_or_else(|| NormalizationError::NonNumericConfidence {
            index,
            found: kind(value).to_string(),
        })?;

    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(NormalizationError::ConfidenceOutOfRange {
            index,
            value: confidence,
        });
    }

    Ok(confidence)
}

fn coerce_polygon(index: usize, value: &Value) -> Result<BoundingBox, NormalizationError> {
    let points = match value {
        Value::Array(points) => points,
        _ => return Err(NormalizationError::PolygonPoints { index, found: 0 }),
    };
    if points.len() != 4 {
        return Err(NormalizationError::PolygonPoints {
            index,
            found: points.len(),
        });
    }

    let mut out = [[0i32; 2]; 4];
    for (point_idx, point) in points.iter().enumerate() {
        let coords = match point {
            Value::Array(coords) if coords.len() == 2 => coords,
            _ => {
                return Err(NormalizationError::MalformedPoint {
                    index,
                    point: point_idx,
                })
            }
        };
        out[point_idx] = [
            coerce_coordinate(index, &coords[0])?,
            coerce_coordinate(index, &coords[1])?,
        ];
    }

    Ok(BoundingBox::new(out))
}

fn coerce_coordinate(index: usize, value: &Value) -> Result<i32, NormalizationError> {
    let bad = || NormalizationError::BadCoordinate {
        index,
        found: value.to_string(),
    };

    if let Some(n) = value.as_i64() {
        return i32::try_from(n).map_err(|_| bad());
    }

    let n = value.as_f64().ok_or_else(bad)?;
    let rounded = n.round();
    if !rounded.is_finite() || rounded < i32::MIN as f64 || rounded > i32::MAX as f64 {
        return Err(bad());
    }
    Ok(rounded as i32)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
