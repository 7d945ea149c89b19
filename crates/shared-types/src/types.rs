use std::fmt;
use std::str::FromStr;

/// Four-point polygon of integer pixel coordinates, in the order the
/// recognition engine emitted them (clockwise from top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox(pub [[i32; 2]; 4]);

impl BoundingBox {
    pub fn new(points: [[i32; 2]; 4]) -> Self {
        Self(points)
    }

    /// Build an axis-aligned box from its top-left corner and size.
    pub fn from_rect(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self([
            [x, y],
            [x + width, y],
            [x + width, y + height],
            [x, y + height],
        ])
    }

    pub fn points(&self) -> &[[i32; 2]; 4] {
        &self.0
    }

    /// First emitted point, used as the reading-order anchor.
    pub fn top_left(&self) -> (i32, i32) {
        let [x, y] = self.0[0];
        (x, y)
    }
}

/// One recognized text fragment.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub bbox: BoundingBox,
    pub confidence: f64, // Always within [0.0, 1.0]
}

/// Expected shape of a field's value
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Text,
    Number,
    Phone,
    Date,
    Alphanumeric,
    Email,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::Text,
        DataType::Number,
        DataType::Phone,
        DataType::Date,
        DataType::Alphanumeric,
        DataType::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Phone => "phone",
            DataType::Date => "date",
            DataType::Alphanumeric => "alphanumeric",
            DataType::Email => "email",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a data type name is not one of [`DataType::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data type '{0}'")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DataType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownDataType(s.to_string()))
    }
}

/// Describes one field to pull out of a document
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub keywords: Vec<String>, // Case-insensitive aliases
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub required: bool,
    /// Narrows the extracted value to the first match (group 1 if present)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Overrides the validator's minimum value length for this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl FieldDefinition {
    pub fn new(name: &str, keywords: &[&str], data_type: DataType, required: bool) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            data_type,
            required,
            pattern: None,
            min_length: None,
            max_length: None,
        }
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }
}

/// Result of matching one field against the spans
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldMatch {
    pub field_name: String,
    pub matched_span: Option<TextSpan>,
    pub extracted_value: Option<String>,
}

impl FieldMatch {
    pub fn unmatched(field_name: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            matched_span: None,
            extracted_value: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.extracted_value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    Ok,
    MissingRequired,
    TooShort,
    TooLong,
    InvalidCharacters,
    PatternMismatch,
}

impl ValidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationReason::Ok => "ok",
            ValidationReason::MissingRequired => "missing_required",
            ValidationReason::TooShort => "too_short",
            ValidationReason::TooLong => "too_long",
            ValidationReason::InvalidCharacters => "invalid_characters",
            ValidationReason::PatternMismatch => "pattern_mismatch",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ValidationReason::Ok => "Value is valid",
            ValidationReason::MissingRequired => "Required field was not found in the document",
            ValidationReason::TooShort => "Value is shorter than the minimum length",
            ValidationReason::TooLong => "Value is longer than the maximum length",
            ValidationReason::InvalidCharacters => "Value contains characters outside the allowed set",
            ValidationReason::PatternMismatch => "Value does not match the expected format",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationOutcome {
    pub field_name: String,
    pub is_valid: bool,
    pub reason: ValidationReason,
}

impl ValidationOutcome {
    pub fn new(field_name: &str, reason: ValidationReason) -> Self {
        Self {
            field_name: field_name.to_string(),
            is_valid: reason == ValidationReason::Ok,
            reason,
        }
    }
}

/// One field of the final response: a match and its validation, flattened
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldResult {
    pub name: String,
    pub value: Option<String>,
    pub is_valid: bool,
    pub reason: ValidationReason,
    pub confidence: Option<f64>,
    pub bbox: Option<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: ValidationReason,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProcessingResult {
    pub fields: Vec<FieldResult>, // Catalog order
    pub overall_confidence: f64,
    pub span_count: usize,
    pub dropped_span_count: usize,
    pub errors: Vec<FieldError>,
    pub spans: Vec<TextSpan>, // Normalized spans, for audit
}

impl ProcessingResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldResult> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_parses_case_insensitively() {
        assert_eq!("Phone".parse::<DataType>(), Ok(DataType::Phone));
        assert_eq!(" date ".parse::<DataType>(), Ok(DataType::Date));
        assert_eq!(
            "currency".parse::<DataType>(),
            Err(UnknownDataType("currency".to_string()))
        );
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&ValidationReason::MissingRequired).unwrap();
        assert_eq!(json, "\"missing_required\"");
    }

    #[test]
    fn test_bbox_serializes_as_point_list() {
        let bbox = BoundingBox::from_rect(10, 20, 30, 5);
        let json = serde_json::to_value(bbox).unwrap();
        assert_eq!(json, serde_json::json!([[10, 20], [40, 20], [40, 25], [10, 25]]));
        assert_eq!(bbox.top_left(), (10, 20));
    }

    #[test]
    fn test_field_definition_defaults() {
        let def: FieldDefinition =
            serde_json::from_str(r#"{"name": "Name", "keywords": ["name"]}"#).unwrap();
        assert_eq!(def.data_type, DataType::Text);
        assert!(!def.required);
        assert!(def.pattern.is_none());
        assert!(def.min_length.is_none());

        let json = serde_json::to_value(&def).unwrap();
        assert!(json.get("min_length").is_none());
    }

    #[test]
    fn test_outcome_validity_follows_reason() {
        assert!(ValidationOutcome::new("Name", ValidationReason::Ok).is_valid);
        assert!(!ValidationOutcome::new("Name", ValidationReason::TooShort).is_valid);
    }
}
