pub mod types;

pub use types::{
    BoundingBox, DataType, FieldDefinition, FieldError, FieldMatch, FieldResult,
    ProcessingResult, TextSpan, UnknownDataType, ValidationOutcome, ValidationReason,
};
