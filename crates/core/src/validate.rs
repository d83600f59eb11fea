/// Input validation errors, raised before any I/O happens.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Title and Product ID are required")]
    MissingRequired,
    #[error("price must be a positive amount")]
    NonPositivePrice,
    #[error("image URL must start with http:// or https://: {0}")]
    InvalidImageUrl(String),
    #[error("unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },
    #[error("at least one platform must be selected")]
    NoPlatforms,
    #[error("date range start {from} is after end {to}")]
    InvertedRange { from: String, to: String },
    #[error("{0} must be between 1 and {1}")]
    OutOfRange(&'static str, u32),
}

/// Treat absent and whitespace-only values the same.
pub fn require_text(value: Option<&str>) -> Result<&str, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Err(ValidationError::MissingRequired),
        Some(v) => Ok(v),
    }
}

/// Filter selections use the literal `All` (any case) for "no constraint".
pub fn is_all(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("all")
}
