//! Field-scoped validation errors for request payloads.

use serde_json::json;

use crate::domain::Error;

/// Machine-readable reason attached to a field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldErrorCode {
    InvalidValue,
    InvalidCursor,
    Conflicting,
}

impl FieldErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidValue => "invalid_value",
            Self::InvalidCursor => "invalid_cursor",
            Self::Conflicting => "conflicting_parameters",
        }
    }
}

/// `invalid_request` error whose details name the offending field.
pub(crate) fn field_error(
    field: &'static str,
    code: FieldErrorCode,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}
