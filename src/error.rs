//! Error types for Tenforty
//!
//! Uses `thiserror` for library errors. Validation problems are NOT errors:
//! they are returned as `ValidationFinding` lists from `TaxData::validate`
//! so the caller decides whether to block an export.
//!
//! Messages never include field *values* (SSNs, names, amounts) - only
//! store paths and PDF field names.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Tenforty operations
pub type TenfortyResult<T> = Result<T, TenfortyError>;

/// Main error type for Tenforty operations
#[derive(Error, Debug)]
pub enum TenfortyError {
    /// A dotted-path write hit a non-object value at an intermediate segment
    #[error("cannot set '{path}': segment '{segment}' holds a non-object value")]
    TypeConflict { path: String, segment: String },

    /// Empty or malformed dotted path
    #[error("invalid dotted path '{path}'")]
    InvalidPath { path: String },

    /// Malformed persisted return document
    #[error("malformed tax return document: {message}")]
    Deserialization { message: String },

    /// A mapped or computed PDF field could not be produced
    #[error("cannot produce field '{field}' from '{source_path}': {message}")]
    MappingField {
        field: String,
        source_path: String,
        message: String,
    },

    /// PDF template field tree is malformed (e.g. circular `/Kids` chains)
    #[error("malformed PDF template: {message}")]
    MalformedTemplate { message: String },

    /// PDF template file is missing or not a file
    #[error("PDF template not found: {path}")]
    TemplateNotFound { path: PathBuf },

    /// Field names in the mapping that do not exist on the template
    #[error("template has no fields named: {}", fields.join(", "))]
    UnknownTemplateFields { fields: Vec<String> },

    /// PDF parse/write error from the underlying library
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TenfortyError {
    /// Shorthand for a `Deserialization` error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_type_conflict() {
        let err = TenfortyError::TypeConflict {
            path: "personal_info.first_name.x".to_string(),
            segment: "personal_info.first_name".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot set 'personal_info.first_name.x': segment 'personal_info.first_name' holds a non-object value"
        );
    }

    #[test]
    fn test_error_display_unknown_fields_lists_all() {
        let err = TenfortyError::UnknownTemplateFields {
            fields: vec!["w2_9_wages".to_string(), "nope".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "template has no fields named: w2_9_wages, nope"
        );
    }

    #[test]
    fn test_error_display_mapping_field_has_context_not_values() {
        let err = TenfortyError::MappingField {
            field: "total_wages".to_string(),
            source_path: "income.w2_forms.1.wages".to_string(),
            message: "not a non-negative amount".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("total_wages"));
        assert!(msg.contains("income.w2_forms.1.wages"));
    }
}
