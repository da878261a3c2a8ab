//! Error types for FormAI
//!
//! This module provides unified error handling across the form builder,
//! covering input validation, missing references, malformed model output,
//! authorization, upstream (model endpoint) failures and file persistence.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for FormAI
#[derive(Debug, Error)]
pub enum FormError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error (bad input shape or length)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single form element failed validation
    #[error("Element validation failed for '{element}': {message}")]
    ElementValidation { element: String, message: String },

    /// A reorder request did not match the current element set
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Element not found in the document
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// User not found in the forms store
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Form not found in the forms store
    #[error("Form not found: {0}")]
    FormNotFound(String),

    /// Form file not found on disk
    #[error("Form file not found at path: {0}")]
    FileNotFound(PathBuf),

    // ========================================================================
    // Malformed Model Output
    // ========================================================================
    /// The model reply contained no `{ ... }` span
    #[error("Invalid response format from model: no JSON object found")]
    NoJsonFound { raw: String },

    /// The extracted span could not be parsed as JSON
    #[error("Invalid JSON format from model: {message}")]
    InvalidJson { message: String, raw: String },

    /// The parsed JSON did not match the expected form schema
    #[error("Model response does not match the form schema: {}", issues.join("; "))]
    SchemaViolation { issues: Vec<String>, raw: String },

    // ========================================================================
    // Authorization
    // ========================================================================
    /// No authenticated identity was supplied
    #[error("Unauthorized")]
    Unauthorized,

    // ========================================================================
    // Upstream Errors
    // ========================================================================
    /// Calling the generative model failed (network, HTTP status, config)
    #[error("Generation failed: {0}")]
    Upstream(String),

    /// Required configuration is missing
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// A generation request is already outstanding
    #[error("A form generation is already in progress")]
    GenerationInProgress,

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Invalid form file format
    #[error("Invalid form file format: {0}")]
    InvalidFormFormat(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

/// Coarse classification of [`FormError`], used at the API boundary to pick
/// a status code and by callers deciding how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    InvalidOrder,
    NotFound,
    MalformedResponse,
    Unauthorized,
    UpstreamFailure,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// HTTP-equivalent status code for this kind of failure
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::InvalidOrder => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::MalformedResponse | ErrorKind::UpstreamFailure | ErrorKind::Internal => 500,
        }
    }
}

impl FormError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        FormError::Validation(msg.into())
    }

    /// Create an element validation error
    pub fn element_validation(element: impl Into<String>, msg: impl Into<String>) -> Self {
        FormError::ElementValidation {
            element: element.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid order error
    pub fn invalid_order(msg: impl Into<String>) -> Self {
        FormError::InvalidOrder(msg.into())
    }

    /// Create an element not found error
    pub fn element_not_found(id: impl Into<String>) -> Self {
        FormError::ElementNotFound(id.into())
    }

    /// Create an upstream failure
    pub fn upstream(msg: impl Into<String>) -> Self {
        FormError::Upstream(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        FormError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        FormError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormError::Validation(_)
            | FormError::ElementValidation { .. }
            | FormError::InvalidFormFormat(_) => ErrorKind::Validation,
            FormError::InvalidOrder(_) => ErrorKind::InvalidOrder,
            FormError::ElementNotFound(_)
            | FormError::UserNotFound(_)
            | FormError::FormNotFound(_)
            | FormError::FileNotFound(_) => ErrorKind::NotFound,
            FormError::NoJsonFound { .. }
            | FormError::InvalidJson { .. }
            | FormError::SchemaViolation { .. } => ErrorKind::MalformedResponse,
            FormError::Unauthorized => ErrorKind::Unauthorized,
            FormError::Upstream(_) | FormError::MissingConfig(_) => ErrorKind::UpstreamFailure,
            FormError::GenerationInProgress => ErrorKind::Conflict,
            FormError::Io(_)
            | FormError::FileRead { .. }
            | FormError::FileWrite { .. }
            | FormError::JsonSerialization(_)
            | FormError::Internal(_)
            | FormError::WithContext { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error reports unusable model output
    pub fn is_malformed_response(&self) -> bool {
        self.kind() == ErrorKind::MalformedResponse
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            FormError::Io(_) | FormError::FileRead { .. } | FormError::FileWrite { .. }
        )
    }

    /// Raw model text attached to a malformed-response error, for diagnostics
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            FormError::NoJsonFound { raw }
            | FormError::InvalidJson { raw, .. }
            | FormError::SchemaViolation { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Result type alias using FormError
pub type FormResult<T> = Result<T, FormError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> FormResult<T>;
}

impl<T, E: Into<FormError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> FormResult<T> {
        self.map_err(|e| {
            let err: FormError = e.into();
            FormError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
