//! Core traits for FormAI
//!
//! This module defines the traits shared by the document model, the AI
//! client and the API layer: validation, JSON persistence and identity.

use crate::error::{FormError, FormResult};
use serde::{Serialize, de::DeserializeOwned};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use formai_core::{Validatable, FormResult, FormError};
///
/// struct Option {
///     label: String,
/// }
///
/// impl Validatable for Option {
///     fn validate(&self) -> FormResult<()> {
///         if self.label.is_empty() {
///             return Err(FormError::validation("Option label cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `FormError` describing the problem.
    fn validate(&self) -> FormResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Persistable Trait
// ============================================================================

/// Trait for types that are saved to and loaded from JSON files
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    /// Get the file extension for this type (without the leading dot)
    fn file_extension() -> &'static str;

    /// Get the schema version for migration purposes
    fn schema_version() -> u32 {
        1
    }

    /// Save to a JSON string
    fn to_json(&self) -> FormResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Load from a JSON string
    fn from_json(json: &str) -> FormResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Save to a file
    fn save_to_file(&self, path: &std::path::Path) -> FormResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| FormError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a file
    fn load_from_file(path: &std::path::Path) -> FormResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| FormError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Identifiable Trait
// ============================================================================

/// Trait for types keyed by an opaque string identifier
pub trait Identifiable {
    /// Get the identifier
    fn id(&self) -> &str;

    /// Check if this matches another identifier
    fn matches_id(&self, id: &str) -> bool {
        self.id() == id
    }
}

// ============================================================================
// Tests
// ============================================================================
