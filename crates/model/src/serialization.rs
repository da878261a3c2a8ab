//! Saving and loading form files
//!
//! Forms are stored as pretty-printed JSON wrapped in a versioned
//! [`FormFile`]. Loading also accepts a bare [`FormRecord`] so that records
//! exported by the API can be opened directly.

use crate::form::FormRecord;
use formai_core::{FormError, FormResult, Persistable, Validatable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// File extension for form files
pub const FORM_FILE_EXTENSION: &str = "formai.json";

/// Current schema version written to form files
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Form File Wrapper
// ============================================================================

/// Versioned wrapper around a stored form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFile {
    /// Schema version for migration purposes
    pub schema_version: u32,

    /// The form itself
    pub form: FormRecord,
}

impl FormFile {
    pub fn new(form: FormRecord) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            form,
        }
    }

    /// Check if migration is needed
    pub fn needs_migration(&self) -> bool {
        self.schema_version < SCHEMA_VERSION
    }

    /// Bring an older file up to the current schema version
    pub fn migrate(&mut self) {
        if self.needs_migration() {
            debug!(
                "Migrating form file from schema {} to {}",
                self.schema_version, SCHEMA_VERSION
            );
            self.schema_version = SCHEMA_VERSION;
        }
    }
}

impl Persistable for FormFile {
    fn file_extension() -> &'static str {
        FORM_FILE_EXTENSION
    }

    fn schema_version() -> u32 {
        SCHEMA_VERSION
    }
}

// ============================================================================
// Save Functions
// ============================================================================

/// Save a form to `path`, creating parent directories as needed
pub fn save_form(form: &FormRecord, path: impl AsRef<Path>) -> FormResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| FormError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    FormFile::new(form.clone()).save_to_file(path)?;
    info!(
        "Saved form '{}' ({} elements) to {}",
        form.display_title(),
        form.elements.len(),
        path.display()
    );
    Ok(())
}

/// Serialize a form file to a JSON string
pub fn save_form_to_string(form: &FormRecord) -> FormResult<String> {
    FormFile::new(form.clone()).to_json()
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load and validate a form from `path`
pub fn load_form(path: impl AsRef<Path>) -> FormResult<FormRecord> {
    let form = read_form(path)?;
    form.validate()?;
    Ok(form)
}

/// Load a form from `path` without validating its elements
pub fn read_form(path: impl AsRef<Path>) -> FormResult<FormRecord> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FormError::FileNotFound(path.to_path_buf()));
    }

    let json = std::fs::read_to_string(path).map_err(|e| FormError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let form = parse_form_file(&json).map_err(|e| match e {
        FormError::JsonSerialization(je) => FormError::FileRead {
            path: path.to_path_buf(),
            message: format!("Invalid form file format: {}", je),
        },
        other => other,
    })?;
    debug!("Loaded form '{}' from {}", form.display_title(), path.display());
    Ok(form)
}

/// Load and validate a form from a JSON string, accepting either a
/// [`FormFile`] or a bare [`FormRecord`]
pub fn load_form_from_string(json: &str) -> FormResult<FormRecord> {
    let form = parse_form_file(json)?;
    form.validate()?;
    Ok(form)
}

fn parse_form_file(json: &str) -> FormResult<FormRecord> {
    match serde_json::from_str::<FormFile>(json) {
        Ok(mut file) => {
            if file.schema_version > SCHEMA_VERSION {
                return Err(FormError::InvalidFormFormat(format!(
                    "schema version {} is newer than supported version {}",
                    file.schema_version, SCHEMA_VERSION
                )));
            }
            file.migrate();
            Ok(file.form)
        }
        Err(_) => Ok(serde_json::from_str::<FormRecord>(json)?),
    }
}

// ============================================================================
// Tests
// ============================================================================
