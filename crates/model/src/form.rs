//! Form records
//!
//! `FormRecord` is the persistable snapshot of a document: title,
//! description, ordered elements and the form-level settings. It is what the
//! forms store and form files hold; selection and observers are editor state
//! and are not part of it.

use crate::element::FormElement;
use crate::schema::duplicate_id_issues;
use formai_core::{DEFAULT_FORM_TITLE, FormError, FormResult, Validatable};
use serde::{Deserialize, Serialize};

/// Message shown to respondents after submitting, unless overridden
pub const DEFAULT_SUBMIT_MESSAGE: &str = "Thank you for your submission!";

// ============================================================================
// FormSettings
// ============================================================================

/// Form-level presentation and submission settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_submit_message")]
    pub submit_message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,

    #[serde(default)]
    pub allow_multiple_submissions: bool,

    #[serde(default)]
    pub require_auth: bool,

    #[serde(default)]
    pub collect_email: bool,
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_submit_message() -> String {
    DEFAULT_SUBMIT_MESSAGE.to_string()
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            submit_message: default_submit_message(),
            redirect_url: None,
            allow_multiple_submissions: false,
            require_auth: false,
            collect_email: false,
        }
    }
}

impl FormSettings {
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_submit_message(mut self, message: impl Into<String>) -> Self {
        self.submit_message = message.into();
        self
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }
}

// ============================================================================
// FormRecord
// ============================================================================

/// Persistable snapshot of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub elements: Vec<FormElement>,

    #[serde(default)]
    pub settings: FormSettings,
}

impl FormRecord {
    /// Create an empty record with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            elements: Vec::new(),
            settings: FormSettings::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_elements(mut self, elements: Vec<FormElement>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_settings(mut self, settings: FormSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Title to display, falling back to the placeholder when empty
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_FORM_TITLE
        } else {
            &self.title
        }
    }

    /// Number of elements
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of required elements
    pub fn required_count(&self) -> usize {
        self.elements.iter().filter(|e| e.required).count()
    }
}

impl Default for FormRecord {
    fn default() -> Self {
        Self::new("")
    }
}

impl Validatable for FormRecord {
    fn validate(&self) -> FormResult<()> {
        for element in &self.elements {
            element.check_well_formed()?;
        }

        let duplicates = duplicate_id_issues(&self.elements, "elements");
        if !duplicates.is_empty() {
            return Err(FormError::validation(duplicates.join("; ")));
        }

        Ok(())
    }

    fn validation_errors(&self) -> Vec<String> {
        let mut errors: Vec<String> = self
            .elements
            .iter()
            .filter_map(|e| e.check_well_formed().err())
            .map(|e| e.to_string())
            .collect();
        errors.extend(duplicate_id_issues(&self.elements, "elements"));
        errors
    }
}

// ============================================================================
// Tests
// ============================================================================
