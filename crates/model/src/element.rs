//! Form element definitions
//!
//! This module contains the `FormElement` struct (one field of a form), its
//! validation metadata, and `ElementPatch`, the partial update merged into an
//! element by the document's update operation.

use formai_core::{
    ElementId, ElementType, FormError, FormResult, Identifiable, Validatable,
};
use serde::{Deserialize, Serialize};

/// Options installed on a freshly created option-bearing element
pub const DEFAULT_OPTIONS: [&str; 2] = ["Option 1", "Option 2"];

/// The default option list as owned strings
pub fn default_options() -> Vec<String> {
    DEFAULT_OPTIONS.iter().map(|o| o.to_string()).collect()
}

// ============================================================================
// ValidationRules
// ============================================================================

/// Optional validation metadata attached to an element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// True when no rule is set
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.min.is_none()
            && self.max.is_none()
    }

    /// Whether any length-style rule (`minLength`, `maxLength`, `pattern`) is set
    pub fn has_length_rules(&self) -> bool {
        self.min_length.is_some() || self.max_length.is_some() || self.pattern.is_some()
    }

    /// Whether any range rule (`min`, `max`) is set
    pub fn has_range_rules(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Drop rules that do not apply to `element_type`
    pub fn retain_applicable(&mut self, element_type: ElementType) {
        if !element_type.supports_length_rules() {
            self.min_length = None;
            self.max_length = None;
            self.pattern = None;
        }
        if !element_type.supports_range_rules() {
            self.min = None;
            self.max = None;
        }
    }

    /// Problems with these rules for an element of `element_type`
    pub fn issues_for(&self, element_type: ElementType) -> Vec<String> {
        let mut issues = Vec::new();

        if self.has_length_rules() && !element_type.supports_length_rules() {
            issues.push(format!(
                "minLength/maxLength/pattern do not apply to '{}' elements",
                element_type
            ));
        }
        if self.has_range_rules() && !element_type.supports_range_rules() {
            issues.push(format!(
                "min/max do not apply to '{}' elements",
                element_type
            ));
        }
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                issues.push(format!("minLength ({}) exceeds maxLength ({})", min, max));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                issues.push(format!("min ({}) exceeds max ({})", min, max));
            }
        }
        if let Some(pattern) = &self.pattern {
            if let Err(e) = fancy_regex::Regex::new(pattern) {
                issues.push(format!("pattern '{}' is not a valid regex: {}", pattern, e));
            }
        }

        issues
    }
}

// ============================================================================
// FormElement
// ============================================================================

/// One field definition within a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    /// Stable identity for the element's lifetime
    pub id: ElementId,

    /// Kind of input
    #[serde(rename = "type")]
    pub element_type: ElementType,

    /// Display label (may be empty while being edited)
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,

    /// Choices, present only for select/radio/checkbox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
}

impl FormElement {
    /// Create an element with the builder defaults for `element_type`
    pub fn new(id: impl Into<ElementId>, element_type: ElementType) -> Self {
        Self {
            id: id.into(),
            element_type,
            label: Self::default_label(element_type),
            placeholder: None,
            required: false,
            help_text: None,
            options: element_type.has_options().then(default_options),
            validation: None,
        }
    }

    /// Label given to a freshly added element
    pub fn default_label(element_type: ElementType) -> String {
        format!("New {}", element_type)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_validation(mut self, validation: ValidationRules) -> Self {
        self.validation = Some(validation);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The element's options, or an empty slice
    pub fn option_list(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Problems with the element's shape, excluding its id
    pub fn shape_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        match (&self.options, self.element_type.has_options()) {
            (None, true) => issues.push(format!(
                "options are required for '{}' elements",
                self.element_type
            )),
            (Some(options), true) if options.is_empty() => {
                issues.push("options must contain at least one entry".to_string())
            }
            (Some(_), false) => issues.push(format!(
                "options are not allowed on '{}' elements",
                self.element_type
            )),
            _ => {}
        }

        if let Some(rules) = &self.validation {
            issues.extend(rules.issues_for(self.element_type));
        }

        issues
    }

    /// Stricter check used when accepting a whole form: a well-formed
    /// element also has a non-empty label.
    pub fn check_well_formed(&self) -> FormResult<()> {
        self.validate()?;
        if self.label.trim().is_empty() {
            return Err(FormError::element_validation(
                self.id.as_str(),
                "label cannot be empty",
            ));
        }
        Ok(())
    }

    /// Return a copy of this element with `patch` merged in.
    ///
    /// Switching to an option-bearing type installs the default options when
    /// none are supplied; switching away drops them. Validation rules that do
    /// not apply to a new type are dropped.
    pub fn patched(&self, patch: &ElementPatch) -> FormElement {
        let mut next = self.clone();

        if let Some(element_type) = patch.element_type {
            next.element_type = element_type;
        }
        if let Some(label) = &patch.label {
            next.label = label.clone();
        }
        if let Some(placeholder) = &patch.placeholder {
            next.placeholder = placeholder.clone();
        }
        if let Some(help_text) = &patch.help_text {
            next.help_text = help_text.clone();
        }
        if let Some(required) = patch.required {
            next.required = required;
        }
        if let Some(options) = &patch.options {
            next.options = Some(options.clone());
        }
        if let Some(validation) = &patch.validation {
            next.validation = validation.clone();
        }

        if let Some(element_type) = patch.element_type {
            if element_type.has_options() {
                if next.options.is_none() {
                    next.options = Some(default_options());
                }
            } else if patch.options.is_none() {
                next.options = None;
            }

            if patch.validation.is_none() {
                if let Some(rules) = next.validation.as_mut() {
                    rules.retain_applicable(element_type);
                    if rules.is_empty() {
                        next.validation = None;
                    }
                }
            }
        }

        next
    }
}

impl Validatable for FormElement {
    fn validate(&self) -> FormResult<()> {
        if self.id.is_empty() {
            return Err(FormError::validation("Element id cannot be empty"));
        }

        let issues = self.shape_issues();
        if !issues.is_empty() {
            return Err(FormError::element_validation(
                self.id.as_str(),
                issues.join("; "),
            ));
        }

        Ok(())
    }
}

impl Identifiable for FormElement {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

// ============================================================================
// ElementPatch
// ============================================================================

/// Partial update for a [`FormElement`]; unset fields are left untouched.
///
/// Clearable fields use `Option<Option<T>>`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub element_type: Option<ElementType>,
    pub label: Option<String>,
    pub placeholder: Option<Option<String>>,
    pub help_text: Option<Option<String>>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub validation: Option<Option<ValidationRules>>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn help_text(mut self, help_text: Option<String>) -> Self {
        self.help_text = Some(help_text);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn validation(mut self, validation: Option<ValidationRules>) -> Self {
        self.validation = Some(validation);
        self
    }

    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_select_has_default_options() {
        let element = FormElement::new("select-1", ElementType::Select);
        assert_eq!(element.label, "New select");
        assert!(!element.required);
        assert_eq!(
            element.options,
            Some(vec!["Option 1".to_string(), "Option 2".to_string()])
        );
        assert!(element.is_valid());
    }

    #[test]
    fn test_new_text_has_no_options() {
        let element = FormElement::new("text-1", ElementType::Text);
        assert_eq!(element.options, None);
        assert!(element.is_valid());
    }

    #[test]
    fn test_options_invariant() {
        let mut element = FormElement::new("radio-1", ElementType::Radio);
        element.options = Some(vec![]);
        assert!(element.validate().unwrap_err().is_validation());

        element.options = None;
        assert!(!element.is_valid());

        let text = FormElement::new("text-1", ElementType::Text).with_options(["a"]);
        assert!(!text.is_valid());
    }

    #[test]
    fn test_validation_rules_type_appropriate() {
        let text = FormElement::new("t", ElementType::Text)
            .with_validation(ValidationRules::new().with_range(Some(1.0), Some(5.0)));
        assert!(!text.is_valid());

        let rating = FormElement::new("r", ElementType::Rating)
            .with_validation(ValidationRules::new().with_range(Some(1.0), Some(5.0)));
        assert!(rating.is_valid());

        let inverted = FormElement::new("n", ElementType::Number)
            .with_validation(ValidationRules::new().with_range(Some(10.0), Some(1.0)));
        assert!(!inverted.is_valid());
    }

    #[test]
    fn test_pattern_must_compile() {
        let ok = FormElement::new("t", ElementType::Text)
            .with_validation(ValidationRules::new().with_pattern(r"^[a-zA-Z\s]+$"));
        assert!(ok.is_valid());

        let bad = FormElement::new("t", ElementType::Text)
            .with_validation(ValidationRules::new().with_pattern("(["));
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_pattern_allows_look_around() {
        let password = FormElement::new("p", ElementType::Text).with_validation(
            ValidationRules::new().with_pattern(r"^(?=.*[A-Z])(?=.*\d).{8,}$"),
        );
        assert!(password.is_valid());

        let no_digits_after = FormElement::new("u", ElementType::Url)
            .with_validation(ValidationRules::new().with_pattern(r"^https://(?!\d)"));
        assert!(no_digits_after.is_valid());
    }

    #[test]
    fn test_well_formed_requires_label() {
        let element = FormElement::new("t", ElementType::Text).with_label("  ");
        assert!(element.is_valid());
        assert!(element.check_well_formed().is_err());
    }

    #[test]
    fn test_patch_preserves_unspecified_fields() {
        let element = FormElement::new("e", ElementType::Email)
            .with_placeholder("you@example.com")
            .required();
        let patched = element.patched(&ElementPatch::new().label("Work email"));

        assert_eq!(patched.label, "Work email");
        assert_eq!(patched.placeholder.as_deref(), Some("you@example.com"));
        assert!(patched.required);
        assert_eq!(patched.id, element.id);
    }

    #[test]
    fn test_patch_clears_optional_field() {
        let element = FormElement::new("e", ElementType::Text).with_help_text("hint");
        let patched = element.patched(&ElementPatch::new().help_text(None));
        assert_eq!(patched.help_text, None);
    }

    #[test]
    fn test_patch_type_change_reconciles_options_and_rules() {
        let text = FormElement::new("x", ElementType::Text)
            .with_validation(ValidationRules::new().with_length(Some(2), Some(10)));
        let select = text.patched(&ElementPatch::new().element_type(ElementType::Select));
        assert_eq!(select.options, Some(default_options()));
        assert_eq!(select.validation, None);
        assert!(select.is_valid());

        let back = select.patched(&ElementPatch::new().element_type(ElementType::Text));
        assert_eq!(back.options, None);
        assert!(back.is_valid());
    }

    #[test]
    fn test_serde_wire_format() {
        let element = FormElement::new("s-1", ElementType::Select)
            .with_help_text("Pick one")
            .required();
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "s-1",
                "type": "select",
                "label": "New select",
                "required": true,
                "helpText": "Pick one",
                "options": ["Option 1", "Option 2"]
            })
        );
    }

    #[test]
    fn test_empty_patch() {
        assert!(ElementPatch::new().is_empty());
        assert!(!ElementPatch::new().required(true).is_empty());
    }
}
