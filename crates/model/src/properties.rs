//! Properties panel
//!
//! A stateless view over the selected element of a document. Every edit is
//! expressed as an [`ElementPatch`] and applied through
//! [`EditableFormDocument::update_element`], so the editor never holds a
//! copy that could go stale.

use crate::document::EditableFormDocument;
use crate::element::{ElementPatch, FormElement, ValidationRules};
use formai_core::{ElementId, ElementType, FormError, FormResult};

/// Edits the currently selected element of a document
pub struct PropertiesEditor<'a> {
    document: &'a mut EditableFormDocument,
}

impl<'a> PropertiesEditor<'a> {
    pub fn new(document: &'a mut EditableFormDocument) -> Self {
        Self { document }
    }

    /// The element being edited, if any is selected
    pub fn element(&self) -> Option<&FormElement> {
        self.document.selected()
    }

    // ========================================================================
    // Basic fields
    // ========================================================================

    pub fn set_label(&mut self, label: impl Into<String>) -> FormResult<()> {
        self.apply(ElementPatch::new().label(label))
    }

    /// Set the placeholder; an empty string clears it
    pub fn set_placeholder(&mut self, placeholder: &str) -> FormResult<()> {
        self.apply(ElementPatch::new().placeholder(non_empty(placeholder)))
    }

    /// Set the help text; an empty string clears it
    pub fn set_help_text(&mut self, help_text: &str) -> FormResult<()> {
        self.apply(ElementPatch::new().help_text(non_empty(help_text)))
    }

    pub fn set_required(&mut self, required: bool) -> FormResult<()> {
        self.apply(ElementPatch::new().required(required))
    }

    pub fn set_type(&mut self, element_type: ElementType) -> FormResult<()> {
        self.apply(ElementPatch::new().element_type(element_type))
    }

    // ========================================================================
    // Options
    // ========================================================================

    /// Append `"Option <n+1>"` and return its index
    pub fn add_option(&mut self) -> FormResult<usize> {
        let mut options = self.options()?;
        options.push(format!("Option {}", options.len() + 1));
        let index = options.len() - 1;
        self.apply(ElementPatch::new().options(options))?;
        Ok(index)
    }

    pub fn update_option(&mut self, index: usize, value: impl Into<String>) -> FormResult<()> {
        let mut options = self.options()?;
        let slot = options
            .get_mut(index)
            .ok_or_else(|| FormError::validation(format!("no option at index {}", index)))?;
        *slot = value.into();
        self.apply(ElementPatch::new().options(options))
    }

    /// Remove the option at `index`. The last remaining option cannot be
    /// removed.
    pub fn remove_option(&mut self, index: usize) -> FormResult<()> {
        let mut options = self.options()?;
        if index >= options.len() {
            return Err(FormError::validation(format!("no option at index {}", index)));
        }
        if options.len() == 1 {
            return Err(FormError::validation(
                "an element with options must keep at least one option",
            ));
        }
        options.remove(index);
        self.apply(ElementPatch::new().options(options))
    }

    // ========================================================================
    // Validation rules
    // ========================================================================

    pub fn set_length_rules(&mut self, min: Option<u32>, max: Option<u32>) -> FormResult<()> {
        self.update_rules(|rules| {
            rules.min_length = min;
            rules.max_length = max;
        })
    }

    pub fn set_range(&mut self, min: Option<f64>, max: Option<f64>) -> FormResult<()> {
        self.update_rules(|rules| {
            rules.min = min;
            rules.max = max;
        })
    }

    /// Set the pattern; an empty string clears it
    pub fn set_pattern(&mut self, pattern: &str) -> FormResult<()> {
        let pattern = non_empty(pattern);
        self.update_rules(|rules| rules.pattern = pattern)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn selected_id(&self) -> FormResult<ElementId> {
        self.document
            .selected_id()
            .cloned()
            .ok_or_else(|| FormError::validation("no element is selected"))
    }

    fn selected(&self) -> FormResult<&FormElement> {
        self.document
            .selected()
            .ok_or_else(|| FormError::validation("no element is selected"))
    }

    fn options(&self) -> FormResult<Vec<String>> {
        let element = self.selected()?;
        if !element.element_type.has_options() {
            return Err(FormError::element_validation(
                element.id.as_str(),
                format!("'{}' elements have no options", element.element_type),
            ));
        }
        Ok(element.option_list().to_vec())
    }

    fn update_rules(&mut self, edit: impl FnOnce(&mut ValidationRules)) -> FormResult<()> {
        let mut rules = self.selected()?.validation.clone().unwrap_or_default();
        edit(&mut rules);
        let rules = (!rules.is_empty()).then_some(rules);
        self.apply(ElementPatch::new().validation(rules))
    }

    fn apply(&mut self, patch: ElementPatch) -> FormResult<()> {
        let id = self.selected_id()?;
        self.document.update_element(id.as_str(), &patch)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// ============================================================================
// Tests
// ============================================================================
