//! Prompt construction
//!
//! The prompts spell out the exact JSON shape the reply must take, including
//! the allowed element types, so that the response parser can be strict.

use formai_core::{ElementType, FormError, FormResult};
use formai_model::FormElement;
use serde::{Deserialize, Serialize};

/// Minimum length of a generation description, in characters
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Parameters of a form generation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_requirements: Option<String>,
}

impl GenerationRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_form_type(mut self, form_type: impl Into<String>) -> Self {
        self.form_type = Some(form_type.into());
        self
    }

    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = Some(audience.into());
        self
    }

    pub fn with_additional_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.additional_requirements = Some(requirements.into());
        self
    }

    /// Reject descriptions shorter than [`MIN_DESCRIPTION_CHARS`]
    pub fn validate(&self) -> FormResult<()> {
        if self.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(FormError::validation(format!(
                "Description must be at least {} characters",
                MIN_DESCRIPTION_CHARS
            )));
        }
        Ok(())
    }

    /// Render the generation prompt
    pub fn prompt(&self) -> String {
        format!(
            r#"
You are an expert form designer. Generate a comprehensive form based on the following requirements:

Description: {description}
Form Type: {form_type}
Target Audience: {audience}
Additional Requirements: {requirements}

Please create a form with the following specifications:
1. Generate appropriate form elements ({type_list})
2. Include proper validation rules where appropriate
3. Add helpful placeholder text and help text
4. Make required fields logical and user-friendly
5. Suggest a good form title and description
6. Estimate completion time

Return the response in this exact JSON format:
{{
  "title": "Form Title",
  "description": "Form description",
  "estimatedTime": "X minutes",
  "elements": [
    {{
      "id": "full-name",
      "type": "text",
      "label": "Full Name",
      "placeholder": "Jane Doe",
      "required": true,
      "helpText": "Help text for users",
      "validation": {{
        "minLength": 2,
        "maxLength": 100
      }}
    }},
    {{
      "id": "attendees",
      "type": "number",
      "label": "Number of attendees",
      "required": false,
      "validation": {{
        "min": 1,
        "max": 10
      }}
    }},
    {{
      "id": "contact-method",
      "type": "radio",
      "label": "Preferred contact method",
      "required": true,
      "options": ["Email", "Phone"]
    }}
  ]
}}

Element rules:
- "type" is one of {type_enum}
- "options" is required for select, radio and checkbox, and not allowed on other types
- "minLength", "maxLength" and "pattern" apply only to text, email, phone, textarea and url
- "min" and "max" apply only to number and rating

Make sure the form is practical, user-friendly, and follows best practices for form design. Include 5-15 fields depending on the complexity needed.
"#,
            description = self.description,
            form_type = or_default(&self.form_type, "General"),
            audience = or_default(&self.target_audience, "General users"),
            requirements = or_default(&self.additional_requirements, "None"),
            type_list = type_list(),
            type_enum = ElementType::wire_names(),
        )
    }
}

/// Render the prompt asking the model to improve `elements`
pub fn improvement_prompt(elements: &[FormElement], request: &str) -> FormResult<String> {
    let current = serde_json::to_string_pretty(elements)?;
    Ok(format!(
        r#"
You are an expert form designer. I have an existing form with these elements:

{current}

Please improve this form based on this request: "{request}"

Return the improved form elements in this exact JSON format:
{{
  "elements": [
    // improved form elements array
  ]
}}

Make sure to maintain the same structure and only improve what was requested while keeping the form functional.
"#
    ))
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn type_list() -> String {
    ElementType::all()
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::parse_form_reply;

    #[test]
    fn test_description_length() {
        assert!(GenerationRequest::new("short").validate().unwrap_err().is_validation());
        assert!(GenerationRequest::new("          x").validate().is_err());
        assert!(GenerationRequest::new("Contact form").validate().is_ok());
    }

    #[test]
    fn test_prompt_defaults() {
        let prompt = GenerationRequest::new("A job application form").prompt();
        assert!(prompt.contains("Description: A job application form"));
        assert!(prompt.contains("Form Type: General\n"));
        assert!(prompt.contains("Target Audience: General users\n"));
        assert!(prompt.contains("Additional Requirements: None\n"));
    }

    #[test]
    fn test_prompt_embeds_parameters_and_schema() {
        let prompt = GenerationRequest::new("Customer feedback survey")
            .with_form_type("Survey")
            .with_target_audience("Restaurant guests")
            .with_additional_requirements("Include a rating")
            .prompt();

        assert!(prompt.contains("Form Type: Survey"));
        assert!(prompt.contains("Target Audience: Restaurant guests"));
        assert!(prompt.contains("Additional Requirements: Include a rating"));
        assert!(prompt.contains(
            r#""type" is one of text|email|number|phone|date|textarea|select|radio|checkbox|url|rating"#
        ));
        assert!(prompt.contains(r#""estimatedTime": "X minutes""#));
        assert!(prompt.contains("Include 5-15 fields"));
    }

    /// The JSON sample embedded in the generation prompt
    fn sample_reply(prompt: &str) -> &str {
        let start = prompt.find("JSON format:\n").unwrap() + "JSON format:\n".len();
        let end = prompt.find("\n\nElement rules:").unwrap();
        &prompt[start..end]
    }

    #[test]
    fn test_prompt_sample_is_a_valid_reply() {
        let prompt = GenerationRequest::new("Workshop registration").prompt();
        let form = parse_form_reply(sample_reply(&prompt), 1_000).unwrap();

        assert_eq!(form.title, "Form Title");
        assert_eq!(form.elements.len(), 3);
        assert_eq!(form.elements[0].element_type, ElementType::Text);
        assert_eq!(form.elements[1].element_type, ElementType::Number);
        assert_eq!(
            form.elements[2].option_list(),
            ["Email".to_string(), "Phone".to_string()]
        );
    }

    #[test]
    fn test_request_wire_format() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{"description": "Event signup form", "targetAudience": "Students"}"#,
        )
        .unwrap();
        assert_eq!(request.target_audience.as_deref(), Some("Students"));
        assert_eq!(request.form_type, None);
    }

    #[test]
    fn test_improvement_prompt() {
        let elements = vec![FormElement::new("a", ElementType::Text).with_label("Name")];
        let prompt = improvement_prompt(&elements, "make name required").unwrap();
        assert!(prompt.contains(r#""label": "Name""#));
        assert!(prompt.contains(r#"based on this request: "make name required""#));
    }
}
