//! Strict element schema
//!
//! Converts untyped JSON (model output, API request bodies) into
//! [`FormElement`]s. Nothing is guessed or coerced: every deviation from the
//! element shape is reported as a path-annotated issue such as
//! `elements[2].type: unknown element type 'slider'`, and a single issue
//! rejects the input.

use crate::element::{FormElement, ValidationRules};
use formai_core::{ElementId, ElementType};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Whether element ids must be present in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Missing or empty ids are an issue
    Required,
    /// Missing ids are left empty for the caller to assign
    Optional,
}

/// Parse an array of elements found at `path`
pub fn parse_elements(
    value: &Value,
    path: &str,
    ids: IdPolicy,
) -> Result<Vec<FormElement>, Vec<String>> {
    let Some(items) = value.as_array() else {
        return Err(vec![format!("{}: expected an array", path)]);
    };

    let mut elements = Vec::with_capacity(items.len());
    let mut issues = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match parse_element(item, &format!("{}[{}]", path, index), ids) {
            Ok(element) => elements.push(element),
            Err(mut element_issues) => issues.append(&mut element_issues),
        }
    }

    if issues.is_empty() {
        Ok(elements)
    } else {
        Err(issues)
    }
}

/// Parse a single element object found at `path`
pub fn parse_element(value: &Value, path: &str, ids: IdPolicy) -> Result<FormElement, Vec<String>> {
    let Some(object) = value.as_object() else {
        return Err(vec![format!("{}: expected an object", path)]);
    };

    let mut issues = Vec::new();

    let id = match optional_string(object, "id", path, &mut issues) {
        Some(id) if !id.trim().is_empty() => ElementId::new(id),
        _ => {
            if ids == IdPolicy::Required {
                issues.push(format!("{}.id: missing or empty", path));
            }
            ElementId::new("")
        }
    };

    let element_type = match object.get("type") {
        None | Some(Value::Null) => {
            issues.push(format!("{}.type: missing", path));
            None
        }
        Some(Value::String(name)) => match name.parse::<ElementType>() {
            Ok(element_type) => Some(element_type),
            Err(_) => {
                issues.push(format!(
                    "{}.type: unknown element type '{}' (expected one of {})",
                    path,
                    name,
                    ElementType::wire_names()
                ));
                None
            }
        },
        Some(_) => {
            issues.push(format!("{}.type: expected a string", path));
            None
        }
    };

    let label = match object.get("label") {
        Some(Value::String(label)) if !label.trim().is_empty() => Some(label.clone()),
        Some(Value::String(_)) => {
            issues.push(format!("{}.label: must not be empty", path));
            None
        }
        None | Some(Value::Null) => {
            issues.push(format!("{}.label: missing", path));
            None
        }
        Some(_) => {
            issues.push(format!("{}.label: expected a string", path));
            None
        }
    };

    let placeholder = optional_string(object, "placeholder", path, &mut issues);
    let help_text = optional_string(object, "helpText", path, &mut issues);

    let required = match object.get("required") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(required)) => *required,
        Some(_) => {
            issues.push(format!("{}.required: expected a boolean", path));
            false
        }
    };

    let options = match object.get("options") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => {
            let mut options = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(option) => options.push(option.to_string()),
                    None => issues.push(format!(
                        "{}.options[{}]: expected a string",
                        path, index
                    )),
                }
            }
            Some(options)
        }
        Some(_) => {
            issues.push(format!("{}.options: expected an array of strings", path));
            None
        }
    };

    let validation = match object.get("validation") {
        None | Some(Value::Null) => None,
        Some(Value::Object(rules)) => {
            parse_rules(rules, &format!("{}.validation", path), &mut issues)
        }
        Some(_) => {
            issues.push(format!("{}.validation: expected an object", path));
            None
        }
    };

    let (Some(element_type), Some(label)) = (element_type, label) else {
        return Err(issues);
    };

    let element = FormElement {
        id,
        element_type,
        label,
        placeholder,
        required,
        help_text,
        options,
        validation,
    };

    issues.extend(
        element
            .shape_issues()
            .into_iter()
            .map(|issue| format!("{}: {}", path, issue)),
    );

    if issues.is_empty() {
        Ok(element)
    } else {
        Err(issues)
    }
}

/// Report every id that appears more than once in `elements`
pub fn duplicate_id_issues(elements: &[FormElement], path: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        if !element.id.is_empty() && !seen.insert(element.id.as_str()) {
            issues.push(format!(
                "{}[{}].id: duplicate id '{}'",
                path, index, element.id
            ));
        }
    }
    issues
}

fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Vec<String>,
) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            issues.push(format!("{}.{}: expected a string", path, key));
            None
        }
    }
}

fn parse_rules(
    rules: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<String>,
) -> Option<ValidationRules> {
    let mut parsed = ValidationRules::new();

    parsed.min_length = length_rule(rules, "minLength", path, issues);
    parsed.max_length = length_rule(rules, "maxLength", path, issues);
    parsed.pattern = optional_string(rules, "pattern", path, issues);
    parsed.min = number_rule(rules, "min", path, issues);
    parsed.max = number_rule(rules, "max", path, issues);

    (!parsed.is_empty()).then_some(parsed)
}

fn length_rule(
    rules: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Vec<String>,
) -> Option<u32> {
    match rules.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                issues.push(format!(
                    "{}.{}: expected a non-negative integer",
                    path, key
                ));
                None
            }
        },
    }
}

fn number_rule(
    rules: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Vec<String>,
) -> Option<f64> {
    match rules.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_f64() {
            Some(n) => Some(n),
            None => {
                issues.push(format!("{}.{}: expected a number", path, key));
                None
            }
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_minimal_element() {
        let element = parse_element(
            &json!({"type": "text", "label": "Name", "required": true}),
            "elements[0]",
            IdPolicy::Optional,
        )
        .unwrap();

        assert!(element.id.is_empty());
        assert_eq!(element.element_type, ElementType::Text);
        assert_eq!(element.label, "Name");
        assert!(element.required);
    }

    #[test]
    fn test_missing_type_is_reported() {
        let issues = parse_element(&json!({"label": "Name"}), "elements[0]", IdPolicy::Optional)
            .unwrap_err();
        assert_eq!(issues, vec!["elements[0].type: missing".to_string()]);
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let issues = parse_element(
            &json!({"type": "slider", "label": "Volume"}),
            "elements[3]",
            IdPolicy::Optional,
        )
        .unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("elements[3].type: unknown element type 'slider'"));
    }

    #[test]
    fn test_required_id_policy() {
        let issues = parse_element(
            &json!({"type": "email", "label": "Email"}),
            "elements[0]",
            IdPolicy::Required,
        )
        .unwrap_err();
        assert_eq!(issues, vec!["elements[0].id: missing or empty".to_string()]);
    }

    #[test]
    fn test_all_issues_are_collected() {
        let issues = parse_elements(
            &json!([
                {"type": "select", "label": "Country", "options": []},
                {"type": "text", "label": 5, "required": "yes"},
            ]),
            "elements",
            IdPolicy::Optional,
        )
        .unwrap_err();

        assert_eq!(
            issues,
            vec![
                "elements[0]: options must contain at least one entry".to_string(),
                "elements[1].label: expected a string".to_string(),
                "elements[1].required: expected a boolean".to_string(),
            ]
        );
    }

    #[test]
    fn test_validation_rules_parsed() {
        let element = parse_element(
            &json!({
                "id": "age",
                "type": "number",
                "label": "Age",
                "validation": {"min": 18, "max": 120}
            }),
            "elements[0]",
            IdPolicy::Required,
        )
        .unwrap();
        assert_eq!(
            element.validation,
            Some(ValidationRules::new().with_range(Some(18.0), Some(120.0)))
        );
    }

    #[test]
    fn test_inapplicable_rules_rejected() {
        let issues = parse_element(
            &json!({
                "type": "text",
                "label": "Name",
                "validation": {"minLength": 2, "min": 1}
            }),
            "elements[0]",
            IdPolicy::Optional,
        )
        .unwrap_err();
        assert_eq!(
            issues,
            vec!["elements[0]: min/max do not apply to 'text' elements".to_string()]
        );
    }

    #[test]
    fn test_negative_length_rejected() {
        let issues = parse_element(
            &json!({"type": "text", "label": "Name", "validation": {"minLength": -1}}),
            "e",
            IdPolicy::Optional,
        )
        .unwrap_err();
        assert_eq!(
            issues,
            vec!["e.validation.minLength: expected a non-negative integer".to_string()]
        );
    }

    #[test]
    fn test_non_array_rejected() {
        let issues = parse_elements(&json!({"type": "text"}), "elements", IdPolicy::Optional)
            .unwrap_err();
        assert_eq!(issues, vec!["elements: expected an array".to_string()]);
    }

    #[test]
    fn test_duplicate_ids() {
        let elements = vec![
            FormElement::new("a", ElementType::Text),
            FormElement::new("b", ElementType::Text),
            FormElement::new("a", ElementType::Email),
        ];
        assert_eq!(
            duplicate_id_issues(&elements, "elements"),
            vec!["elements[2].id: duplicate id 'a'".to_string()]
        );
    }
}
