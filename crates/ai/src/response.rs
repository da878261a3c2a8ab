//! Parsing model replies
//!
//! A reply goes through three stages, each with its own failure:
//!
//! 1. locate the `{ ... }` span ([`NoJsonFound`](FormError::NoJsonFound))
//! 2. repair and parse it as JSON ([`InvalidJson`](FormError::InvalidJson))
//! 3. check it against the form schema
//!    ([`SchemaViolation`](FormError::SchemaViolation))
//!
//! Every failure carries the raw reply. Elements without an id receive
//! `element-<millis>-<index>`.

use crate::extract::extract_json_span;
use crate::repair::repair_json;
use formai_core::{DEFAULT_FORM_TITLE, ElementId, FormError, FormResult};
use formai_model::{
    EditableFormDocument, FormElement, FormRecord, IdPolicy, duplicate_id_issues, parse_elements,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// A form produced by the generative model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedForm {
    pub title: String,
    pub description: String,
    pub estimated_time: String,
    pub elements: Vec<FormElement>,

    /// Wall time of the model call
    #[serde(default)]
    pub generation_time_ms: u64,

    /// Tokens reported by the model, or 0 when unknown
    #[serde(default)]
    pub tokens_used: u64,
}

impl GeneratedForm {
    /// Replace the contents of `document` with this form
    pub fn apply_to(&self, document: &mut EditableFormDocument) -> FormResult<()> {
        document.replace_all(
            self.elements.clone(),
            self.title.clone(),
            (!self.description.is_empty()).then(|| self.description.clone()),
        )
    }

    /// Persistable record of this form with default settings
    pub fn to_record(&self) -> FormRecord {
        let record = FormRecord::new(self.title.clone()).with_elements(self.elements.clone());
        if self.description.is_empty() {
            record
        } else {
            record.with_description(self.description.clone())
        }
    }
}

/// Parse a full generation reply
pub fn parse_form_reply(raw: &str, batch_millis: i64) -> FormResult<GeneratedForm> {
    let object = parse_object(raw)?;
    let mut issues = Vec::new();

    let title = text_field(&object, "title", &mut issues)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FORM_TITLE.to_string());
    let description = text_field(&object, "description", &mut issues).unwrap_or_default();
    let estimated_time = text_field(&object, "estimatedTime", &mut issues).unwrap_or_default();

    let elements = match elements_field(&object, batch_millis) {
        Ok(elements) => Some(elements),
        Err(mut element_issues) => {
            issues.append(&mut element_issues);
            None
        }
    };

    match elements {
        Some(elements) if issues.is_empty() => Ok(GeneratedForm {
            title,
            description,
            estimated_time,
            elements,
            generation_time_ms: 0,
            tokens_used: 0,
        }),
        _ => Err(schema_violation(issues, raw)),
    }
}

/// Parse a reply that only carries an `elements` array
pub fn parse_elements_reply(raw: &str, batch_millis: i64) -> FormResult<Vec<FormElement>> {
    let object = parse_object(raw)?;
    elements_field(&object, batch_millis).map_err(|issues| schema_violation(issues, raw))
}

fn parse_object(raw: &str) -> FormResult<Map<String, Value>> {
    let span = extract_json_span(raw).inspect_err(|_| warn!("Model reply contains no JSON object"))?;
    let repaired = repair_json(span);

    let value: Value = serde_json::from_str(&repaired).map_err(|e| {
        warn!("Model reply is not valid JSON: {}", e);
        FormError::InvalidJson {
            message: e.to_string(),
            raw: raw.to_string(),
        }
    })?;

    match value {
        Value::Object(object) => Ok(object),
        _ => Err(schema_violation(
            vec!["expected a JSON object".to_string()],
            raw,
        )),
    }
}

fn elements_field(object: &Map<String, Value>, batch_millis: i64) -> Result<Vec<FormElement>, Vec<String>> {
    let value = match object.get("elements") {
        None | Some(Value::Null) => return Err(vec!["elements: missing".to_string()]),
        Some(value) => value,
    };

    let mut elements = parse_elements(value, "elements", IdPolicy::Optional)?;
    assign_missing_ids(&mut elements, batch_millis);

    let duplicates = duplicate_id_issues(&elements, "elements");
    if duplicates.is_empty() {
        Ok(elements)
    } else {
        Err(duplicates)
    }
}

/// Give every element without an id the batch id for its position
pub fn assign_missing_ids(elements: &mut [FormElement], batch_millis: i64) {
    for (index, element) in elements.iter_mut().enumerate() {
        if element.id.is_empty() {
            element.id = ElementId::for_batch(batch_millis, index);
        }
    }
}

fn text_field(object: &Map<String, Value>, key: &str, issues: &mut Vec<String>) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            issues.push(format!("{}: expected a string", key));
            None
        }
    }
}

fn schema_violation(issues: Vec<String>, raw: &str) -> FormError {
    warn!("Model reply rejected: {}", issues.join("; "));
    FormError::SchemaViolation {
        issues,
        raw: raw.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
