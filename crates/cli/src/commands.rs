//! Command implementations
//!
//! Each command works on form files and returns what it produced so the
//! caller decides how to print it.

use crate::output;
use anyhow::{Context, Result, bail};
use formai_ai::{FormGenerator, GenerationRequest};
use formai_core::{ElementId, ElementType, Validatable};
use formai_model::{EditableFormDocument, ElementPatch, FormRecord, load_form, read_form, save_form};
use std::path::Path;
use tracing::info;

/// Generate a form, optionally saving it to `output`
pub async fn generate(
    generator: &FormGenerator,
    request: &GenerationRequest,
    output: Option<&Path>,
) -> Result<FormRecord> {
    let generated = generator.generate(request).await?;
    output::print_generation_summary(&generated, generator.model_id());

    let mut document = EditableFormDocument::new();
    generated.apply_to(&mut document)?;
    let record = document.to_record();

    if let Some(path) = output {
        save_form(&record, path)
            .with_context(|| format!("Failed to save generated form to {}", path.display()))?;
        output::success(&format!("Saved to {}", path.display()));
    }
    Ok(record)
}

/// Rework the elements of the form in `file`; the result is written to
/// `output`, or back to `file` when no output is given
pub async fn improve(
    generator: &FormGenerator,
    file: &Path,
    request: &str,
    output: Option<&Path>,
) -> Result<FormRecord> {
    let mut document = open(file)?;
    let improved = generator.improve(document.elements(), request).await?;

    let title = document.title().to_string();
    let description = document.description().map(str::to_string);
    document.replace_all(improved, title, description)?;

    let record = document.to_record();
    let target = output.unwrap_or(file);
    save_form(&record, target)
        .with_context(|| format!("Failed to save improved form to {}", target.display()))?;
    info!("Improved form written to {}", target.display());
    Ok(record)
}

pub fn show(file: &Path) -> Result<FormRecord> {
    let record = load_form(file).with_context(|| format!("Failed to open {}", file.display()))?;
    Ok(record)
}

/// Every issue found in the form at `file`; empty when the form is valid
pub fn validate(file: &Path) -> Result<Vec<String>> {
    let record = read_form(file).with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(record.validation_errors())
}

/// Append a new element to the form in `file` and save it in place
pub fn add(file: &Path, element_type: ElementType, label: Option<&str>) -> Result<ElementId> {
    if label.is_some_and(|l| l.trim().is_empty()) {
        bail!("Label must not be empty");
    }

    let mut document = open(file)?;
    let id = document.add_element(element_type);
    if let Some(label) = label {
        document.update_element(id.as_str(), &ElementPatch::new().label(label))?;
    }

    save_form(&document.to_record(), file)
        .with_context(|| format!("Failed to save {}", file.display()))?;
    Ok(id)
}

fn open(file: &Path) -> Result<EditableFormDocument> {
    let record = load_form(file).with_context(|| format!("Failed to open {}", file.display()))?;
    Ok(EditableFormDocument::from_record(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use formai_ai::{GenerativeModel, ModelReply};
    use formai_core::FormResult;
    use formai_model::FormElement;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct Canned(&'static str);

    #[async_trait]
    impl GenerativeModel for Canned {
        fn model_id(&self) -> &str {
            "canned"
        }

        async fn generate_content(&self, _prompt: &str) -> FormResult<ModelReply> {
            Ok(ModelReply::new(self.0))
        }
    }

    fn generator(reply: &'static str) -> FormGenerator {
        FormGenerator::new(Arc::new(Canned(reply)))
    }

    fn write_sample(path: &Path) {
        let record = FormRecord::new("Contact").with_elements(vec![
            FormElement::new("name", ElementType::Text)
                .with_label("Name")
                .required(),
        ]);
        save_form(&record, path).unwrap();
    }

    #[tokio::test]
    async fn test_generate_saves_form() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("survey.formai.json");
        let reply = r#"{"title": "Survey", "elements": [{"type": "rating", "label": "Score"}]}"#;

        let record = generate(
            &generator(reply),
            &GenerationRequest::new("A short satisfaction survey"),
            Some(&path),
        )
        .await
        .unwrap();

        assert_eq!(record.title, "Survey");
        assert_eq!(load_form(&path).unwrap(), record);
    }

    #[tokio::test]
    async fn test_generate_rejects_short_description() {
        let err = generate(&generator("{}"), &GenerationRequest::new("short"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at least 10 characters"));
    }

    #[tokio::test]
    async fn test_improve_rewrites_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contact.formai.json");
        write_sample(&path);
        let reply = r#"{"elements": [
            {"id": "name", "type": "text", "label": "Full name", "required": true},
            {"type": "email", "label": "Email", "required": true}
        ]}"#;

        improve(&generator(reply), &path, "Also ask for an email", None)
            .await
            .unwrap();

        let saved = load_form(&path).unwrap();
        assert_eq!(saved.title, "Contact");
        assert_eq!(saved.elements.len(), 2);
        assert_eq!(saved.elements[0].label, "Full name");
    }

    #[test]
    fn test_add_and_validate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contact.formai.json");
        write_sample(&path);

        let id = add(&path, ElementType::Checkbox, Some("Topics")).unwrap();
        assert!(id.as_str().starts_with("checkbox-"));

        let saved = show(&path).unwrap();
        assert_eq!(saved.elements.len(), 2);
        assert_eq!(saved.elements[1].label, "Topics");
        assert_eq!(saved.elements[1].option_list(), ["Option 1", "Option 2"]);
        assert!(validate(&path).unwrap().is_empty());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.formai.json");
        std::fs::write(
            &path,
            r#"{"title": "Broken", "elements": [
                {"id": "a", "type": "text", "label": ""},
                {"id": "a", "type": "select", "label": "Pick", "options": []}
            ]}"#,
        )
        .unwrap();

        let issues = validate(&path).unwrap();
        assert_eq!(issues.len(), 3);
        assert!(show(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = show(&dir.path().join("absent.formai.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
