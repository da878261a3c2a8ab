//! Form generation client
//!
//! [`FormGenerator`] validates the request, renders the prompt, makes one
//! model call and parses the reply. It never touches a document itself; the
//! caller applies the result with [`GeneratedForm::apply_to`] or
//! `replace_all`, so a failed generation leaves the document as it was.
//!
//! Only one model call may be outstanding per generator. A second call made
//! while the first is suspended fails with `GenerationInProgress` without
//! reaching the model.

use crate::config::AiConfig;
use crate::model::{GeminiModel, GenerativeModel};
use crate::prompt::{GenerationRequest, improvement_prompt};
use crate::response::{GeneratedForm, parse_elements_reply, parse_form_reply};
use formai_core::{Clock, FormError, FormResult, SystemClock};
use formai_model::FormElement;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Generates and improves forms with a generative model
pub struct FormGenerator {
    model: Arc<dyn GenerativeModel>,
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
}

impl FormGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            clock: Arc::new(SystemClock),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Generator backed by Gemini
    pub fn from_config(config: AiConfig) -> FormResult<Self> {
        Ok(Self::new(Arc::new(GeminiModel::new(config)?)))
    }

    /// Use `clock` for the time component of assigned element ids
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Id of the underlying model
    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Whether a model call is outstanding
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Generate a complete form from `request`
    pub async fn generate(&self, request: &GenerationRequest) -> FormResult<GeneratedForm> {
        request.validate()?;
        let _guard = InFlight::acquire(&self.in_flight)?;

        info!(
            "Generating form with {} ({} char description)",
            self.model.model_id(),
            request.description.chars().count()
        );
        let started = Instant::now();
        let reply = self.model.generate_content(&request.prompt()).await?;
        let elapsed = started.elapsed();

        let mut form = parse_form_reply(&reply.text, self.clock.now_millis())?;
        form.generation_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        form.tokens_used = reply.tokens_used;

        info!(
            "Generated '{}' with {} elements in {} ms",
            form.title,
            form.elements.len(),
            form.generation_time_ms
        );
        Ok(form)
    }

    /// Ask the model to rework `elements` according to `request`
    pub async fn improve(
        &self,
        elements: &[FormElement],
        request: &str,
    ) -> FormResult<Vec<FormElement>> {
        if request.trim().is_empty() {
            return Err(FormError::validation("Improvement request cannot be empty"));
        }
        let prompt = improvement_prompt(elements, request)?;
        let _guard = InFlight::acquire(&self.in_flight)?;

        info!("Improving {} elements with {}", elements.len(), self.model.model_id());
        let reply = self.model.generate_content(&prompt).await?;
        let improved = parse_elements_reply(&reply.text, self.clock.now_millis())?;

        info!("Improved form has {} elements", improved.len());
        Ok(improved)
    }
}

impl std::fmt::Debug for FormGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormGenerator")
            .field("model", &self.model.model_id())
            .field("in_flight", &self.is_generating())
            .finish()
    }
}

/// Holds the single-flight flag for the duration of a call
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> FormResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| InFlight(flag))
            .map_err(|_| {
                warn!("Rejected generation request: another is in progress");
                FormError::GenerationInProgress
            })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelReply;
    use async_trait::async_trait;
    use formai_core::{ElementType, ErrorKind, FixedClock};
    use formai_model::EditableFormDocument;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Replies with canned text and records the prompts it receives
    struct StubModel {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerativeModel for StubModel {
        fn model_id(&self) -> &str {
            "stub"
        }

        async fn generate_content(&self, prompt: &str) -> FormResult<ModelReply> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(ModelReply {
                    text: text.clone(),
                    tokens_used: 7,
                }),
                Err(message) => Err(FormError::upstream(message.clone())),
            }
        }
    }

    /// Blocks until released, to hold a call in flight
    struct GatedModel {
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerativeModel for GatedModel {
        fn model_id(&self) -> &str {
            "gated"
        }

        async fn generate_content(&self, _prompt: &str) -> FormResult<ModelReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(ModelReply::new(THREE_FIELDS))
        }
    }

    const THREE_FIELDS: &str = r#"Here is your form:
{
  "title": "Contact Us",
  "description": "Get in touch",
  "estimatedTime": "2 minutes",
  "elements": [
    {"type": "text", "label": "Name", "required": true, "placeholder": "Jane Doe"},
    {"type": "email", "label": "Email", "required": true},
    {"type": "textarea", "label": "Message", "validation": {"minLength": 10, "maxLength": 500}}
  ]
}"#;

    fn generator(model: Arc<dyn GenerativeModel>) -> FormGenerator {
        FormGenerator::new(model).with_clock(Arc::new(FixedClock::new(1_234)))
    }

    #[tokio::test]
    async fn test_generate_three_field_form() {
        let model = StubModel::replying(THREE_FIELDS);
        let form = generator(model.clone())
            .generate(&GenerationRequest::new("Make a 3-field contact form"))
            .await
            .unwrap();

        assert_eq!(form.title, "Contact Us");
        assert_eq!(form.estimated_time, "2 minutes");
        assert_eq!(form.tokens_used, 7);
        assert_eq!(form.elements.len(), 3);

        let mut document = EditableFormDocument::new();
        form.apply_to(&mut document).unwrap();
        assert_eq!(document.len(), 3);
        assert!(document.elements().iter().all(|e| !e.id.is_empty()));
        assert_eq!(document.elements()[0].id, "element-1234-0");
        assert_eq!(document.title(), "Contact Us");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_request() {
        let model = StubModel::replying(THREE_FIELDS);
        generator(model.clone())
            .generate(&GenerationRequest::new("Make a 3-field contact form").with_form_type("Contact"))
            .await
            .unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Description: Make a 3-field contact form"));
        assert!(prompts[0].contains("Form Type: Contact"));
    }

    #[tokio::test]
    async fn test_short_description_rejected_before_call() {
        let model = StubModel::replying(THREE_FIELDS);
        let err = generator(model.clone())
            .generate(&GenerationRequest::new("too short"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_reply_leaves_document_unchanged() {
        let mut document = EditableFormDocument::new();
        document.add_element(ElementType::Text);
        let before = document.to_record();

        let model = StubModel::replying("{ \"title\": \"x\" ");
        let result = generator(model)
            .generate(&GenerationRequest::new("A registration form for a conference"))
            .await;

        let err = result.unwrap_err();
        assert!(err.is_malformed_response());
        assert_eq!(document.to_record(), before);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let model = StubModel::failing("connection reset");
        let generator = generator(model);
        let err = generator
            .generate(&GenerationRequest::new("A registration form for a conference"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert!(!generator.is_generating());
    }

    #[tokio::test]
    async fn test_concurrent_generate_rejected() {
        let model = Arc::new(GatedModel {
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let generator = Arc::new(generator(model.clone()));
        let request = GenerationRequest::new("Make a 3-field contact form");

        let first = {
            let generator = generator.clone();
            let request = request.clone();
            tokio::spawn(async move { generator.generate(&request).await })
        };
        while model.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err, FormError::GenerationInProgress));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        model.release.notify_one();
        let form = first.await.unwrap().unwrap();
        assert_eq!(form.elements.len(), 3);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert!(!generator.is_generating());
    }

    #[tokio::test]
    async fn test_improve() {
        let model = StubModel::replying(
            r#"{"elements": [{"id": "name", "type": "text", "label": "Full name", "required": true}]}"#,
        );
        let current = vec![FormElement::new("name", ElementType::Text).with_label("Name")];
        let improved = generator(model.clone())
            .improve(&current, "Make the name required")
            .await
            .unwrap();

        assert_eq!(improved.len(), 1);
        assert_eq!(improved[0].label, "Full name");
        assert!(improved[0].required);
        assert!(model.prompts.lock().unwrap()[0].contains("Make the name required"));
    }

    #[tokio::test]
    async fn test_improve_requires_request() {
        let model = StubModel::replying("{}");
        let err = generator(model.clone()).improve(&[], "  ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(model.calls(), 0);
    }
}
