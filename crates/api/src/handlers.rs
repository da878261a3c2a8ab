//! Request handlers
//!
//! [`FormsApi`] implements the form endpoints independent of any HTTP
//! framework. A host resolves the caller's identity, decodes the JSON body
//! and forwards both; the handler answers with an [`ApiResponse`].
//!
//! Request bodies are checked completely before anything is written, and a
//! form owned by another user is reported exactly like a missing one.

use crate::repository::{FormStatus, FormUpdate, FormsRepository, NewAiGeneration, NewForm, StoredForm};
use crate::response::ApiResponse;
use crate::user::CurrentUser;
use formai_ai::{FormGenerator, GeneratedForm, GenerationRequest};
use formai_core::{FormError, FormResult};
use formai_model::{FormSettings, IdPolicy, duplicate_id_issues, parse_elements};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Form endpoints over an injected repository and generator
#[derive(Clone)]
pub struct FormsApi {
    repo: Arc<dyn FormsRepository>,
    generator: Option<Arc<FormGenerator>>,
}

impl FormsApi {
    /// Endpoints without AI generation; `generate_form` reports missing configuration
    pub fn new(repo: Arc<dyn FormsRepository>) -> Self {
        Self {
            repo,
            generator: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<FormGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Generate a form from a description and record the generation
    pub async fn generate_form(&self, user: Option<&CurrentUser>, body: &Value) -> ApiResponse {
        ApiResponse::from_result(self.try_generate_form(user, body).await)
    }

    /// Store a new form for the caller
    pub async fn create_form(&self, user: Option<&CurrentUser>, body: &Value) -> ApiResponse {
        ApiResponse::from_result(self.try_create_form(user, body).await)
    }

    /// The caller's forms, most recently updated first
    pub async fn list_forms(&self, user: Option<&CurrentUser>) -> ApiResponse {
        ApiResponse::from_result(self.try_list_forms(user).await)
    }

    pub async fn get_form(&self, user: Option<&CurrentUser>, form_id: &str) -> ApiResponse {
        let result = match CurrentUser::require(user) {
            Ok(user) => self.owned_form(user, form_id).await,
            Err(e) => Err(e),
        };
        ApiResponse::from_result(result)
    }

    /// Apply a partial update to one of the caller's forms
    pub async fn update_form(
        &self,
        user: Option<&CurrentUser>,
        form_id: &str,
        body: &Value,
    ) -> ApiResponse {
        ApiResponse::from_result(self.try_update_form(user, form_id, body).await)
    }

    pub async fn delete_form(&self, user: Option<&CurrentUser>, form_id: &str) -> ApiResponse {
        ApiResponse::from_result(self.try_delete_form(user, form_id).await)
    }

    // ========================================================================
    // Implementation
    // ========================================================================

    async fn try_generate_form(
        &self,
        user: Option<&CurrentUser>,
        body: &Value,
    ) -> FormResult<GeneratedForm> {
        let user = CurrentUser::require(user)?;
        let generator = self.generator.as_ref().ok_or_else(|| {
            FormError::MissingConfig("Gemini API key not configured (set GEMINI_API_KEY)".into())
        })?;

        let request: GenerationRequest = serde_json::from_value(body.clone())
            .map_err(|e| FormError::validation(format!("Invalid request data: {}", e)))?;
        request.validate()?;

        let owner = self.repo.get_or_create_user(user).await?;
        let form = generator.generate(&request).await?;

        self.repo
            .record_generation(NewAiGeneration {
                user_id: owner.id,
                prompt: request.description.clone(),
                elements: form.elements.clone(),
                model: generator.model_id().to_string(),
                tokens_used: form.tokens_used,
                generation_time_ms: form.generation_time_ms,
            })
            .await?;

        Ok(form)
    }

    async fn try_create_form(&self, user: Option<&CurrentUser>, body: &Value) -> FormResult<StoredForm> {
        let user = CurrentUser::require(user)?;
        let fields = parse_form_body(body, BodyMode::Create)?;

        let owner = self.repo.get_or_create_user(user).await?;
        let form = self
            .repo
            .create_form(NewForm {
                user_id: owner.id,
                title: fields.title.unwrap_or_default(),
                description: fields.description.unwrap_or_default(),
                elements: fields.elements.unwrap_or_default(),
                settings: fields.settings.unwrap_or_default(),
            })
            .await?;

        info!("Created form {} '{}' for {}", form.id, form.title, user.external_id);
        Ok(form)
    }

    async fn try_list_forms(&self, user: Option<&CurrentUser>) -> FormResult<Vec<StoredForm>> {
        let user = CurrentUser::require(user)?;
        match self.repo.find_user_by_external_id(&user.external_id).await? {
            Some(owner) => self.repo.list_forms(owner.id).await,
            None => Ok(Vec::new()),
        }
    }

    async fn try_update_form(
        &self,
        user: Option<&CurrentUser>,
        form_id: &str,
        body: &Value,
    ) -> FormResult<StoredForm> {
        let user = CurrentUser::require(user)?;
        let update = parse_form_body(body, BodyMode::Update)?;
        let form = self.owned_form(user, form_id).await?;

        let updated = self.repo.update_form(form.id, update).await?;
        info!("Updated form {}", updated.id);
        Ok(updated)
    }

    async fn try_delete_form(&self, user: Option<&CurrentUser>, form_id: &str) -> FormResult<Value> {
        let user = CurrentUser::require(user)?;
        let form = self.owned_form(user, form_id).await?;

        if !self.repo.delete_form(form.id).await? {
            return Err(FormError::FormNotFound(form_id.to_string()));
        }
        info!("Deleted form {}", form.id);
        Ok(json!({ "id": form.id, "deleted": true }))
    }

    /// The form with `form_id` if `user` owns it
    async fn owned_form(&self, user: &CurrentUser, form_id: &str) -> FormResult<StoredForm> {
        let not_found = || FormError::FormNotFound(form_id.to_string());
        let id = Uuid::parse_str(form_id).map_err(|_| not_found())?;
        let owner = self
            .repo
            .find_user_by_external_id(&user.external_id)
            .await?
            .ok_or_else(not_found)?;

        match self.repo.get_form(id).await? {
            Some(form) if form.user_id == owner.id => Ok(form),
            _ => Err(not_found()),
        }
    }
}

impl std::fmt::Debug for FormsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormsApi")
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Body parsing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyMode {
    /// `title` and `elements` are required
    Create,
    /// Every field is optional
    Update,
}

/// Check a form body, collecting every issue before failing
fn parse_form_body(body: &Value, mode: BodyMode) -> FormResult<FormUpdate> {
    let Some(object) = body.as_object() else {
        return Err(FormError::validation("Invalid form data: expected a JSON object"));
    };

    let mut issues = Vec::new();
    let mut update = FormUpdate::default();

    match object.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => update.title = Some(title.clone()),
        None if mode == BodyMode::Update => {}
        _ => issues.push("title: Title is required".to_string()),
    }

    match object.get("description") {
        None | Some(Value::Null) => {}
        Some(Value::String(description)) => update.description = Some(description.clone()),
        Some(_) => issues.push("description: expected a string".to_string()),
    }

    match object.get("elements") {
        None if mode == BodyMode::Update => {}
        None => issues.push("elements: missing".to_string()),
        Some(value) => match parse_elements(value, "elements", IdPolicy::Required) {
            Ok(elements) => {
                let duplicates = duplicate_id_issues(&elements, "elements");
                if duplicates.is_empty() {
                    update.elements = Some(elements);
                } else {
                    issues.extend(duplicates);
                }
            }
            Err(element_issues) => issues.extend(element_issues),
        },
    }

    update.settings = typed_field::<FormSettings>(object, "settings", &mut issues);

    if mode == BodyMode::Update {
        update.status = typed_field::<FormStatus>(object, "status", &mut issues);
        update.is_public = typed_field::<bool>(object, "isPublic", &mut issues);
    }

    if issues.is_empty() {
        Ok(update)
    } else {
        Err(FormError::validation(format!(
            "Invalid form data: {}",
            issues.join("; ")
        )))
    }
}

fn typed_field<T: serde::de::DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<String>,
) -> Option<T> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| issues.push(format!("{}: {}", key, e)))
            .ok(),
    }
}

// ============================================================================
// Tests
// ============================================================================
