//! Forms store interface
//!
//! Handlers receive a [`FormsRepository`] explicitly; nothing in this crate
//! reaches for a global database handle. [`InMemoryFormsRepository`](crate::InMemoryFormsRepository)
//! is the bundled implementation.

use crate::user::{CurrentUser, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use formai_core::FormResult;
use formai_model::{FormElement, FormSettings};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Forms
// ============================================================================

/// Publication state of a stored form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// A form row in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredForm {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub elements: Vec<FormElement>,
    pub settings: FormSettings,
    pub status: FormStatus,
    pub response_count: u64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a form being created
#[derive(Debug, Clone, PartialEq)]
pub struct NewForm {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub elements: Vec<FormElement>,
    pub settings: FormSettings,
}

impl NewForm {
    /// Row for this form with store defaults (draft, private, no responses)
    pub fn into_stored(self) -> StoredForm {
        let now = Utc::now();
        StoredForm {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            elements: self.elements,
            settings: self.settings,
            status: FormStatus::Draft,
            response_count: 0,
            is_public: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a stored form; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub elements: Option<Vec<FormElement>>,
    pub settings: Option<FormSettings>,
    pub status: Option<FormStatus>,
    pub is_public: Option<bool>,
}

impl FormUpdate {
    /// Merge into `form`, bumping `updated_at`
    pub fn apply(self, form: &mut StoredForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(elements) = self.elements {
            form.elements = elements;
        }
        if let Some(settings) = self.settings {
            form.settings = settings;
        }
        if let Some(status) = self.status {
            form.status = status;
        }
        if let Some(is_public) = self.is_public {
            form.is_public = is_public;
        }
        form.updated_at = Utc::now().max(form.updated_at);
    }
}

// ============================================================================
// Generation history
// ============================================================================

/// Fields of a generation being recorded
#[derive(Debug, Clone, PartialEq)]
pub struct NewAiGeneration {
    pub user_id: Uuid,
    pub prompt: String,
    pub elements: Vec<FormElement>,
    pub model: String,
    pub tokens_used: u64,
    pub generation_time_ms: u64,
}

/// A recorded generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiGenerationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub generated_form: Vec<FormElement>,
    pub model: String,
    pub tokens_used: u64,
    pub generation_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl NewAiGeneration {
    pub fn into_record(self) -> AiGenerationRecord {
        AiGenerationRecord {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            prompt: self.prompt,
            generated_form: self.elements,
            model: self.model,
            tokens_used: self.tokens_used,
            generation_time_ms: self.generation_time_ms,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// FormsRepository
// ============================================================================

/// Persistence collaborator for users, forms and generation history
#[async_trait]
pub trait FormsRepository: Send + Sync {
    async fn find_user_by_external_id(&self, external_id: &str) -> FormResult<Option<UserRecord>>;

    async fn create_user(&self, user: &CurrentUser) -> FormResult<UserRecord>;

    async fn create_form(&self, form: NewForm) -> FormResult<StoredForm>;

    /// Forms owned by `user_id`, most recently updated first
    async fn list_forms(&self, user_id: Uuid) -> FormResult<Vec<StoredForm>>;

    async fn get_form(&self, id: Uuid) -> FormResult<Option<StoredForm>>;

    /// Apply `update` to the form; `FormNotFound` if it does not exist
    async fn update_form(&self, id: Uuid, update: FormUpdate) -> FormResult<StoredForm>;

    /// Returns false if the form did not exist
    async fn delete_form(&self, id: Uuid) -> FormResult<bool>;

    async fn record_generation(&self, generation: NewAiGeneration) -> FormResult<AiGenerationRecord>;

    /// Generation history of `user_id`, newest first
    async fn list_generations(&self, user_id: Uuid) -> FormResult<Vec<AiGenerationRecord>>;

    /// Look up the user for `identity`, creating it on first sight
    async fn get_or_create_user(&self, identity: &CurrentUser) -> FormResult<UserRecord> {
        match self.find_user_by_external_id(&identity.external_id).await? {
            Some(user) => Ok(user),
            None => self.create_user(identity).await,
        }
    }
}
