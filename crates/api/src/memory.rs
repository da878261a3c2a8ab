//! In-memory forms store

use crate::repository::{
    AiGenerationRecord, FormUpdate, FormsRepository, NewAiGeneration, NewForm, StoredForm,
};
use crate::user::{CurrentUser, UserRecord};
use async_trait::async_trait;
use formai_core::{FormError, FormResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    /// Form rows with a write sequence number, used to order ties in `updated_at`
    forms: HashMap<Uuid, (u64, StoredForm)>,
    generations: Vec<AiGenerationRecord>,
    sequence: u64,
}

impl Tables {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// [`FormsRepository`] kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryFormsRepository {
    tables: RwLock<Tables>,
}

impl InMemoryFormsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored forms across all users
    pub async fn form_count(&self) -> usize {
        self.tables.read().await.forms.len()
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl FormsRepository for InMemoryFormsRepository {
    async fn find_user_by_external_id(&self, external_id: &str) -> FormResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn create_user(&self, user: &CurrentUser) -> FormResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .users
            .values()
            .find(|u| u.external_id == user.external_id)
        {
            return Ok(existing.clone());
        }

        let record = UserRecord::from_identity(user);
        tables.users.insert(record.id, record.clone());
        debug!("Created user {} for '{}'", record.id, record.external_id);
        Ok(record)
    }

    async fn create_form(&self, form: NewForm) -> FormResult<StoredForm> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&form.user_id) {
            return Err(FormError::UserNotFound(form.user_id.to_string()));
        }

        let stored = form.into_stored();
        let sequence = tables.next_sequence();
        tables.forms.insert(stored.id, (sequence, stored.clone()));
        Ok(stored)
    }

    async fn list_forms(&self, user_id: Uuid) -> FormResult<Vec<StoredForm>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&(u64, StoredForm)> = tables
            .forms
            .values()
            .filter(|(_, form)| form.user_id == user_id)
            .collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            b.updated_at.cmp(&a.updated_at).then(seq_b.cmp(seq_a))
        });
        Ok(rows.into_iter().map(|(_, form)| form.clone()).collect())
    }

    async fn get_form(&self, id: Uuid) -> FormResult<Option<StoredForm>> {
        let tables = self.tables.read().await;
        Ok(tables.forms.get(&id).map(|(_, form)| form.clone()))
    }

    async fn update_form(&self, id: Uuid, update: FormUpdate) -> FormResult<StoredForm> {
        let mut tables = self.tables.write().await;
        let sequence = tables.next_sequence();
        let (row_sequence, form) = tables
            .forms
            .get_mut(&id)
            .ok_or_else(|| FormError::FormNotFound(id.to_string()))?;

        update.apply(form);
        *row_sequence = sequence;
        Ok(form.clone())
    }

    async fn delete_form(&self, id: Uuid) -> FormResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.forms.remove(&id).is_some())
    }

    async fn record_generation(&self, generation: NewAiGeneration) -> FormResult<AiGenerationRecord> {
        let mut tables = self.tables.write().await;
        let record = generation.into_record();
        tables.generations.push(record.clone());
        Ok(record)
    }

    async fn list_generations(&self, user_id: Uuid) -> FormResult<Vec<AiGenerationRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .generations
            .iter()
            .rev()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formai_model::FormSettings;
    use pretty_assertions::assert_eq;

    fn new_form(user_id: Uuid, title: &str) -> NewForm {
        NewForm {
            user_id,
            title: title.to_string(),
            description: String::new(),
            elements: Vec::new(),
            settings: FormSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_get_or_create_user_is_idempotent() {
        let repo = InMemoryFormsRepository::new();
        let identity = CurrentUser::new("user_1").with_email("a@b.c");

        let first = repo.get_or_create_user(&identity).await.unwrap();
        let second = repo.get_or_create_user(&identity).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_forms_listed_newest_first() {
        let repo = InMemoryFormsRepository::new();
        let user = repo.create_user(&CurrentUser::new("u")).await.unwrap();
        let other = repo.create_user(&CurrentUser::new("v")).await.unwrap();

        let a = repo.create_form(new_form(user.id, "A")).await.unwrap();
        let b = repo.create_form(new_form(user.id, "B")).await.unwrap();
        repo.create_form(new_form(other.id, "C")).await.unwrap();

        let titles = |forms: Vec<StoredForm>| forms.into_iter().map(|f| f.title).collect::<Vec<_>>();
        assert_eq!(titles(repo.list_forms(user.id).await.unwrap()), vec!["B", "A"]);

        repo.update_form(
            a.id,
            FormUpdate {
                title: Some("A2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(titles(repo.list_forms(user.id).await.unwrap()), vec!["A2", "B"]);

        assert!(repo.delete_form(b.id).await.unwrap());
        assert!(!repo.delete_form(b.id).await.unwrap());
        assert_eq!(repo.form_count().await, 2);
    }

    #[tokio::test]
    async fn test_form_requires_user() {
        let repo = InMemoryFormsRepository::new();
        let err = repo.create_form(new_form(Uuid::new_v4(), "X")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_missing_form() {
        let repo = InMemoryFormsRepository::new();
        let err = repo
            .update_form(Uuid::new_v4(), FormUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::FormNotFound(_)));
    }

    #[tokio::test]
    async fn test_generation_history() {
        let repo = InMemoryFormsRepository::new();
        let user = repo.create_user(&CurrentUser::new("u")).await.unwrap();
        for prompt in ["first prompt", "second prompt"] {
            repo.record_generation(NewAiGeneration {
                user_id: user.id,
                prompt: prompt.into(),
                elements: Vec::new(),
                model: "gemini-1.5-flash".into(),
                tokens_used: 12,
                generation_time_ms: 300,
            })
            .await
            .unwrap();
        }

        let history = repo.list_generations(user.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].prompt, "second prompt");
    }
}
