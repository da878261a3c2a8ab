//! Authenticated identity and stored users

use chrono::{DateTime, Utc};
use formai_core::{FormError, FormResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity supplied by the external identity provider for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// Opaque id assigned by the identity provider
    pub external_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CurrentUser {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    /// Resolve an optional identity, rejecting absent or blank ones
    pub fn require(user: Option<&CurrentUser>) -> FormResult<&CurrentUser> {
        user.filter(|u| !u.external_id.trim().is_empty())
            .ok_or(FormError::Unauthorized)
    }
}

/// A user row in the forms store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// New user row for `user`
    pub fn from_identity(user: &CurrentUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            external_id: user.external_id.clone(),
            email: user.email.clone().unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            image_url: user.image_url.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}
