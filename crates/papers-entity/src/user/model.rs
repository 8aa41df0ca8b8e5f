//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use papers_core::traits::Document;
use papers_core::types::{FilterValue, UserId};

/// A registered account that owns nodes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Full display name.
    pub fullname: String,
    /// Login email, unique across users.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the user registered.
    pub date_created: DateTime<Utc>,
    /// When the user was last updated.
    pub date_modified: DateTime<Utc>,
}

impl User {
    /// Build a user ready for insertion. The email is stored lowercased.
    pub fn new(fullname: impl Into<String>, email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::nil(),
            fullname: fullname.into(),
            email: normalize_email(email),
            password_hash,
            date_created: now,
            date_modified: now,
        }
    }
}

/// Canonical form of an email used for lookups and uniqueness.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Partial user update.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub fullname: Option<String>,
    pub password_hash: Option<String>,
}

impl Document for User {
    type Patch = UserPatch;

    fn id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = UserId::from_uuid(id);
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        match name {
            "id" => Some(FilterValue::String(self.id.to_string())),
            "email" => Some(FilterValue::String(self.email.clone())),
            "fullname" => Some(FilterValue::String(self.fullname.clone())),
            _ => None,
        }
    }

    fn apply(&mut self, patch: &UserPatch) {
        if let Some(fullname) = &patch.fullname {
            self.fullname = fullname.clone();
        }
        if let Some(hash) = &patch.password_hash {
            self.password_hash = hash.clone();
        }
        self.date_modified = Utc::now();
    }
}
