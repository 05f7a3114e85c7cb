//! User account model.

use crate::model::{now_epoch_ms, require_text, ValidationError, USERNAME_MAX_CHARS};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Local account owning workspaces.
///
/// The password is stored and compared as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    /// Unique, compared by exact match.
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub is_active: bool,
    pub created_at: i64,
}

impl User {
    /// Creates an active user with a generated id.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            username: username.into(),
            password: password.into(),
            is_active: true,
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("username", &self.username, USERNAME_MAX_CHARS)?;
        if self.password.trim().is_empty() {
            return Err(ValidationError::BlankField("password"));
        }
        Ok(())
    }
}
