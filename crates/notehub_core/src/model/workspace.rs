//! Workspace model.
//!
//! # Invariants
//! - A workspace always belongs to one existing user.
//! - `is_active == false` hides the workspace and every page inside it.

use crate::model::user::UserId;
use crate::model::{now_epoch_ms, require_text, ValidationError, WORKSPACE_NAME_MAX_CHARS};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type WorkspaceId = Uuid;

/// Default name for workspaces created from the list view.
pub const DEFAULT_WORKSPACE_NAME: &str = "New Workspace";

/// Named container of pages owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub uuid: WorkspaceId,
    pub user_uuid: UserId,
    pub name: String,
    pub is_active: bool,
    pub created_at: i64,
    /// Set on rename, soft delete and restore.
    pub updated_at: Option<i64>,
}

impl Workspace {
    /// Creates an active workspace with a generated id.
    pub fn new(user_uuid: UserId, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            user_uuid,
            name: name.into(),
            is_active: true,
            created_at: now_epoch_ms(),
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("workspace name", &self.name, WORKSPACE_NAME_MAX_CHARS)
    }

    /// Marks this workspace as softly deleted.
    pub fn soft_delete(&mut self) {
        self.is_active = false;
        self.updated_at = Some(now_epoch_ms());
    }

    /// Clears the soft-delete marker.
    pub fn restore(&mut self) {
        self.is_active = true;
        self.updated_at = Some(now_epoch_ms());
    }

    /// Last modification time; used as deletion time for trashed workspaces.
    pub fn last_modified_at(&self) -> i64 {
        self.updated_at.unwrap_or(self.created_at)
    }
}
