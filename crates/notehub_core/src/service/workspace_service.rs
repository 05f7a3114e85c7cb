//! Workspace use-case service.
//!
//! # Responsibility
//! - Create, rename, list and search workspaces of one user.
//! - Drive the workspace soft-delete lifecycle.
//!
//! # Invariants
//! - Names are trimmed before persistence.
//! - Soft delete, restore and hard delete of a missing row are no-ops that
//!   return `false`.

use crate::model::user::UserId;
use crate::model::workspace::{Workspace, WorkspaceId};
use crate::model::ValidationError;
use crate::repo::workspace_repo::{
    SqliteWorkspaceRepository, WorkspaceRecord, WorkspaceRepository,
};
use crate::repo::{RepoError, RepoResult};
use crate::service::SqliteWorkspaceService;
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from workspace operations.
#[derive(Debug)]
pub enum WorkspaceServiceError {
    InvalidName(ValidationError),
    /// Target workspace is missing or soft-deleted.
    WorkspaceNotFound(WorkspaceId),
    /// Owning user does not exist.
    UserNotFound(UserId),
    Repo(RepoError),
    /// Write succeeded but read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for WorkspaceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::WorkspaceNotFound(id) => write!(f, "workspace not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent workspace state: {details}")
            }
        }
    }
}

impl Error for WorkspaceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkspaceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidName(err),
            other => Self::Repo(other),
        }
    }
}

/// Workspace service facade.
pub struct WorkspaceService<R: WorkspaceRepository> {
    repo: R,
}

impl<R: WorkspaceRepository> WorkspaceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one active workspace for `user_uuid`.
    pub fn create_workspace(
        &self,
        user_uuid: UserId,
        name: &str,
    ) -> Result<WorkspaceRecord, WorkspaceServiceError> {
        let workspace = Workspace::new(user_uuid, name.trim());
        let id = match self.repo.create_workspace(&workspace) {
            Ok(id) => id,
            Err(RepoError::NotFound { entity: "user", .. }) => {
                return Err(WorkspaceServiceError::UserNotFound(user_uuid))
            }
            Err(err) => return Err(err.into()),
        };
        info!("event=workspace_create module=service status=ok workspace_id={id}");
        self.repo
            .get_workspace(id)?
            .ok_or(WorkspaceServiceError::InconsistentState(
                "created workspace not found in read-back",
            ))
    }

    /// Loads one active workspace.
    pub fn get_workspace(&self, id: WorkspaceId) -> RepoResult<Option<WorkspaceRecord>> {
        Ok(self
            .repo
            .get_workspace(id)?
            .filter(|record| record.workspace.is_active))
    }

    /// Loads one workspace regardless of its active flag.
    pub fn find_workspace_any_state(
        &self,
        id: WorkspaceId,
    ) -> RepoResult<Option<WorkspaceRecord>> {
        self.repo.get_workspace(id)
    }

    /// Lists active workspaces, newest first, with active page counts.
    pub fn list_workspaces(&self, user_uuid: UserId) -> RepoResult<Vec<WorkspaceRecord>> {
        self.repo.list_workspaces(user_uuid)
    }

    pub fn list_deleted_workspaces(&self, user_uuid: UserId) -> RepoResult<Vec<WorkspaceRecord>> {
        self.repo.list_deleted_workspaces(user_uuid)
    }

    /// Renames one active workspace and returns the updated row.
    pub fn rename_workspace(
        &self,
        id: WorkspaceId,
        name: &str,
    ) -> Result<WorkspaceRecord, WorkspaceServiceError> {
        match self.repo.rename_workspace(id, name.trim()) {
            Ok(()) => {}
            Err(RepoError::NotFound { .. }) => {
                return Err(WorkspaceServiceError::WorkspaceNotFound(id))
            }
            Err(err) => return Err(err.into()),
        }
        self.get_workspace(id)?
            .ok_or(WorkspaceServiceError::InconsistentState(
                "renamed workspace not found in read-back",
            ))
    }

    /// Marks the workspace deleted. Its pages become hidden.
    pub fn soft_delete_workspace(&self, id: WorkspaceId) -> RepoResult<bool> {
        let changed = self.repo.set_workspace_active(id, false)?;
        info!(
            "event=workspace_soft_delete module=service status=ok workspace_id={id} changed={changed}"
        );
        Ok(changed)
    }

    pub fn restore_workspace(&self, id: WorkspaceId) -> RepoResult<bool> {
        let changed = self.repo.set_workspace_active(id, true)?;
        info!(
            "event=workspace_restore module=service status=ok workspace_id={id} changed={changed}"
        );
        Ok(changed)
    }

    /// Permanently removes the workspace, its pages and their tag links.
    pub fn hard_delete_workspace(&self, id: WorkspaceId) -> RepoResult<bool> {
        let changed = self.repo.hard_delete_workspace(id)?;
        info!(
            "event=workspace_hard_delete module=service status=ok workspace_id={id} changed={changed}"
        );
        Ok(changed)
    }

    /// Case-insensitive name search. Blank queries return nothing.
    pub fn search_workspaces(
        &self,
        user_uuid: UserId,
        query: &str,
    ) -> RepoResult<Vec<WorkspaceRecord>> {
        self.repo.search_workspaces(user_uuid, query)
    }
}

impl<'conn> SqliteWorkspaceService<'conn> {
    /// Builds the service over a migrated connection.
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(SqliteWorkspaceRepository::try_new(conn)?))
    }
}
