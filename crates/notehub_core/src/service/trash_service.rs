//! Trash use-case service.
//!
//! # Responsibility
//! - Merge soft-deleted workspaces and pages of one user into one list.
//! - Route restore and hard delete to the owning service.
//!
//! # Invariants
//! - Items are sorted by deletion time descending (update timestamp,
//!   falling back to creation timestamp).
//! - A page whose workspace is also deleted is listed with restore disabled.

use crate::model::page::PageId;
use crate::model::user::UserId;
use crate::model::workspace::WorkspaceId;
use crate::repo::page_repo::{PageRepository, SqlitePageRepository};
use crate::repo::workspace_repo::{SqliteWorkspaceRepository, WorkspaceRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::page_service::{PageService, PageServiceError};
use crate::service::workspace_service::WorkspaceService;
use crate::service::SqliteTrashService;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What a trash entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrashTarget {
    Workspace(WorkspaceId),
    Page(PageId),
}

/// One row of the trash view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashItem {
    pub target: TrashTarget,
    /// Workspace name or page title.
    pub name: String,
    /// Epoch ms of the soft delete.
    pub deleted_at: i64,
    /// Workspace the item lives in (the workspace itself for workspaces).
    pub workspace_uuid: WorkspaceId,
    /// `true` for pages whose workspace is also deleted.
    pub restore_disabled: bool,
    /// Name of the deleted workspace blocking restore.
    pub workspace_name: Option<String>,
}

/// Result of a successful restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoredItem {
    pub target: TrashTarget,
    pub workspace_uuid: WorkspaceId,
}

/// Errors from trash operations.
#[derive(Debug)]
pub enum TrashServiceError {
    /// Page restore rejected while its workspace is deleted.
    RestoreBlocked {
        page_id: PageId,
        workspace_name: String,
    },
    Repo(RepoError),
}

impl Display for TrashServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RestoreBlocked {
                page_id,
                workspace_name,
            } => write!(
                f,
                "restore workspace `{workspace_name}` before restoring page {page_id}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrashServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::RestoreBlocked { .. } => None,
        }
    }
}

impl From<RepoError> for TrashServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<PageServiceError> for TrashServiceError {
    fn from(value: PageServiceError) -> Self {
        match value {
            PageServiceError::WorkspaceDeleted {
                page_id,
                workspace_name,
            } => Self::RestoreBlocked {
                page_id,
                workspace_name,
            },
            PageServiceError::Repo(err) => Self::Repo(err),
            PageServiceError::InvalidTitle(err) => Self::Repo(RepoError::Validation(err)),
            PageServiceError::PageNotFound(id) => Self::Repo(RepoError::not_found("page", id)),
            PageServiceError::WorkspaceNotFound(id) => {
                Self::Repo(RepoError::not_found("workspace", id))
            }
            PageServiceError::InconsistentState(details) => {
                Self::Repo(RepoError::InvalidData(details.to_string()))
            }
        }
    }
}

/// Trash facade composing the workspace and page services.
pub struct TrashService<W: WorkspaceRepository, P: PageRepository> {
    workspaces: WorkspaceService<W>,
    pages: PageService<P>,
}

impl<W: WorkspaceRepository, P: PageRepository> TrashService<W, P> {
    pub fn new(workspaces: WorkspaceService<W>, pages: PageService<P>) -> Self {
        Self { workspaces, pages }
    }

    /// Lists every soft-deleted workspace and page of `user_uuid`, newest
    /// deletion first.
    pub fn list_trash(&self, user_uuid: UserId) -> RepoResult<Vec<TrashItem>> {
        let mut items = Vec::new();
        for record in self.workspaces.list_deleted_workspaces(user_uuid)? {
            let workspace = record.workspace;
            items.push(TrashItem {
                target: TrashTarget::Workspace(workspace.uuid),
                deleted_at: workspace.last_modified_at(),
                workspace_uuid: workspace.uuid,
                name: workspace.name,
                restore_disabled: false,
                workspace_name: None,
            });
        }
        for record in self.pages.list_deleted_pages(user_uuid)? {
            let page = record.page;
            let restore_disabled = !record.workspace_is_active;
            items.push(TrashItem {
                target: TrashTarget::Page(page.uuid),
                deleted_at: page.last_modified_at(),
                workspace_uuid: page.workspace_uuid,
                name: page.title,
                restore_disabled,
                workspace_name: restore_disabled.then_some(record.workspace_name),
            });
        }
        items.sort_by(|left, right| right.deleted_at.cmp(&left.deleted_at));
        Ok(items)
    }

    /// Restores one trash entry.
    ///
    /// Returns `Ok(None)` when the row no longer exists.
    ///
    /// # Errors
    /// - `RestoreBlocked` for a page whose workspace is deleted.
    pub fn restore(&self, target: TrashTarget) -> Result<Option<RestoredItem>, TrashServiceError> {
        match target {
            TrashTarget::Workspace(id) => {
                let restored = self.workspaces.restore_workspace(id)?;
                Ok(restored.then_some(RestoredItem {
                    target,
                    workspace_uuid: id,
                }))
            }
            TrashTarget::Page(id) => {
                if !self.pages.restore_page(id)? {
                    return Ok(None);
                }
                let workspace_uuid = self
                    .pages
                    .get_page(id)?
                    .map(|record| record.page.workspace_uuid)
                    .ok_or_else(|| {
                        TrashServiceError::Repo(RepoError::InvalidData(format!(
                            "restored page {id} not visible in read-back"
                        )))
                    })?;
                Ok(Some(RestoredItem {
                    target,
                    workspace_uuid,
                }))
            }
        }
    }

    /// Permanently removes one trash entry. Returns `false` when absent.
    pub fn hard_delete(&self, target: TrashTarget) -> RepoResult<bool> {
        match target {
            TrashTarget::Workspace(id) => self.workspaces.hard_delete_workspace(id),
            TrashTarget::Page(id) => self.pages.hard_delete_page(id),
        }
    }
}

impl<'conn> SqliteTrashService<'conn> {
    /// Builds the service over a migrated connection.
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            WorkspaceService::new(SqliteWorkspaceRepository::try_new(conn)?),
            PageService::new(SqlitePageRepository::try_new(conn)?),
        ))
    }
}
