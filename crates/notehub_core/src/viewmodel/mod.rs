//! Headless view-models for the desktop shell.
//!
//! # Responsibility
//! - Hold per-screen state as observable properties.
//! - Expose guarded commands that call into services.
//! - Compose under [`coordinator::MainViewModel`], which routes selection and
//!   command events between children.
//!
//! # Invariants
//! - Validation failures become inline messages, not `Err`.
//! - Persistence failures propagate as [`ViewModelError`].
//! - Child view-models never reach into each other; they return event
//!   values that the coordinator routes.

use crate::repo::RepoError;
use crate::service::auth_service::AuthServiceError;
use crate::service::page_service::PageServiceError;
use crate::service::tag_service::TagServiceError;
use crate::service::trash_service::TrashServiceError;
use crate::service::workspace_service::WorkspaceServiceError;
use crate::settings::SettingsError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod command;
pub mod coordinator;
pub mod editor;
pub mod login;
pub mod observable;
pub mod page_list;
pub mod settings;
pub mod sidebar;
pub mod tag_management;
pub mod trash;
pub mod user_profile;
pub mod workspace_list;

/// Unexpected failure surfaced to the shell (shown as a blocking dialog).
#[derive(Debug)]
pub enum ViewModelError {
    Repo(RepoError),
    Auth(AuthServiceError),
    Workspace(WorkspaceServiceError),
    Page(PageServiceError),
    Tag(TagServiceError),
    Trash(TrashServiceError),
    Settings(SettingsError),
}

impl Display for ViewModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Auth(err) => write!(f, "{err}"),
            Self::Workspace(err) => write!(f, "{err}"),
            Self::Page(err) => write!(f, "{err}"),
            Self::Tag(err) => write!(f, "{err}"),
            Self::Trash(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ViewModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Auth(err) => Some(err),
            Self::Workspace(err) => Some(err),
            Self::Page(err) => Some(err),
            Self::Tag(err) => Some(err),
            Self::Trash(err) => Some(err),
            Self::Settings(err) => Some(err),
        }
    }
}

impl From<RepoError> for ViewModelError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AuthServiceError> for ViewModelError {
    fn from(value: AuthServiceError) -> Self {
        Self::Auth(value)
    }
}

impl From<WorkspaceServiceError> for ViewModelError {
    fn from(value: WorkspaceServiceError) -> Self {
        Self::Workspace(value)
    }
}

impl From<PageServiceError> for ViewModelError {
    fn from(value: PageServiceError) -> Self {
        Self::Page(value)
    }
}

impl From<TagServiceError> for ViewModelError {
    fn from(value: TagServiceError) -> Self {
        Self::Tag(value)
    }
}

impl From<TrashServiceError> for ViewModelError {
    fn from(value: TrashServiceError) -> Self {
        Self::Trash(value)
    }
}

impl From<SettingsError> for ViewModelError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

pub type ViewModelResult<T> = Result<T, ViewModelError>;
