//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate repository failures into per-use-case error enums.
//! - Keep view-models decoupled from storage details.

pub mod auth_service;
pub mod page_service;
pub mod tag_service;
pub mod trash_service;
pub mod workspace_service;

use crate::repo::page_repo::SqlitePageRepository;
use crate::repo::tag_repo::SqliteTagRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::repo::workspace_repo::SqliteWorkspaceRepository;

pub type SqliteAuthService<'conn> = auth_service::AuthService<SqliteUserRepository<'conn>>;
pub type SqliteWorkspaceService<'conn> =
    workspace_service::WorkspaceService<SqliteWorkspaceRepository<'conn>>;
pub type SqlitePageService<'conn> = page_service::PageService<SqlitePageRepository<'conn>>;
pub type SqliteTagService<'conn> = tag_service::TagService<SqliteTagRepository<'conn>>;
pub type SqliteTrashService<'conn> =
    trash_service::TrashService<SqliteWorkspaceRepository<'conn>, SqlitePageRepository<'conn>>;
