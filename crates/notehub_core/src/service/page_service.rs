//! Page use-case service.
//!
//! # Responsibility
//! - Create, edit, pin, list and search pages.
//! - Drive the page soft-delete lifecycle, gated by workspace state.
//! - Derive plain-text previews for list items.
//!
//! # Invariants
//! - Blank titles are replaced with [`DEFAULT_PAGE_TITLE`].
//! - A page cannot be restored while its workspace is soft-deleted.
//! - Soft delete, restore and hard delete of a missing row return `false`.

use crate::model::page::{Page, PageId, DEFAULT_PAGE_TITLE};
use crate::model::user::UserId;
use crate::model::workspace::WorkspaceId;
use crate::model::ValidationError;
use crate::repo::page_repo::{
    DeletedPageRecord, PageRecord, PageRepository, SqlitePageRepository,
};
use crate::repo::{RepoError, RepoResult};
use crate::service::SqlitePageService;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PREVIEW_MAX_CHARS: usize = 100;

static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").expect("valid list marker regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Errors from page operations.
#[derive(Debug)]
pub enum PageServiceError {
    InvalidTitle(ValidationError),
    /// Target page is missing or hidden.
    PageNotFound(PageId),
    /// Target workspace is missing or soft-deleted.
    WorkspaceNotFound(WorkspaceId),
    /// Restore rejected because the owning workspace is soft-deleted.
    WorkspaceDeleted {
        page_id: PageId,
        workspace_name: String,
    },
    Repo(RepoError),
    /// Write succeeded but read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for PageServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle(err) => write!(f, "{err}"),
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::WorkspaceNotFound(id) => write!(f, "workspace not found: {id}"),
            Self::WorkspaceDeleted {
                page_id,
                workspace_name,
            } => write!(
                f,
                "page {page_id} cannot be restored while workspace `{workspace_name}` is deleted"
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent page state: {details}"),
        }
    }
}

impl Error for PageServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTitle(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PageServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidTitle(err),
            other => Self::Repo(other),
        }
    }
}

/// Page service facade.
pub struct PageService<R: PageRepository> {
    repo: R,
}

impl<R: PageRepository> PageService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one page inside an active workspace.
    pub fn create_page(
        &self,
        workspace_uuid: WorkspaceId,
        title: &str,
        content: &str,
    ) -> Result<PageRecord, PageServiceError> {
        let page = Page::new(workspace_uuid, title.trim(), content);
        let id = match self.repo.create_page(&page) {
            Ok(id) => id,
            Err(RepoError::NotFound { .. }) => {
                return Err(PageServiceError::WorkspaceNotFound(workspace_uuid))
            }
            Err(err) => return Err(err.into()),
        };
        info!("event=page_create module=service status=ok page_id={id} workspace_id={workspace_uuid}");
        self.read_back(id, "created page not found in read-back")
    }

    /// Loads one visible page with tags.
    pub fn get_page(&self, id: PageId) -> RepoResult<Option<PageRecord>> {
        self.repo.get_page(id)
    }

    /// Lists visible pages of one workspace, pinned first then most recent.
    pub fn list_pages(&self, workspace_uuid: WorkspaceId) -> RepoResult<Vec<PageRecord>> {
        self.repo.list_pages(workspace_uuid)
    }

    /// Replaces title and content; bumps the update timestamp.
    pub fn update_page(
        &self,
        id: PageId,
        title: &str,
        content: &str,
    ) -> Result<PageRecord, PageServiceError> {
        let title = effective_title(title);
        self.map_missing(id, self.repo.update_page(id, title, content))?;
        self.read_back(id, "updated page not found in read-back")
    }

    /// Replaces only the title (inline rename).
    pub fn rename_page(&self, id: PageId, title: &str) -> Result<PageRecord, PageServiceError> {
        let title = effective_title(title);
        self.map_missing(id, self.repo.rename_page(id, title))?;
        self.read_back(id, "renamed page not found in read-back")
    }

    /// Flips the pin flag and returns the updated page.
    pub fn toggle_pin(&self, id: PageId) -> Result<PageRecord, PageServiceError> {
        let current = self
            .repo
            .get_page(id)?
            .ok_or(PageServiceError::PageNotFound(id))?;
        self.set_pinned(id, !current.page.is_pinned)
    }

    pub fn set_pinned(&self, id: PageId, is_pinned: bool) -> Result<PageRecord, PageServiceError> {
        self.map_missing(id, self.repo.set_page_pinned(id, is_pinned))?;
        self.read_back(id, "pinned page not found in read-back")
    }

    /// Marks the page deleted.
    pub fn soft_delete_page(&self, id: PageId) -> RepoResult<bool> {
        let changed = self.repo.set_page_active(id, false)?;
        info!("event=page_soft_delete module=service status=ok page_id={id} changed={changed}");
        Ok(changed)
    }

    /// Restores one soft-deleted page.
    ///
    /// # Errors
    /// - `WorkspaceDeleted` when the owning workspace is soft-deleted.
    pub fn restore_page(&self, id: PageId) -> Result<bool, PageServiceError> {
        let Some(record) = self.repo.find_page_any_state(id)? else {
            return Ok(false);
        };
        if record.page.is_active {
            return Ok(false);
        }
        if !record.workspace_is_active {
            return Err(PageServiceError::WorkspaceDeleted {
                page_id: id,
                workspace_name: record.workspace_name,
            });
        }
        let changed = self.repo.set_page_active(id, true)?;
        info!("event=page_restore module=service status=ok page_id={id} changed={changed}");
        Ok(changed)
    }

    /// Permanently removes the page and its tag links.
    pub fn hard_delete_page(&self, id: PageId) -> RepoResult<bool> {
        let changed = self.repo.hard_delete_page(id)?;
        info!("event=page_hard_delete module=service status=ok page_id={id} changed={changed}");
        Ok(changed)
    }

    /// Lists soft-deleted pages of every workspace owned by `user_uuid`.
    pub fn list_deleted_pages(&self, user_uuid: UserId) -> RepoResult<Vec<DeletedPageRecord>> {
        self.repo.list_deleted_pages(user_uuid)
    }

    /// Case-insensitive search over title and content. Blank queries return
    /// nothing.
    pub fn search_pages(&self, user_uuid: UserId, query: &str) -> RepoResult<Vec<PageRecord>> {
        self.repo.search_pages(user_uuid, query)
    }

    fn read_back(
        &self,
        id: PageId,
        details: &'static str,
    ) -> Result<PageRecord, PageServiceError> {
        self.repo
            .get_page(id)?
            .ok_or(PageServiceError::InconsistentState(details))
    }

    fn map_missing(&self, id: PageId, result: RepoResult<()>) -> Result<(), PageServiceError> {
        match result {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound { .. }) => Err(PageServiceError::PageNotFound(id)),
            Err(err) => Err(err.into()),
        }
    }
}

impl<'conn> SqlitePageService<'conn> {
    /// Builds the service over a migrated connection.
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(SqlitePageRepository::try_new(conn)?))
    }
}

fn effective_title(title: &str) -> &str {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_PAGE_TITLE
    } else {
        trimmed
    }
}

/// Derives a single-line plain-text preview from page content.
///
/// Link syntax keeps its label, list markers are dropped, whitespace is
/// collapsed and the first 100 chars are kept. Blank content yields `None`.
pub fn derive_preview_text(content: &str) -> Option<String> {
    let without_links = MARKDOWN_LINK_RE.replace_all(content, "$1");
    let without_markers = LIST_MARKER_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_markers, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::{derive_preview_text, effective_title};
    use crate::model::page::DEFAULT_PAGE_TITLE;

    #[test]
    fn preview_flattens_lists_and_links() {
        let preview = derive_preview_text("Things to do:\n- Buy [milk](shop://x)\n- Call mom")
            .expect("preview should exist");
        assert_eq!(preview, "Things to do: Buy milk Call mom");
    }

    #[test]
    fn preview_is_none_for_blank_content_and_capped() {
        assert_eq!(derive_preview_text(" \n\t "), None);
        let long = "word ".repeat(60);
        let preview = derive_preview_text(&long).expect("preview should exist");
        assert_eq!(preview.chars().count(), 100);
    }

    #[test]
    fn blank_title_uses_default() {
        assert_eq!(effective_title("   "), DEFAULT_PAGE_TITLE);
        assert_eq!(effective_title(" Plan "), "Plan");
    }
}
