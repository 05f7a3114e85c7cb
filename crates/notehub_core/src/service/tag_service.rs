//! Tag use-case service.
//!
//! # Responsibility
//! - Manage the global tag catalogue.
//! - Reconcile a page's tags against an editor selection.
//!
//! # Invariants
//! - Names are trimmed and compared ignoring case.
//! - Creating an existing name returns the stored tag.
//! - A page tag reconciliation writes in one transaction.

use crate::model::page::{Page, PageId};
use crate::model::tag::{normalize_tag_name, tag_names_equal, Tag, TagId};
use crate::model::ValidationError;
use crate::repo::tag_repo::{SqliteTagRepository, TagDiff, TagRecord, TagRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::SqliteTagService;
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from tag operations.
#[derive(Debug)]
pub enum TagServiceError {
    InvalidName(ValidationError),
    /// Another tag already uses this name (ignoring case).
    DuplicateName(String),
    TagNotFound(TagId),
    /// Target page is missing or hidden.
    PageNotFound(PageId),
    Repo(RepoError),
}

impl Display for TagServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "tag already exists: `{name}`"),
            Self::TagNotFound(id) => write!(f, "tag not found: {id}"),
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TagServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TagServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidName(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for TagServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidName(value)
    }
}

/// Tag service facade.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the tag named `name`, creating it when absent.
    pub fn create_tag(&self, name: &str) -> Result<Tag, TagServiceError> {
        let tag = self.repo.find_or_create_tag(name)?;
        info!("event=tag_create module=service status=ok tag_id={}", tag.id);
        Ok(tag)
    }

    pub fn get_tag(&self, id: TagId) -> RepoResult<Option<TagRecord>> {
        self.repo.get_tag(id)
    }

    /// Case-insensitive lookup after trimming.
    pub fn find_tag_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        self.repo.find_tag_by_name(name)
    }

    /// Lists every tag ordered by name with visible page counts.
    pub fn list_tags(&self) -> RepoResult<Vec<TagRecord>> {
        self.repo.list_tags()
    }

    /// Renames one tag. A case-only change of the same tag is allowed.
    pub fn rename_tag(&self, id: TagId, name: &str) -> Result<Tag, TagServiceError> {
        let name = normalize_tag_name(name)?;
        if let Some(existing) = self.repo.find_tag_by_name(&name)? {
            if existing.id != id {
                return Err(TagServiceError::DuplicateName(name));
            }
        }
        match self.repo.rename_tag(id, &name) {
            Ok(()) => Ok(Tag { id, name }),
            Err(RepoError::NotFound { .. }) => Err(TagServiceError::TagNotFound(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes one tag and removes it from every page.
    pub fn delete_tag(&self, id: TagId) -> RepoResult<bool> {
        let changed = self.repo.delete_tag(id)?;
        info!("event=tag_delete module=service status=ok tag_id={id} changed={changed}");
        Ok(changed)
    }

    pub fn tags_for_page(&self, page_id: PageId) -> RepoResult<Vec<Tag>> {
        self.repo.tags_for_page(page_id)
    }

    pub fn pages_for_tag(&self, id: TagId) -> RepoResult<Vec<Page>> {
        self.repo.pages_for_tag(id)
    }

    /// Makes the persisted tag set of `page_id` equal to `names`.
    ///
    /// Names are trimmed and deduplicated ignoring case (first spelling
    /// wins). Unknown names are created.
    pub fn reconcile_page_tags(
        &self,
        page_id: PageId,
        names: &[String],
    ) -> Result<TagDiff, TagServiceError> {
        let mut selection: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = normalize_tag_name(name)?;
            if !selection
                .iter()
                .any(|existing| tag_names_equal(existing, &name))
            {
                selection.push(name);
            }
        }

        let diff = match self.repo.reconcile_page_tags(page_id, &selection) {
            Ok(diff) => diff,
            Err(RepoError::NotFound { .. }) => return Err(TagServiceError::PageNotFound(page_id)),
            Err(err) => return Err(err.into()),
        };
        info!(
            "event=page_tags_reconcile module=service status=ok page_id={page_id} linked={} unlinked={}",
            diff.linked.len(),
            diff.unlinked.len()
        );
        Ok(diff)
    }
}

impl<'conn> SqliteTagService<'conn> {
    /// Builds the service over a migrated connection.
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(SqliteTagRepository::try_new(conn)?))
    }
}
