//! Page (note) model.
//!
//! # Invariants
//! - A page always belongs to one existing workspace.
//! - A soft-deleted page cannot be restored while its workspace is
//!   soft-deleted.

use crate::model::workspace::WorkspaceId;
use crate::model::{now_epoch_ms, require_text, ValidationError, PAGE_TITLE_MAX_CHARS};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

pub type PageId = Uuid;

/// Title used when a page is saved without one.
pub const DEFAULT_PAGE_TITLE: &str = "Untitled Page";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub uuid: PageId,
    pub workspace_uuid: WorkspaceId,
    pub title: String,
    /// Plain-text body.
    pub content: String,
    pub is_pinned: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

impl Page {
    /// Creates an active, unpinned page with a generated id.
    ///
    /// A blank title falls back to [`DEFAULT_PAGE_TITLE`].
    pub fn new(
        workspace_uuid: WorkspaceId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = now_epoch_ms();
        let title = title.into();
        let title = if title.trim().is_empty() {
            DEFAULT_PAGE_TITLE.to_string()
        } else {
            title
        };
        Self {
            uuid: Uuid::new_v4(),
            workspace_uuid,
            title,
            content: content.into(),
            is_pinned: false,
            is_active: true,
            created_at: now,
            updated_at: Some(now),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("page title", &self.title, PAGE_TITLE_MAX_CHARS)
    }

    /// Bumps the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Some(now_epoch_ms());
    }

    /// Update timestamp, falling back to creation timestamp.
    pub fn last_modified_at(&self) -> i64 {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// Page list ordering: pinned first, then most recently modified.
pub fn compare_for_listing(left: &Page, right: &Page) -> Ordering {
    right
        .is_pinned
        .cmp(&left.is_pinned)
        .then_with(|| right.last_modified_at().cmp(&left.last_modified_at()))
}

#[cfg(test)]
mod tests {
    use super::{compare_for_listing, Page, DEFAULT_PAGE_TITLE};
    use uuid::Uuid;

    #[test]
    fn blank_title_falls_back_to_default() {
        let page = Page::new(Uuid::new_v4(), "  ", "body");
        assert_eq!(page.title, DEFAULT_PAGE_TITLE);
    }

    #[test]
    fn listing_order_puts_pinned_before_recent() {
        let workspace = Uuid::new_v4();
        let mut old_pinned = Page::new(workspace, "old", "");
        old_pinned.is_pinned = true;
        old_pinned.updated_at = Some(10);
        let mut fresh = Page::new(workspace, "fresh", "");
        fresh.updated_at = Some(20);
        let mut stale = Page::new(workspace, "stale", "");
        stale.updated_at = None;
        stale.created_at = 5;

        let mut pages = vec![stale.clone(), fresh.clone(), old_pinned.clone()];
        pages.sort_by(compare_for_listing);
        let titles: Vec<_> = pages.iter().map(|page| page.title.as_str()).collect();
        assert_eq!(titles, vec!["old", "fresh", "stale"]);
    }
}
