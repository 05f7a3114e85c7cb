//! Page repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist pages, their pin flag and soft-delete lifecycle.
//! - Return pages together with their tags.
//!
//! # Invariants
//! - A page is visible only when both the page and its workspace are active.
//! - Page lists are ordered pinned first, then by
//!   `COALESCE(updated_at, created_at) DESC` (insertion order breaks ties).
//! - Content edits, pin toggles, soft delete and restore bump `updated_at`.

use crate::model::page::{Page, PageId};
use crate::model::tag::Tag;
use crate::model::user::UserId;
use crate::model::workspace::WorkspaceId;
use crate::model::{now_epoch_ms, require_text, PAGE_TITLE_MAX_CHARS};
use crate::repo::tag_repo::load_page_tags;
use crate::repo::{
    bool_to_int, ensure_connection_ready, like_pattern, parse_flag, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row, ToSql};

const PAGE_SELECT_SQL: &str = "SELECT
    p.page_uuid,
    p.workspace_uuid,
    p.title,
    p.content,
    p.is_pinned,
    p.is_active,
    p.created_at,
    p.updated_at,
    w.name AS workspace_name,
    w.is_active AS workspace_is_active
FROM pages p
JOIN workspaces w ON w.workspace_uuid = p.workspace_uuid";

const VISIBLE_PAGE_FILTER: &str = "p.is_active = 1 AND w.is_active = 1";

const PAGE_LIST_ORDER: &str = "ORDER BY p.is_pinned DESC,
         COALESCE(p.updated_at, p.created_at) DESC,
         p.rowid DESC";

/// Page row plus its tag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub page: Page,
    /// Linked tags sorted by name.
    pub tags: Vec<Tag>,
}

/// Soft-deleted page plus the state of its workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedPageRecord {
    pub page: Page,
    pub workspace_name: String,
    pub workspace_is_active: bool,
}

/// Repository interface for pages.
pub trait PageRepository {
    /// Inserts one page. The owning workspace must exist and be active.
    fn create_page(&self, page: &Page) -> RepoResult<PageId>;
    /// Loads one visible page with tags.
    fn get_page(&self, id: PageId) -> RepoResult<Option<PageRecord>>;
    /// Loads one page regardless of page or workspace state.
    fn find_page_any_state(&self, id: PageId) -> RepoResult<Option<DeletedPageRecord>>;
    /// Lists visible pages of one workspace in listing order.
    fn list_pages(&self, workspace_uuid: WorkspaceId) -> RepoResult<Vec<PageRecord>>;
    /// Lists soft-deleted pages across all workspaces of one user.
    fn list_deleted_pages(&self, user_uuid: UserId) -> RepoResult<Vec<DeletedPageRecord>>;
    /// Replaces title and content of one visible page.
    fn update_page(&self, id: PageId, title: &str, content: &str) -> RepoResult<()>;
    /// Replaces only the title of one visible page.
    fn rename_page(&self, id: PageId, title: &str) -> RepoResult<()>;
    /// Sets the pin flag of one visible page.
    fn set_page_pinned(&self, id: PageId, is_pinned: bool) -> RepoResult<()>;
    /// Flips the active flag. Returns `false` when the row is missing or
    /// already in that state; timestamps are then left alone.
    fn set_page_active(&self, id: PageId, is_active: bool) -> RepoResult<bool>;
    /// Removes the row and its tag links. Returns `false` when absent.
    fn hard_delete_page(&self, id: PageId) -> RepoResult<bool>;
    /// Case-insensitive substring search over title and content of visible
    /// pages owned by one user.
    fn search_pages(&self, user_uuid: UserId, query: &str) -> RepoResult<Vec<PageRecord>>;
}

/// SQLite-backed page repository.
pub struct SqlitePageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePageRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "pages",
            &[
                "page_uuid",
                "workspace_uuid",
                "title",
                "content",
                "is_pinned",
                "is_active",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl PageRepository for SqlitePageRepository<'_> {
    fn create_page(&self, page: &Page) -> RepoResult<PageId> {
        page.validate()?;
        let inserted = self.conn.execute(
            "INSERT INTO pages (
                page_uuid,
                workspace_uuid,
                title,
                content,
                is_pinned,
                is_active,
                created_at,
                updated_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8
            WHERE EXISTS (
                SELECT 1
                FROM workspaces
                WHERE workspace_uuid = ?2
                  AND is_active = 1
            );",
            params![
                page.uuid.to_string(),
                page.workspace_uuid.to_string(),
                page.title.as_str(),
                page.content.as_str(),
                bool_to_int(page.is_pinned),
                bool_to_int(page.is_active),
                page.created_at,
                page.updated_at,
            ],
        )?;
        if inserted == 0 {
            return Err(RepoError::not_found("workspace", page.workspace_uuid));
        }
        Ok(page.uuid)
    }

    fn get_page(&self, id: PageId) -> RepoResult<Option<PageRecord>> {
        let mut records = self.query_records(
            &format!("{PAGE_SELECT_SQL} WHERE p.page_uuid = ?1 AND {VISIBLE_PAGE_FILTER};"),
            &[&id.to_string()],
        )?;
        Ok(records.pop())
    }

    fn find_page_any_state(&self, id: PageId) -> RepoResult<Option<DeletedPageRecord>> {
        let mut records = self.query_with_workspace(
            &format!("{PAGE_SELECT_SQL} WHERE p.page_uuid = ?1;"),
            &[&id.to_string()],
        )?;
        Ok(records.pop())
    }

    fn list_pages(&self, workspace_uuid: WorkspaceId) -> RepoResult<Vec<PageRecord>> {
        self.query_records(
            &format!(
                "{PAGE_SELECT_SQL}
                 WHERE p.workspace_uuid = ?1
                   AND {VISIBLE_PAGE_FILTER}
                 {PAGE_LIST_ORDER};"
            ),
            &[&workspace_uuid.to_string()],
        )
    }

    fn list_deleted_pages(&self, user_uuid: UserId) -> RepoResult<Vec<DeletedPageRecord>> {
        self.query_with_workspace(
            &format!(
                "{PAGE_SELECT_SQL}
                 WHERE w.user_uuid = ?1
                   AND p.is_active = 0
                 ORDER BY COALESCE(p.updated_at, p.created_at) DESC, p.rowid DESC;"
            ),
            &[&user_uuid.to_string()],
        )
    }

    fn update_page(&self, id: PageId, title: &str, content: &str) -> RepoResult<()> {
        require_text("page title", title, PAGE_TITLE_MAX_CHARS)?;
        self.update_visible(
            id,
            "UPDATE pages
             SET title = ?2,
                 content = ?3,
                 updated_at = ?4
             WHERE page_uuid = ?1",
            &[&id.to_string(), &title, &content, &now_epoch_ms()],
        )
    }

    fn rename_page(&self, id: PageId, title: &str) -> RepoResult<()> {
        require_text("page title", title, PAGE_TITLE_MAX_CHARS)?;
        self.update_visible(
            id,
            "UPDATE pages
             SET title = ?2,
                 updated_at = ?3
             WHERE page_uuid = ?1",
            &[&id.to_string(), &title, &now_epoch_ms()],
        )
    }

    fn set_page_pinned(&self, id: PageId, is_pinned: bool) -> RepoResult<()> {
        self.update_visible(
            id,
            "UPDATE pages
             SET is_pinned = ?2,
                 updated_at = ?3
             WHERE page_uuid = ?1",
            &[&id.to_string(), &bool_to_int(is_pinned), &now_epoch_ms()],
        )
    }

    fn set_page_active(&self, id: PageId, is_active: bool) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE pages
             SET is_active = ?2,
                 updated_at = ?3
             WHERE page_uuid = ?1
               AND is_active <> ?2;",
            params![id.to_string(), bool_to_int(is_active), now_epoch_ms()],
        )?;
        Ok(changed > 0)
    }

    fn hard_delete_page(&self, id: PageId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM pages WHERE page_uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn search_pages(&self, user_uuid: UserId, query: &str) -> RepoResult<Vec<PageRecord>> {
        let needle = query.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        self.query_records(
            &format!(
                "{PAGE_SELECT_SQL}
                 WHERE w.user_uuid = ?1
                   AND {VISIBLE_PAGE_FILTER}
                   AND (p.title LIKE ?2 ESCAPE '\\' OR p.content LIKE ?2 ESCAPE '\\')
                 ORDER BY COALESCE(p.updated_at, p.created_at) DESC, p.rowid DESC;"
            ),
            &[&user_uuid.to_string(), &like_pattern(needle)],
        )
    }
}

impl SqlitePageRepository<'_> {
    fn query_records(&self, sql: &str, bind: &[&dyn ToSql]) -> RepoResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(parse_page_row(row)?);
        }

        let mut records = Vec::with_capacity(pages.len());
        for page in pages {
            let tags = load_page_tags(self.conn, page.uuid)?;
            records.push(PageRecord { page, tags });
        }
        Ok(records)
    }

    fn query_with_workspace(
        &self,
        sql: &str,
        bind: &[&dyn ToSql],
    ) -> RepoResult<Vec<DeletedPageRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(DeletedPageRecord {
                page: parse_page_row(row)?,
                workspace_name: row.get("workspace_name")?,
                workspace_is_active: parse_flag(
                    row.get("workspace_is_active")?,
                    "workspaces.is_active",
                )?,
            });
        }
        Ok(records)
    }

    /// Runs one `UPDATE` restricted to visible pages; missing rows map to
    /// `NotFound`.
    fn update_visible(&self, id: PageId, update_sql: &str, bind: &[&dyn ToSql]) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "{update_sql}
                   AND is_active = 1
                   AND workspace_uuid IN (
                       SELECT workspace_uuid FROM workspaces WHERE is_active = 1
                   );"
            ),
            bind,
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("page", id));
        }
        Ok(())
    }
}

pub(crate) fn parse_page_row(row: &Row<'_>) -> RepoResult<Page> {
    let page_uuid: String = row.get("page_uuid")?;
    let workspace_uuid: String = row.get("workspace_uuid")?;
    Ok(Page {
        uuid: parse_uuid(&page_uuid, "pages.page_uuid")?,
        workspace_uuid: parse_uuid(&workspace_uuid, "pages.workspace_uuid")?,
        title: row.get("title")?,
        content: row.get("content")?,
        is_pinned: parse_flag(row.get("is_pinned")?, "pages.is_pinned")?,
        is_active: parse_flag(row.get("is_active")?, "pages.is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
