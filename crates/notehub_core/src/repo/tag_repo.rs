//! Tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist tags and page-tag links.
//! - Reconcile one page's tag set in a single transaction.
//!
//! # Invariants
//! - Tag names are unique ignoring case; `name_key` holds the Unicode-folded
//!   name under a unique index.
//! - Tag creation is idempotent: an existing name returns the stored tag.
//! - Deleting a tag removes its page links via foreign keys.

use crate::model::page::{Page, PageId};
use crate::model::tag::{normalize_tag_name, tag_name_key, Tag, TagId};
use crate::repo::page_repo::parse_page_row;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

/// Tag row plus list projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub tag: Tag,
    /// Number of visible pages carrying this tag.
    pub active_page_count: u32,
}

/// Outcome of one page tag reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub linked: Vec<Tag>,
    pub unlinked: Vec<Tag>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.linked.is_empty() && self.unlinked.is_empty()
    }
}

/// Repository interface for tags and page links.
pub trait TagRepository {
    /// Returns the tag with this name (ignoring case), creating it if absent.
    fn find_or_create_tag(&self, name: &str) -> RepoResult<Tag>;
    /// Loads one tag by id.
    fn get_tag(&self, id: TagId) -> RepoResult<Option<TagRecord>>;
    /// Loads one tag by name ignoring case.
    fn find_tag_by_name(&self, name: &str) -> RepoResult<Option<Tag>>;
    /// Lists all tags ordered by name.
    fn list_tags(&self) -> RepoResult<Vec<TagRecord>>;
    /// Renames one tag.
    fn rename_tag(&self, id: TagId, name: &str) -> RepoResult<()>;
    /// Deletes one tag and its links. Returns `false` when absent.
    fn delete_tag(&self, id: TagId) -> RepoResult<bool>;
    /// Lists the tags linked to one page.
    fn tags_for_page(&self, page_id: PageId) -> RepoResult<Vec<Tag>>;
    /// Lists visible pages carrying one tag, most recently modified first.
    fn pages_for_tag(&self, id: TagId) -> RepoResult<Vec<Page>>;
    /// Makes the page's tag set equal to `names` in one transaction.
    ///
    /// Missing tags are created first; only the difference against the
    /// persisted set is written.
    fn reconcile_page_tags(&self, page_id: PageId, names: &[String]) -> RepoResult<TagDiff>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "tags", &["id", "name", "name_key"])?;
        ensure_connection_ready(conn, "page_tags", &["page_uuid", "tag_id"])?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn find_or_create_tag(&self, name: &str) -> RepoResult<Tag> {
        find_or_create_in(self.conn, name)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<TagRecord>> {
        let mut records = query_tag_records(self.conn, "WHERE t.id = ?1", params![id])?;
        Ok(records.pop())
    }

    fn find_tag_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        find_by_name_in(self.conn, name.trim())
    }

    fn list_tags(&self) -> RepoResult<Vec<TagRecord>> {
        query_tag_records(self.conn, "", [])
    }

    fn rename_tag(&self, id: TagId, name: &str) -> RepoResult<()> {
        let name = normalize_tag_name(name)?;
        let changed = self.conn.execute(
            "UPDATE tags SET name = ?2, name_key = ?3 WHERE id = ?1;",
            params![id, name.as_str(), tag_name_key(&name)],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("tag", id));
        }
        Ok(())
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM tags WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn tags_for_page(&self, page_id: PageId) -> RepoResult<Vec<Tag>> {
        load_page_tags(self.conn, page_id)
    }

    fn pages_for_tag(&self, id: TagId) -> RepoResult<Vec<Page>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.page_uuid,
                p.workspace_uuid,
                p.title,
                p.content,
                p.is_pinned,
                p.is_active,
                p.created_at,
                p.updated_at
             FROM page_tags pt
             JOIN pages p ON p.page_uuid = pt.page_uuid
             JOIN workspaces w ON w.workspace_uuid = p.workspace_uuid
             WHERE pt.tag_id = ?1
               AND p.is_active = 1
               AND w.is_active = 1
             ORDER BY COALESCE(p.updated_at, p.created_at) DESC, p.rowid DESC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(parse_page_row(row)?);
        }
        Ok(pages)
    }

    fn reconcile_page_tags(&self, page_id: PageId, names: &[String]) -> RepoResult<TagDiff> {
        let page_id_text = page_id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !visible_page_exists(&tx, page_id_text.as_str())? {
            return Err(RepoError::not_found("page", page_id));
        }

        let mut wanted = Vec::with_capacity(names.len());
        for name in names {
            let tag = find_or_create_in(&tx, name)?;
            if !wanted.iter().any(|existing: &Tag| existing.id == tag.id) {
                wanted.push(tag);
            }
        }
        let wanted_ids: BTreeSet<TagId> = wanted.iter().map(|tag| tag.id).collect();

        let current = load_page_tags(&tx, page_id)?;
        let current_ids: BTreeSet<TagId> = current.iter().map(|tag| tag.id).collect();

        let mut diff = TagDiff::default();
        for tag in current {
            if !wanted_ids.contains(&tag.id) {
                tx.execute(
                    "DELETE FROM page_tags WHERE page_uuid = ?1 AND tag_id = ?2;",
                    params![page_id_text.as_str(), tag.id],
                )?;
                diff.unlinked.push(tag);
            }
        }
        for tag in wanted {
            if !current_ids.contains(&tag.id) {
                tx.execute(
                    "INSERT INTO page_tags (page_uuid, tag_id) VALUES (?1, ?2);",
                    params![page_id_text.as_str(), tag.id],
                )?;
                diff.linked.push(tag);
            }
        }

        tx.commit()?;
        Ok(diff)
    }
}

/// Loads the tags linked to one page, sorted by name ignoring case.
pub(crate) fn load_page_tags(conn: &Connection, page_id: PageId) -> RepoResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name
         FROM page_tags pt
         JOIN tags t ON t.id = pt.tag_id
         WHERE pt.page_uuid = ?1
         ORDER BY t.name_key ASC, t.id ASC;",
    )?;
    let mut rows = stmt.query([page_id.to_string()])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        });
    }
    Ok(tags)
}

fn find_by_name_in(conn: &Connection, name: &str) -> RepoResult<Option<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tags WHERE name_key = ?1;")?;
    let mut rows = stmt.query([tag_name_key(name)])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        }));
    }
    Ok(None)
}

fn find_or_create_in(conn: &Connection, name: &str) -> RepoResult<Tag> {
    let name = normalize_tag_name(name)?;
    conn.execute(
        "INSERT OR IGNORE INTO tags (name, name_key) VALUES (?1, ?2);",
        params![name.as_str(), tag_name_key(&name)],
    )?;
    find_by_name_in(conn, name.as_str())?.ok_or_else(|| {
        RepoError::InvalidData(format!("tag `{name}` missing after insert"))
    })
}

fn query_tag_records<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> RepoResult<Vec<TagRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT
            t.id,
            t.name,
            (
                SELECT COUNT(*)
                FROM page_tags pt
                JOIN pages p ON p.page_uuid = pt.page_uuid
                JOIN workspaces w ON w.workspace_uuid = p.workspace_uuid
                WHERE pt.tag_id = t.id
                  AND p.is_active = 1
                  AND w.is_active = 1
            ) AS active_page_count
         FROM tags t
         {filter}
         ORDER BY t.name_key ASC, t.id ASC;"
    ))?;
    let mut rows = stmt.query(params)?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let count: i64 = row.get(2)?;
        records.push(TagRecord {
            tag: Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            },
            active_page_count: u32::try_from(count).unwrap_or(0),
        });
    }
    Ok(records)
}

fn visible_page_exists(conn: &Connection, page_id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM pages p
            JOIN workspaces w ON w.workspace_uuid = p.workspace_uuid
            WHERE p.page_uuid = ?1
              AND p.is_active = 1
              AND w.is_active = 1
        );",
        [page_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
