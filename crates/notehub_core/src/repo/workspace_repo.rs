//! Workspace repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist workspaces and their soft-delete lifecycle.
//! - Project active page counts for list views.
//!
//! # Invariants
//! - Active lists are ordered by `created_at DESC` (insertion order breaks ties).
//! - Soft delete and restore bump `updated_at`; page flags are left untouched.
//! - Hard delete cascades to pages and page tag links via foreign keys.

use crate::model::user::UserId;
use crate::model::workspace::{Workspace, WorkspaceId};
use crate::model::{now_epoch_ms, require_text, WORKSPACE_NAME_MAX_CHARS};
use crate::repo::{
    bool_to_int, ensure_connection_ready, like_pattern, parse_flag, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row, ToSql};

const WORKSPACE_SELECT_SQL: &str = "SELECT
    w.workspace_uuid,
    w.user_uuid,
    w.name,
    w.is_active,
    w.created_at,
    w.updated_at,
    (
        SELECT COUNT(*)
        FROM pages p
        WHERE p.workspace_uuid = w.workspace_uuid
          AND p.is_active = 1
    ) AS active_page_count
FROM workspaces w";

/// Workspace row plus list projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRecord {
    pub workspace: Workspace,
    /// Number of active pages inside the workspace.
    pub active_page_count: u32,
}

/// Repository interface for workspaces.
pub trait WorkspaceRepository {
    /// Inserts one workspace. The owning user must exist.
    fn create_workspace(&self, workspace: &Workspace) -> RepoResult<WorkspaceId>;
    /// Loads one workspace regardless of active flag.
    fn get_workspace(&self, id: WorkspaceId) -> RepoResult<Option<WorkspaceRecord>>;
    /// Lists active workspaces of one user, newest first.
    fn list_workspaces(&self, user_uuid: UserId) -> RepoResult<Vec<WorkspaceRecord>>;
    /// Lists soft-deleted workspaces of one user, most recently deleted first.
    fn list_deleted_workspaces(&self, user_uuid: UserId) -> RepoResult<Vec<WorkspaceRecord>>;
    /// Renames one active workspace.
    fn rename_workspace(&self, id: WorkspaceId, name: &str) -> RepoResult<()>;
    /// Flips the active flag. Returns `false` when the row is missing or
    /// already in that state; timestamps are then left alone.
    fn set_workspace_active(&self, id: WorkspaceId, is_active: bool) -> RepoResult<bool>;
    /// Removes the row and everything inside it. Returns `false` when absent.
    fn hard_delete_workspace(&self, id: WorkspaceId) -> RepoResult<bool>;
    /// Case-insensitive name substring search over active workspaces.
    fn search_workspaces(&self, user_uuid: UserId, query: &str)
        -> RepoResult<Vec<WorkspaceRecord>>;
}

/// SQLite-backed workspace repository.
pub struct SqliteWorkspaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkspaceRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "workspaces",
            &[
                "workspace_uuid",
                "user_uuid",
                "name",
                "is_active",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl WorkspaceRepository for SqliteWorkspaceRepository<'_> {
    fn create_workspace(&self, workspace: &Workspace) -> RepoResult<WorkspaceId> {
        workspace.validate()?;
        let inserted = self.conn.execute(
            "INSERT INTO workspaces (
                workspace_uuid,
                user_uuid,
                name,
                is_active,
                created_at,
                updated_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6
            WHERE EXISTS (SELECT 1 FROM users WHERE user_uuid = ?2);",
            params![
                workspace.uuid.to_string(),
                workspace.user_uuid.to_string(),
                workspace.name.as_str(),
                bool_to_int(workspace.is_active),
                workspace.created_at,
                workspace.updated_at,
            ],
        )?;
        if inserted == 0 {
            return Err(RepoError::not_found("user", workspace.user_uuid));
        }
        Ok(workspace.uuid)
    }

    fn get_workspace(&self, id: WorkspaceId) -> RepoResult<Option<WorkspaceRecord>> {
        let mut records = self.query_records(
            &format!("{WORKSPACE_SELECT_SQL} WHERE w.workspace_uuid = ?1;"),
            &[&id.to_string()],
        )?;
        Ok(records.pop())
    }

    fn list_workspaces(&self, user_uuid: UserId) -> RepoResult<Vec<WorkspaceRecord>> {
        self.query_records(
            &format!(
                "{WORKSPACE_SELECT_SQL}
                 WHERE w.user_uuid = ?1
                   AND w.is_active = 1
                 ORDER BY w.created_at DESC, w.rowid DESC;"
            ),
            &[&user_uuid.to_string()],
        )
    }

    fn list_deleted_workspaces(&self, user_uuid: UserId) -> RepoResult<Vec<WorkspaceRecord>> {
        self.query_records(
            &format!(
                "{WORKSPACE_SELECT_SQL}
                 WHERE w.user_uuid = ?1
                   AND w.is_active = 0
                 ORDER BY COALESCE(w.updated_at, w.created_at) DESC, w.rowid DESC;"
            ),
            &[&user_uuid.to_string()],
        )
    }

    fn rename_workspace(&self, id: WorkspaceId, name: &str) -> RepoResult<()> {
        require_text("workspace name", name, WORKSPACE_NAME_MAX_CHARS)?;
        let changed = self.conn.execute(
            "UPDATE workspaces
             SET name = ?2,
                 updated_at = ?3
             WHERE workspace_uuid = ?1
               AND is_active = 1;",
            params![id.to_string(), name, now_epoch_ms()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("workspace", id));
        }
        Ok(())
    }

    fn set_workspace_active(&self, id: WorkspaceId, is_active: bool) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE workspaces
             SET is_active = ?2,
                 updated_at = ?3
             WHERE workspace_uuid = ?1
               AND is_active <> ?2;",
            params![id.to_string(), bool_to_int(is_active), now_epoch_ms()],
        )?;
        Ok(changed > 0)
    }

    fn hard_delete_workspace(&self, id: WorkspaceId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM workspaces WHERE workspace_uuid = ?1;",
            [id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn search_workspaces(
        &self,
        user_uuid: UserId,
        query: &str,
    ) -> RepoResult<Vec<WorkspaceRecord>> {
        let needle = query.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        self.query_records(
            &format!(
                "{WORKSPACE_SELECT_SQL}
                 WHERE w.user_uuid = ?1
                   AND w.is_active = 1
                   AND w.name LIKE ?2 ESCAPE '\\'
                 ORDER BY w.created_at DESC, w.rowid DESC;"
            ),
            &[&user_uuid.to_string(), &like_pattern(needle)],
        )
    }
}

impl SqliteWorkspaceRepository<'_> {
    fn query_records(&self, sql: &str, bind: &[&dyn ToSql]) -> RepoResult<Vec<WorkspaceRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_workspace_row(row)?);
        }
        Ok(records)
    }
}

fn parse_workspace_row(row: &Row<'_>) -> RepoResult<WorkspaceRecord> {
    let workspace_uuid: String = row.get("workspace_uuid")?;
    let user_uuid: String = row.get("user_uuid")?;
    let active_page_count: i64 = row.get("active_page_count")?;
    Ok(WorkspaceRecord {
        workspace: Workspace {
            uuid: parse_uuid(&workspace_uuid, "workspaces.workspace_uuid")?,
            user_uuid: parse_uuid(&user_uuid, "workspaces.user_uuid")?,
            name: row.get("name")?,
            is_active: parse_flag(row.get("is_active")?, "workspaces.is_active")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        },
        active_page_count: u32::try_from(active_page_count).unwrap_or(0),
    })
}
