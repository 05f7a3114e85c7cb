//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist local accounts and answer credential lookups.
//!
//! # Invariants
//! - Usernames are compared by exact (binary) match.
//! - Credential lookups only consider active users.
//! - Passwords are stored as provided.

use crate::model::user::{User, UserId};
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_flag, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row, ToSql};

const USER_SELECT_SQL: &str = "SELECT
    user_uuid,
    username,
    password,
    is_active,
    created_at
FROM users";

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts one user and returns its id.
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    /// Loads one user by id regardless of active flag.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Loads one user by exact username regardless of active flag.
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Loads one active user matching both username and password.
    fn find_active_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> RepoResult<Option<User>>;
    /// Replaces the stored password for one user.
    fn update_password(&self, id: UserId, password: &str) -> RepoResult<()>;
    /// Returns the number of stored users.
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "users",
            &["user_uuid", "username", "password", "is_active", "created_at"],
        )?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;
        self.conn.execute(
            "INSERT INTO users (user_uuid, username, password, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                user.uuid.to_string(),
                user.username.as_str(),
                user.password.as_str(),
                bool_to_int(user.is_active),
                user.created_at,
            ],
        )?;
        Ok(user.uuid)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.query_one(
            &format!("{USER_SELECT_SQL} WHERE user_uuid = ?1;"),
            &[&id.to_string()],
        )
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.query_one(
            &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
            &[&username],
        )
    }

    fn find_active_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> RepoResult<Option<User>> {
        self.query_one(
            &format!(
                "{USER_SELECT_SQL}
                 WHERE username = ?1
                   AND password = ?2
                   AND is_active = 1;"
            ),
            &[&username, &password],
        )
    }

    fn update_password(&self, id: UserId, password: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET password = ?2 WHERE user_uuid = ?1;",
            params![id.to_string(), password],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }
        Ok(())
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl SqliteUserRepository<'_> {
    fn query_one(&self, sql: &str, bind: &[&dyn ToSql]) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("user_uuid")?;
    Ok(User {
        uuid: parse_uuid(&uuid_text, "users.user_uuid")?,
        username: row.get("username")?,
        password: row.get("password")?,
        is_active: parse_flag(row.get("is_active")?, "users.is_active")?,
        created_at: row.get("created_at")?,
    })
}
