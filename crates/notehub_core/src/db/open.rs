use super::migrations::{apply_migrations, schema_version};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) the database at `path` and migrates it.
///
/// Missing parent directories are created first.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    let result = create_parent(path)
        .and_then(|()| Connection::open(path).map_err(DbError::from))
        .and_then(prepare);
    log_outcome("file", started_at, &result);
    result
}

/// Opens a private in-memory database; used by tests and previews.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(prepare);
    log_outcome("memory", started_at, &result);
    result
}

fn create_parent(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn prepare(mut conn: Connection) -> DbResult<Connection> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn log_outcome(mode: &str, started_at: Instant, result: &DbResult<Connection>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(conn) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={duration_ms} schema_version={}",
            schema_version(conn).unwrap_or_default()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::open_db;

    #[test]
    fn open_db_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("notes.sqlite3");

        open_db(&path).unwrap();
        assert!(path.exists());
    }
}
