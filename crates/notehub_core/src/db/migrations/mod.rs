//! Schema migration steps for the NoteHub database.
//!
//! A step's version is its 1-based position in [`STEPS`]; the highest applied
//! step is stored in `PRAGMA user_version`. Steps are append-only.

use crate::db::{DbError, DbResult};
use crate::model::tag::tag_name_key;
use log::info;
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::HashMap;

struct Step {
    name: &'static str,
    sql: &'static str,
    /// Data fix-up that SQL alone cannot express, run after `sql`.
    backfill: Option<fn(&Connection) -> DbResult<()>>,
}

const STEPS: &[Step] = &[
    Step {
        name: "users_workspaces_pages",
        sql: include_str!("0001_init.sql"),
        backfill: None,
    },
    Step {
        name: "tags",
        sql: include_str!("0002_tags.sql"),
        backfill: None,
    },
    Step {
        name: "tag_name_key",
        sql: include_str!("0003_tag_name_key.sql"),
        backfill: Some(fill_tag_name_keys),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

/// Reads the schema version recorded in the database header.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings the schema up to [`latest_version`].
///
/// Each pending step commits on its own, so a failure leaves the database
/// at the last step that succeeded. A database written by a newer build is
/// rejected untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    for (version, step) in (1..=latest).zip(STEPS).skip(found as usize) {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(step.sql)?;
        if let Some(backfill) = step.backfill {
            backfill(&tx)?;
        }
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!(
            "event=db_migrate module=db status=ok step={} version={}",
            step.name, version
        );
    }
    Ok(())
}

/// Computes `tags.name_key` and enforces its uniqueness.
///
/// SQLite `NOCASE` folds ASCII only, so older files may hold names that are
/// equal under full case folding. Those collapse into the oldest tag, which
/// inherits the page links of the others.
fn fill_tag_name_keys(conn: &Connection) -> DbResult<()> {
    let tags: Vec<(i64, String)> = {
        let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY id ASC;")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let mut kept: HashMap<String, i64> = HashMap::new();
    let mut merged = 0_usize;
    for (id, name) in tags {
        let key = tag_name_key(&name);
        match kept.get(&key) {
            Some(&survivor) => {
                conn.execute(
                    "INSERT OR IGNORE INTO page_tags (page_uuid, tag_id)
                     SELECT page_uuid, ?1 FROM page_tags WHERE tag_id = ?2;",
                    params![survivor, id],
                )?;
                conn.execute("DELETE FROM page_tags WHERE tag_id = ?1;", [id])?;
                conn.execute("DELETE FROM tags WHERE id = ?1;", [id])?;
                merged += 1;
            }
            None => {
                conn.execute(
                    "UPDATE tags SET name_key = ?2 WHERE id = ?1;",
                    params![id, key.as_str()],
                )?;
                kept.insert(key, id);
            }
        }
    }
    conn.execute_batch("CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_name_key ON tags (name_key);")?;
    if merged > 0 {
        info!("event=db_migrate module=db status=ok step=tag_name_key merged_tags={merged}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_follow_step_order() {
        assert_eq!(latest_version(), 3);
    }

    #[test]
    fn partial_schema_resumes_from_recorded_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(STEPS[0].sql).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();

        apply_migrations(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
        conn.execute_batch("SELECT id, name, name_key FROM tags LIMIT 0;").unwrap();
    }

    #[test]
    fn name_key_step_merges_tags_equal_under_unicode_case() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(STEPS[0].sql).unwrap();
        conn.execute_batch(STEPS[1].sql).unwrap();
        conn.pragma_update(None, "user_version", 2).unwrap();
        conn.execute_batch(
            "INSERT INTO users (user_uuid, username, password, is_active, created_at)
             VALUES ('u', 'alice', 'pw', 1, 0);
             INSERT INTO workspaces (workspace_uuid, user_uuid, name, is_active, created_at)
             VALUES ('w', 'u', 'Notes', 1, 0);
             INSERT INTO pages (page_uuid, workspace_uuid, title, content, is_pinned, is_active, created_at)
             VALUES ('p1', 'w', 'One', '', 0, 1, 0), ('p2', 'w', 'Two', '', 0, 1, 0);
             INSERT INTO tags (id, name) VALUES (1, 'Été'), (2, 'ÉTÉ'), (3, 'Work');
             INSERT INTO page_tags (page_uuid, tag_id) VALUES ('p1', 1), ('p2', 2);",
        )
        .unwrap();

        apply_migrations(&mut conn).unwrap();

        let keys: Vec<(i64, String)> = conn
            .prepare("SELECT id, name_key FROM tags ORDER BY id;")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(keys, vec![(1, "été".to_string()), (3, "work".to_string())]);
        let linked: i64 = conn
            .query_row("SELECT COUNT(*) FROM page_tags WHERE tag_id = 1;", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(linked, 2);
        assert!(conn
            .execute("INSERT INTO tags (name, name_key) VALUES ('WORK!', 'work');", [])
            .is_err());
    }
}
