//! First-run demo data.
//!
//! Seeding runs in one transaction and is skipped once any user exists.

use crate::model::page::Page;
use crate::model::user::User;
use crate::model::workspace::Workspace;
use crate::repo::page_repo::{PageRepository, SqlitePageRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::workspace_repo::{SqliteWorkspaceRepository, WorkspaceRepository};
use crate::repo::RepoResult;
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo123";

/// Inserts the demo account with two workspaces and three pages.
///
/// Returns `true` when data was written, `false` when the database already
/// had users.
pub fn seed_demo_data(conn: &Connection) -> RepoResult<bool> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let users = SqliteUserRepository::try_new(&tx)?;
    if users.count_users()? > 0 {
        return Ok(false);
    }

    let user = User::new(DEMO_USERNAME, DEMO_PASSWORD);
    users.create_user(&user)?;

    let workspaces = SqliteWorkspaceRepository::try_new(&tx)?;
    let personal = Workspace::new(user.uuid, "Personal");
    let work = Workspace::new(user.uuid, "Work");
    workspaces.create_workspace(&personal)?;
    workspaces.create_workspace(&work)?;

    let pages = SqlitePageRepository::try_new(&tx)?;
    let mut welcome = Page::new(
        personal.uuid,
        "Welcome to NotionNote",
        "This is your first note! Start writing something amazing.",
    );
    welcome.is_pinned = true;
    let meeting = Page::new(
        work.uuid,
        "Meeting Notes",
        "Q1 2025 Planning Meeting\n\n- Review goals\n- Budget planning\n- Team updates",
    );
    let todo = Page::new(
        personal.uuid,
        "TODO List",
        "Things to do:\n- Buy groceries\n- Finish project\n- Call mom",
    );
    for page in [&welcome, &meeting, &todo] {
        pages.create_page(page)?;
    }

    tx.commit()?;
    info!(
        "event=db_seed module=db status=ok user_id={} workspaces=2 pages=3",
        user.uuid
    );
    Ok(true)
}
