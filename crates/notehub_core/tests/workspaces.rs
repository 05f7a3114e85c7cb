use notehub_core::db::open_db_in_memory;
use notehub_core::service::workspace_service::WorkspaceServiceError;
use notehub_core::viewmodel::workspace_list::WorkspaceListViewModel;
use notehub_core::{SqliteAuthService, SqlitePageService, SqliteWorkspaceService, UserId};
use rusqlite::{params, Connection};

fn register(conn: &Connection, username: &str) -> UserId {
    SqliteAuthService::from_connection(conn)
        .unwrap()
        .register(username, "pw1")
        .unwrap()
        .uuid
}

#[test]
fn create_list_and_rename_workspace() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "alice");
    let service = SqliteWorkspaceService::from_connection(&conn).unwrap();

    let created = service.create_workspace(user, "  Projects ").unwrap();
    assert_eq!(created.workspace.name, "Projects");
    assert_eq!(created.active_page_count, 0);
    assert!(created.workspace.updated_at.is_none());

    let renamed = service
        .rename_workspace(created.workspace.uuid, "Side Projects")
        .unwrap();
    assert_eq!(renamed.workspace.name, "Side Projects");
    assert!(renamed.workspace.updated_at.is_some());

    assert!(matches!(
        service.rename_workspace(created.workspace.uuid, "   "),
        Err(WorkspaceServiceError::InvalidName(_))
    ));
    assert!(matches!(
        service.create_workspace(user, &"x".repeat(101)),
        Err(WorkspaceServiceError::InvalidName(_))
    ));
}

#[test]
fn list_is_newest_first_and_scoped_to_user() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");
    let service = SqliteWorkspaceService::from_connection(&conn).unwrap();

    let older = service.create_workspace(alice, "Older").unwrap();
    let newer = service.create_workspace(alice, "Newer").unwrap();
    service.create_workspace(bob, "Bob's").unwrap();
    conn.execute(
        "UPDATE workspaces SET created_at = 1000 WHERE workspace_uuid = ?1;",
        params![older.workspace.uuid.to_string()],
    )
    .unwrap();

    let listed = service.list_workspaces(alice).unwrap();
    let ids: Vec<_> = listed.iter().map(|record| record.workspace.uuid).collect();
    assert_eq!(ids, vec![newer.workspace.uuid, older.workspace.uuid]);
}

#[test]
fn create_for_unknown_user_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteWorkspaceService::from_connection(&conn).unwrap();

    let err = service
        .create_workspace(uuid::Uuid::new_v4(), "Nowhere")
        .unwrap_err();
    assert!(matches!(err, WorkspaceServiceError::UserNotFound(_)));
}

#[test]
fn soft_delete_hides_workspace_and_its_pages_until_restore() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "alice");
    let workspaces = SqliteWorkspaceService::from_connection(&conn).unwrap();
    let pages = SqlitePageService::from_connection(&conn).unwrap();

    let ws = workspaces.create_workspace(user, "Work").unwrap().workspace.uuid;
    let page = pages.create_page(ws, "Plan", "ship it").unwrap().page.uuid;

    assert!(workspaces.soft_delete_workspace(ws).unwrap());
    assert!(workspaces.list_workspaces(user).unwrap().is_empty());
    assert!(workspaces.get_workspace(ws).unwrap().is_none());
    assert_eq!(workspaces.list_deleted_workspaces(user).unwrap().len(), 1);
    assert!(pages.get_page(page).unwrap().is_none());
    assert!(pages.list_pages(ws).unwrap().is_empty());
    assert!(pages.search_pages(user, "ship").unwrap().is_empty());

    assert!(workspaces.restore_workspace(ws).unwrap());
    assert_eq!(workspaces.list_workspaces(user).unwrap().len(), 1);
    assert_eq!(pages.get_page(page).unwrap().unwrap().page.title, "Plan");
}

#[test]
fn hard_delete_removes_workspace_and_pages() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "alice");
    let workspaces = SqliteWorkspaceService::from_connection(&conn).unwrap();
    let pages = SqlitePageService::from_connection(&conn).unwrap();

    let ws = workspaces.create_workspace(user, "Temp").unwrap().workspace.uuid;
    pages.create_page(ws, "Scratch", "").unwrap();

    assert!(workspaces.hard_delete_workspace(ws).unwrap());
    assert!(!workspaces.hard_delete_workspace(ws).unwrap());
    assert!(!workspaces.restore_workspace(ws).unwrap());
    assert!(workspaces.find_workspace_any_state(ws).unwrap().is_none());

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM pages;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn search_matches_name_substring_ignoring_case() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "alice");
    let service = SqliteWorkspaceService::from_connection(&conn).unwrap();
    service.create_workspace(user, "Home Renovation").unwrap();
    service.create_workspace(user, "Work").unwrap();
    service.create_workspace(user, "100% Done").unwrap();

    let hits = service.search_workspaces(user, "reno").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].workspace.name, "Home Renovation");

    let percent = service.search_workspaces(user, "%").unwrap();
    assert_eq!(percent.len(), 1);
    assert!(service.search_workspaces(user, "  ").unwrap().is_empty());
}

#[test]
fn list_view_model_adds_renames_filters_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "alice");
    let mut vm = WorkspaceListViewModel::new(&conn, user).unwrap();
    vm.refresh().unwrap();
    assert!(vm.is_empty());
    assert!(!vm.can_delete());

    let id = WorkspaceListViewModel::add_command()
        .execute(&mut vm)
        .unwrap()
        .expect("add enabled");
    assert_eq!(vm.selected(), Some(id));
    let item = vm.item(id).unwrap();
    assert_eq!(item.workspace.name, "New Workspace");
    assert!(item.is_editing);

    vm.set_edit_name(id, "   ");
    vm.commit_rename(id).unwrap();
    assert_eq!(vm.item(id).unwrap().edit_name, "New Workspace");
    assert!(!vm.item(id).unwrap().is_editing);

    vm.begin_rename(id);
    vm.set_edit_name(id, "Garden");
    vm.commit_rename(id).unwrap();
    assert_eq!(vm.item(id).unwrap().workspace.name, "Garden");

    vm.set_search_text("GAR");
    assert_eq!(vm.filtered_workspaces().len(), 1);
    vm.set_search_text("zzz");
    assert!(vm.is_empty());
    vm.set_search_text("");

    let deleted = WorkspaceListViewModel::delete_command()
        .execute(&mut vm)
        .unwrap()
        .flatten();
    assert_eq!(deleted, Some(id));
    assert_eq!(vm.selected(), None);
    assert!(vm.workspaces().is_empty());
}

#[test]
fn restoring_active_workspace_or_deleting_deleted_one_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "alice");
    let workspaces = SqliteWorkspaceService::from_connection(&conn).unwrap();
    let ws = workspaces.create_workspace(user, "Work").unwrap().workspace.uuid;
    let stamp = |value: i64| {
        conn.execute(
            "UPDATE workspaces SET updated_at = ?2 WHERE workspace_uuid = ?1;",
            params![ws.to_string(), value],
        )
        .unwrap();
    };

    stamp(100);
    assert!(!workspaces.restore_workspace(ws).unwrap());
    let active = workspaces.get_workspace(ws).unwrap().unwrap();
    assert_eq!(active.workspace.updated_at, Some(100));

    assert!(workspaces.soft_delete_workspace(ws).unwrap());
    stamp(100);
    assert!(!workspaces.soft_delete_workspace(ws).unwrap());
    let deleted = workspaces.list_deleted_workspaces(user).unwrap();
    assert_eq!(deleted[0].workspace.updated_at, Some(100));
}
