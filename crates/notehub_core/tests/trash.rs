use notehub_core::db::open_db_in_memory;
use notehub_core::service::trash_service::{TrashServiceError, TrashTarget};
use notehub_core::viewmodel::trash::{TrashEvent, TrashViewModel};
use notehub_core::{
    SqliteAuthService, SqlitePageService, SqliteTrashService, SqliteWorkspaceService, UserId,
};
use rusqlite::{params, Connection};

fn register(conn: &Connection) -> UserId {
    SqliteAuthService::from_connection(conn)
        .unwrap()
        .register("alice", "pw1")
        .unwrap()
        .uuid
}

#[test]
fn trash_lists_deleted_items_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let workspaces = SqliteWorkspaceService::from_connection(&conn).unwrap();
    let pages = SqlitePageService::from_connection(&conn).unwrap();
    let trash = SqliteTrashService::from_connection(&conn).unwrap();

    let kept = workspaces.create_workspace(user, "Kept").unwrap().workspace.uuid;
    let dropped = workspaces.create_workspace(user, "Dropped").unwrap().workspace.uuid;
    let early = pages.create_page(kept, "Early", "").unwrap().page.uuid;
    let late = pages.create_page(kept, "Late", "").unwrap().page.uuid;

    pages.soft_delete_page(early).unwrap();
    pages.soft_delete_page(late).unwrap();
    workspaces.soft_delete_workspace(dropped).unwrap();
    conn.execute(
        "UPDATE pages SET updated_at = ?2 WHERE page_uuid = ?1;",
        params![early.to_string(), 1000_i64],
    )
    .unwrap();
    conn.execute(
        "UPDATE pages SET updated_at = ?2 WHERE page_uuid = ?1;",
        params![late.to_string(), 3000_i64],
    )
    .unwrap();
    conn.execute(
        "UPDATE workspaces SET updated_at = ?2 WHERE workspace_uuid = ?1;",
        params![dropped.to_string(), 2000_i64],
    )
    .unwrap();

    let targets: Vec<_> = trash
        .list_trash(user)
        .unwrap()
        .into_iter()
        .map(|item| item.target)
        .collect();
    assert_eq!(
        targets,
        vec![
            TrashTarget::Page(late),
            TrashTarget::Workspace(dropped),
            TrashTarget::Page(early),
        ]
    );
}

#[test]
fn page_in_deleted_workspace_has_restore_disabled() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let workspaces = SqliteWorkspaceService::from_connection(&conn).unwrap();
    let pages = SqlitePageService::from_connection(&conn).unwrap();
    let trash = SqliteTrashService::from_connection(&conn).unwrap();

    let ws = workspaces.create_workspace(user, "Archive").unwrap().workspace.uuid;
    let page = pages.create_page(ws, "Old", "").unwrap().page.uuid;
    pages.soft_delete_page(page).unwrap();
    workspaces.soft_delete_workspace(ws).unwrap();

    let items = trash.list_trash(user).unwrap();
    let page_item = items
        .iter()
        .find(|item| item.target == TrashTarget::Page(page))
        .unwrap();
    assert!(page_item.restore_disabled);
    assert_eq!(page_item.workspace_name.as_deref(), Some("Archive"));

    let err = trash.restore(TrashTarget::Page(page)).unwrap_err();
    assert!(matches!(err, TrashServiceError::RestoreBlocked { .. }));

    let restored = trash.restore(TrashTarget::Workspace(ws)).unwrap().unwrap();
    assert_eq!(restored.workspace_uuid, ws);
    let restored_page = trash.restore(TrashTarget::Page(page)).unwrap().unwrap();
    assert_eq!(restored_page.workspace_uuid, ws);
    assert!(trash.list_trash(user).unwrap().is_empty());
}

#[test]
fn hard_delete_from_trash_is_permanent() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let workspaces = SqliteWorkspaceService::from_connection(&conn).unwrap();
    let pages = SqlitePageService::from_connection(&conn).unwrap();
    let trash = SqliteTrashService::from_connection(&conn).unwrap();

    let ws = workspaces.create_workspace(user, "Inbox").unwrap().workspace.uuid;
    let page = pages.create_page(ws, "Spam", "").unwrap().page.uuid;
    pages.soft_delete_page(page).unwrap();

    assert!(trash.hard_delete(TrashTarget::Page(page)).unwrap());
    assert_eq!(trash.restore(TrashTarget::Page(page)).unwrap(), None);
    assert!(!trash.hard_delete(TrashTarget::Page(page)).unwrap());
    assert!(trash.list_trash(user).unwrap().is_empty());
}

#[test]
fn trash_view_model_guards_and_reports_blocked_restore() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let workspaces = SqliteWorkspaceService::from_connection(&conn).unwrap();
    let pages = SqlitePageService::from_connection(&conn).unwrap();

    let ws = workspaces.create_workspace(user, "Archive").unwrap().workspace.uuid;
    let page = pages.create_page(ws, "Old", "").unwrap().page.uuid;
    pages.soft_delete_page(page).unwrap();
    workspaces.soft_delete_workspace(ws).unwrap();

    let mut vm = TrashViewModel::new(&conn, user).unwrap();
    vm.refresh().unwrap();
    assert_eq!(vm.items().len(), 2);
    assert!(!vm.can_restore());
    assert!(!vm.can_hard_delete());

    assert!(vm.select(Some(TrashTarget::Page(page))));
    assert!(!vm.can_restore());
    assert!(vm.can_hard_delete());
    assert_eq!(
        TrashViewModel::restore_command().execute(&mut vm).unwrap(),
        None
    );
    assert_eq!(vm.restore_selected().unwrap(), None);
    assert!(vm.error_message().contains("Archive"));

    vm.select(Some(TrashTarget::Workspace(ws)));
    let event = TrashViewModel::restore_command()
        .execute(&mut vm)
        .unwrap()
        .flatten();
    assert!(matches!(event, Some(TrashEvent::Restored(item)) if item.workspace_uuid == ws));
    assert_eq!(vm.selected(), None);
    assert_eq!(vm.items().len(), 1);

    vm.select(Some(TrashTarget::Page(page)));
    assert!(vm.can_restore());
    let event = vm.hard_delete_selected().unwrap();
    assert_eq!(event, Some(TrashEvent::HardDeleted(TrashTarget::Page(page))));
    assert!(vm.items().is_empty());
}

#[test]
fn restoring_active_item_reports_nothing_and_repeat_delete_keeps_trash_order() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn);
    let workspaces = SqliteWorkspaceService::from_connection(&conn).unwrap();
    let pages = SqlitePageService::from_connection(&conn).unwrap();
    let trash = SqliteTrashService::from_connection(&conn).unwrap();

    let ws = workspaces.create_workspace(user, "Inbox").unwrap().workspace.uuid;
    let first = pages.create_page(ws, "First", "").unwrap().page.uuid;
    let second = pages.create_page(ws, "Second", "").unwrap().page.uuid;

    assert_eq!(trash.restore(TrashTarget::Page(first)).unwrap(), None);
    assert_eq!(trash.restore(TrashTarget::Workspace(ws)).unwrap(), None);

    pages.soft_delete_page(first).unwrap();
    pages.soft_delete_page(second).unwrap();
    for (id, at) in [(first, 100_i64), (second, 200_i64)] {
        conn.execute(
            "UPDATE pages SET updated_at = ?2 WHERE page_uuid = ?1;",
            params![id.to_string(), at],
        )
        .unwrap();
    }
    assert!(!pages.soft_delete_page(first).unwrap());

    let order: Vec<_> = trash
        .list_trash(user)
        .unwrap()
        .into_iter()
        .map(|item| (item.target, item.deleted_at))
        .collect();
    assert_eq!(
        order,
        vec![
            (TrashTarget::Page(second), 200),
            (TrashTarget::Page(first), 100),
        ]
    );
}
