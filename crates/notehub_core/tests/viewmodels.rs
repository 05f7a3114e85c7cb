use notehub_core::db::open_db_in_memory;
use notehub_core::viewmodel::editor::{EditorEvent, EditorProperty};
use notehub_core::viewmodel::observable::Observable;
use notehub_core::viewmodel::sidebar::SidebarContent;
use notehub_core::viewmodel::trash::TrashEvent;
use notehub_core::{
    seed_demo_data, AppSettings, MainViewModel, SqliteAuthService, SqlitePageService,
    SqliteTagService, Theme, User,
};
use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::rc::Rc;

fn demo_user(conn: &Connection) -> User {
    seed_demo_data(conn).unwrap();
    SqliteAuthService::from_connection(conn)
        .unwrap()
        .login("demo", "demo123")
        .unwrap()
        .unwrap()
}

fn open_main(conn: &Connection) -> MainViewModel<'_> {
    let user = demo_user(conn);
    MainViewModel::new(conn, user, AppSettings::default(), None).unwrap()
}

fn workspace_named(main: &MainViewModel<'_>, name: &str) -> uuid::Uuid {
    main.workspace_list()
        .workspaces()
        .iter()
        .find(|item| item.workspace.name == name)
        .unwrap()
        .id()
}

fn page_named(main: &MainViewModel<'_>, title: &str) -> uuid::Uuid {
    main.page_list()
        .pages()
        .iter()
        .find(|item| item.page.title == title)
        .unwrap()
        .id()
}

#[test]
fn startup_selects_first_workspace_and_loads_its_pages() {
    let conn = open_db_in_memory().unwrap();
    let main = open_main(&conn);

    let first = main.workspace_list().workspaces()[0].id();
    assert_eq!(main.selected_workspace(), Some(first));
    assert_eq!(main.page_list().workspace(), Some(first));
    assert_eq!(main.editor().current_workspace(), Some(first));
    assert_eq!(main.selected_page(), None);
    assert_eq!(main.sidebar().username(), "demo");
}

#[test]
fn selecting_workspace_clears_page_selection_and_orders_pinned_first() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    let personal = workspace_named(&main, "Personal");
    let work = workspace_named(&main, "Work");

    main.select_workspace(Some(personal)).unwrap();
    let titles: Vec<_> = main
        .page_list()
        .filtered_pages()
        .iter()
        .map(|item| item.page.title.clone())
        .collect();
    assert_eq!(titles, vec!["Welcome to NotionNote", "TODO List"]);

    let todo = page_named(&main, "TODO List");
    main.select_page(Some(todo)).unwrap();
    assert_eq!(main.editor().title(), "TODO List");
    assert_eq!(main.editor().current_page_id(), Some(todo));

    main.select_workspace(Some(work)).unwrap();
    assert_eq!(main.selected_page(), None);
    assert_eq!(main.editor().current_page_id(), None);
    assert_eq!(main.editor().title(), "");
    assert_eq!(main.editor().current_workspace(), Some(work));
    assert_eq!(main.page_list().pages().len(), 1);
}

#[test]
fn pinning_edited_page_moves_it_to_top_and_keeps_selection() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    conn.execute(
        "UPDATE pages SET updated_at = ?1 WHERE title = 'Welcome to NotionNote';",
        params![1000_i64],
    )
    .unwrap();
    let personal = workspace_named(&main, "Personal");
    main.select_workspace(Some(personal)).unwrap();
    let todo = page_named(&main, "TODO List");
    assert_ne!(main.page_list().filtered_pages()[0].id(), todo);
    main.select_page(Some(todo)).unwrap();
    main.editor_mut().set_content("unsaved edit");

    let event = main.toggle_pin().unwrap();
    assert!(matches!(event, Some(EditorEvent::PageSaved(ref record)) if record.page.is_pinned));
    assert_eq!(main.page_list().filtered_pages()[0].id(), todo);
    assert_eq!(main.selected_page(), Some(todo));
    assert_eq!(main.editor().content(), "unsaved edit");
    assert!(main.editor().is_dirty());
}

#[test]
fn saving_reconciles_selected_tags() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    let personal = workspace_named(&main, "Personal");
    main.select_workspace(Some(personal)).unwrap();
    let todo = page_named(&main, "TODO List");

    let tags = SqliteTagService::from_connection(&conn).unwrap();
    tags.reconcile_page_tags(todo, &["A".to_string(), "C".to_string()])
        .unwrap();
    main.select_page(Some(todo)).unwrap();
    assert_eq!(main.editor().selected_tag_names(), vec!["A", "C"]);

    let c_id = main.editor().selected_tags()[1].id;
    main.editor_mut().remove_tag(c_id).unwrap();
    main.editor_mut().set_new_tag_input("b");
    main.editor_mut().add_tag().unwrap();
    main.editor_mut().set_new_tag_input("a");
    main.editor_mut().add_tag().unwrap();
    assert_eq!(main.editor().selected_tag_names(), vec!["A", "b"]);
    assert!(main
        .editor()
        .available_tags()
        .iter()
        .any(|tag| tag.name == "C"));

    let event = main.save_page().unwrap();
    assert!(matches!(event, Some(EditorEvent::PageSaved(_))));
    let persisted: Vec<_> = tags
        .tags_for_page(todo)
        .unwrap()
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    assert_eq!(persisted, vec!["A", "b"]);
    assert!(!main.editor().is_dirty());
    assert!(main.editor().last_saved_at().is_some());
    let item = main.page_list().item(todo).unwrap();
    assert_eq!(item.tags.len(), 2);
}

#[test]
fn saving_without_loaded_page_creates_one_in_current_workspace() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    let work = workspace_named(&main, "Work");
    main.select_workspace(Some(work)).unwrap();

    assert!(!main.editor().can_save());
    assert_eq!(main.save_page().unwrap(), None);

    main.editor_mut().set_title("Standup");
    main.editor_mut().set_content("yesterday, today");
    let event = main.save_page().unwrap();
    let Some(EditorEvent::PageSaved(record)) = event else {
        panic!("expected saved page");
    };
    assert_eq!(record.page.workspace_uuid, work);
    assert_eq!(main.selected_page(), Some(record.page.uuid));
    assert_eq!(main.page_list().pages().len(), 2);
    assert_eq!(main.workspace_list().item(work).unwrap().page_count, 2);
}

#[test]
fn deleting_edited_page_clears_selection_and_editor() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    let work = workspace_named(&main, "Work");
    main.select_workspace(Some(work)).unwrap();
    let meeting = page_named(&main, "Meeting Notes");
    main.select_page(Some(meeting)).unwrap();

    let event = main.delete_page().unwrap();
    assert_eq!(
        event,
        Some(EditorEvent::PageDeleted {
            page_id: meeting,
            workspace_uuid: work,
        })
    );
    assert_eq!(main.selected_page(), None);
    assert!(main.page_list().pages().is_empty());
    assert_eq!(main.editor().current_page_id(), None);
    assert_eq!(main.workspace_list().item(work).unwrap().page_count, 0);
    assert!(!main.editor().can_delete());
}

#[test]
fn restoring_from_trash_reloads_selected_workspace_pages() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    let work = workspace_named(&main, "Work");
    main.select_workspace(Some(work)).unwrap();
    let meeting = page_named(&main, "Meeting Notes");
    main.select_page(Some(meeting)).unwrap();
    main.delete_page().unwrap();

    assert_eq!(
        main.show_panel(SidebarContent::Trash).unwrap(),
        SidebarContent::Trash
    );
    assert_eq!(main.trash().items().len(), 1);
    main.trash_mut()
        .select(Some(notehub_core::service::trash_service::TrashTarget::Page(meeting)));

    let event = main.restore_trash_item().unwrap();
    assert!(matches!(event, Some(TrashEvent::Restored(_))));
    assert_eq!(main.page_list().pages().len(), 1);
    assert_eq!(main.workspace_list().item(work).unwrap().page_count, 1);
    assert!(main.trash().items().is_empty());
}

#[test]
fn deleting_workspace_clears_cascade_and_restore_brings_it_back() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    let work = workspace_named(&main, "Work");
    main.select_workspace(Some(work)).unwrap();

    assert_eq!(main.delete_selected_workspace().unwrap(), Some(work));
    assert_eq!(main.selected_workspace(), None);
    assert!(main.page_list().pages().is_empty());
    assert_eq!(main.editor().current_workspace(), None);
    assert!(!main.page_list().can_add());

    main.show_panel(SidebarContent::Trash).unwrap();
    main.trash_mut()
        .select(Some(notehub_core::service::trash_service::TrashTarget::Workspace(work)));
    main.restore_trash_item().unwrap();
    assert!(main.workspace_list().item(work).is_some());

    let pages = SqlitePageService::from_connection(&conn).unwrap();
    assert_eq!(pages.list_pages(work).unwrap().len(), 1);
}

#[test]
fn add_page_and_inline_rename_flow_through_editor() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    let before = main.workspace_list().selected_item().unwrap().page_count;

    let id = main.add_page().unwrap().expect("page added");
    assert_eq!(main.selected_page(), Some(id));
    assert_eq!(main.editor().title(), "Untitled Page");
    assert_eq!(
        main.workspace_list().selected_item().unwrap().page_count,
        before + 1
    );

    main.page_list_mut().set_edit_title(id, "Renamed");
    main.commit_page_rename(id).unwrap();
    assert_eq!(main.editor().title(), "Renamed");
}

#[test]
fn sidebar_panels_toggle_and_collapse() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);

    main.toggle_sidebar();
    assert!(!main.sidebar().is_expanded());
    assert_eq!(
        main.show_panel(SidebarContent::Settings).unwrap(),
        SidebarContent::Settings
    );
    assert!(main.sidebar().is_expanded());
    assert_eq!(
        main.show_panel(SidebarContent::Settings).unwrap(),
        SidebarContent::None
    );

    main.show_panel(SidebarContent::UserProfile).unwrap();
    assert_eq!(main.user_profile().username(), "demo");
    main.toggle_sidebar();
    assert_eq!(main.sidebar().content(), SidebarContent::None);
}

#[test]
fn theme_toggle_persists_and_notifies() {
    let conn = open_db_in_memory().unwrap();
    let user = demo_user(&conn);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let mut main =
        MainViewModel::new(&conn, user, AppSettings::default(), Some(path.clone())).unwrap();

    let seen = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&seen);
    let subscription = main
        .settings_mut()
        .subscribe(move |_| *sink.borrow_mut() += 1);

    assert_eq!(main.toggle_theme().unwrap(), Theme::Dark);
    assert!(main.settings().is_dark_mode());
    assert_eq!(*seen.borrow(), 1);
    assert_eq!(notehub_core::load_settings(&path).theme, Theme::Dark);

    assert!(main.settings_mut().unsubscribe(subscription));
    main.toggle_theme().unwrap();
    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn editor_notifies_only_on_change() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    main.editor_mut()
        .subscribe(move |property| sink.borrow_mut().push(property));

    main.editor_mut().set_title("Draft");
    main.editor_mut().set_title("Draft");
    let titles = seen
        .borrow()
        .iter()
        .filter(|property| **property == EditorProperty::Title)
        .count();
    assert_eq!(titles, 1);
    assert!(seen.borrow().contains(&EditorProperty::IsDirty));
}

#[test]
fn tag_changes_refresh_editor_and_page_list() {
    let conn = open_db_in_memory().unwrap();
    let mut main = open_main(&conn);
    let personal = workspace_named(&main, "Personal");
    main.select_workspace(Some(personal)).unwrap();
    let todo = page_named(&main, "TODO List");
    SqliteTagService::from_connection(&conn)
        .unwrap()
        .reconcile_page_tags(todo, &["Errands".to_string()])
        .unwrap();
    main.select_page(Some(todo)).unwrap();

    main.show_panel(SidebarContent::TagManagement).unwrap();
    let errands = main.tag_management().tags()[0].tag.id;
    main.tag_management_mut().select(Some(errands));
    main.delete_selected_tag().unwrap();

    assert!(main.editor().selected_tags().is_empty());
    assert!(main.page_list().item(todo).unwrap().tags.is_empty());
}

#[test]
fn failed_theme_save_keeps_previous_theme() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let mut settings = notehub_core::viewmodel::settings::SettingsViewModel::new(
        AppSettings::default(),
        Some(blocker.join("settings.json")),
    );
    let seen = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&seen);
    settings.subscribe(move |_| *sink.borrow_mut() += 1);

    assert!(settings.toggle_theme().is_err());
    assert_eq!(settings.theme(), Theme::Light);
    assert_eq!(settings.settings(), &AppSettings::default());
    assert_eq!(*seen.borrow(), 0);
}
