//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open (and seed) the NoteHub database under a data directory.
//! - Sign in as the demo user and print workspaces, pages and trash.
//!
//! Usage: `notehub [DATA_DIR]`

use log::info;
use notehub_core::service::trash_service::TrashTarget;
use notehub_core::{
    init_logging, load_settings, open_db, seed_demo_data, MainViewModel, SqliteAuthService,
    SqliteTrashService, DEMO_PASSWORD, DEMO_USERNAME,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const SETTINGS_FILE: &str = "settings.json";
const DATA_DIR_NAME: &str = "notehub";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("notehub: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let data_dir = resolve_data_dir()?;
    let settings_path = data_dir.join(SETTINGS_FILE);
    let settings = load_settings(&settings_path);

    init_logging(&settings.log_level, &data_dir.join("logs"))?;

    let db_path = settings.resolved_database_path(&data_dir);
    let conn = open_db(&db_path)?;
    if seed_demo_data(&conn)? {
        println!("seeded demo data (user `{DEMO_USERNAME}`)");
    }

    let auth = SqliteAuthService::from_connection(&conn)?;
    let user = auth
        .login(DEMO_USERNAME, DEMO_PASSWORD)?
        .ok_or("demo user cannot sign in")?;
    info!("event=cli_login module=cli status=ok user_id={}", user.uuid);

    println!("notehub_core version={}", notehub_core::core_version());
    println!("database={}", db_path.display());

    let mut main_vm = MainViewModel::new(&conn, user.clone(), settings, Some(settings_path))?;
    let workspace_ids: Vec<_> = main_vm
        .workspace_list()
        .workspaces()
        .iter()
        .map(|item| item.id())
        .collect();
    for workspace_id in workspace_ids {
        main_vm.select_workspace(Some(workspace_id))?;
        if let Some(item) = main_vm.workspace_list().selected_item() {
            println!("workspace {} ({} pages)", item.workspace.name, item.page_count);
        }
        for page in main_vm.page_list().filtered_pages() {
            let pin = if page.page.is_pinned { "*" } else { " " };
            let preview = page.preview.as_deref().unwrap_or("");
            println!("  {pin} {}  {preview}", page.page.title);
        }
    }

    let trash = SqliteTrashService::from_connection(&conn)?.list_trash(user.uuid)?;
    println!("trash ({} items)", trash.len());
    for item in trash {
        let kind = match item.target {
            TrashTarget::Workspace(_) => "workspace",
            TrashTarget::Page(_) => "page",
        };
        println!("  {kind} {}", item.name);
    }
    Ok(())
}

fn resolve_data_dir() -> Result<PathBuf, Box<dyn Error>> {
    let dir = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => dirs::data_dir()
            .ok_or("no platform data directory; pass DATA_DIR")?
            .join(DATA_DIR_NAME),
    };
    let dir = if dir.is_absolute() {
        dir
    } else {
        std::env::current_dir()?.join(dir)
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
