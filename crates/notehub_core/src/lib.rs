//! Core of the NotionNote desktop note app.
//! Storage, domain rules and headless view-models live here; the GUI shell
//! only binds to the view-model API.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;
pub mod viewmodel;

pub use db::seed::{seed_demo_data, DEMO_PASSWORD, DEMO_USERNAME};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::page::{Page, PageId};
pub use model::tag::{Tag, TagId};
pub use model::user::{User, UserId};
pub use model::workspace::{Workspace, WorkspaceId};
pub use model::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::{
    SqliteAuthService, SqlitePageService, SqliteTagService, SqliteTrashService,
    SqliteWorkspaceService,
};
pub use settings::{load_settings, save_settings, AppSettings, SettingsError, Theme};
pub use viewmodel::coordinator::MainViewModel;
pub use viewmodel::login::LoginViewModel;
pub use viewmodel::{ViewModelError, ViewModelResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
