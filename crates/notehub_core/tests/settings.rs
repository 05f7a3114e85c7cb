use notehub_core::settings::DEFAULT_DATABASE_FILE;
use notehub_core::{default_log_level, load_settings, save_settings, AppSettings, Theme};
use std::path::{Path, PathBuf};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = load_settings(&dir.path().join("settings.json"));

    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.theme, Theme::Light);
    assert_eq!(settings.log_level, default_log_level());
    assert_eq!(settings.database_path, PathBuf::from(DEFAULT_DATABASE_FILE));
}

#[test]
fn corrupt_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert_eq!(load_settings(&path), AppSettings::default());
}

#[test]
fn saved_settings_load_back_with_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");
    let settings = AppSettings {
        database_path: PathBuf::from("notes/main.sqlite3"),
        theme: Theme::Dark,
        log_level: "warn".to_string(),
    };

    save_settings(&path, &settings).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"databasePath\""));
    assert!(raw.contains("\"dark\""));

    assert_eq!(load_settings(&path), settings);
}

#[test]
fn partial_file_fills_missing_fields_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "theme": "dark" }"#).unwrap();

    let settings = load_settings(&path);
    assert_eq!(settings.theme, Theme::Dark);
    assert_eq!(settings.database_path, PathBuf::from(DEFAULT_DATABASE_FILE));
}

#[test]
fn database_path_resolves_against_data_dir() {
    let data_dir = Path::new("/var/lib/notehub");
    let relative = AppSettings::default();
    assert_eq!(
        relative.resolved_database_path(data_dir),
        data_dir.join(DEFAULT_DATABASE_FILE)
    );

    let absolute = AppSettings {
        database_path: PathBuf::from("/tmp/elsewhere.sqlite3"),
        ..AppSettings::default()
    };
    assert_eq!(
        absolute.resolved_database_path(data_dir),
        PathBuf::from("/tmp/elsewhere.sqlite3")
    );
}

#[test]
fn theme_toggles_between_light_and_dark() {
    assert_eq!(Theme::Light.toggled(), Theme::Dark);
    assert_eq!(Theme::Dark.toggled(), Theme::Light);
}
