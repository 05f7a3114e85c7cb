use notehub_core::db::open_db_in_memory;
use notehub_core::service::auth_service::AuthServiceError;
use notehub_core::viewmodel::login::LoginViewModel;
use notehub_core::viewmodel::user_profile::UserProfileViewModel;
use notehub_core::SqliteAuthService;
use rusqlite::Connection;

#[test]
fn register_then_login_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteAuthService::from_connection(&conn).unwrap();

    let user = auth.register("alice", "secret").unwrap();
    assert!(user.is_active);

    let logged_in = auth.login("alice", "secret").unwrap().expect("login");
    assert_eq!(logged_in.uuid, user.uuid);
    assert!(auth.login("alice", "wrong").unwrap().is_none());
    assert!(auth.login("Alice", "secret").unwrap().is_none());
}

#[test]
fn blank_credentials_never_match() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteAuthService::from_connection(&conn).unwrap();
    auth.register("bob", "pw1").unwrap();

    assert!(auth.login("", "").unwrap().is_none());
    assert!(auth.login("bob", "   ").unwrap().is_none());
    assert!(matches!(
        auth.register(" ", "pw"),
        Err(AuthServiceError::BlankCredentials)
    ));
}

#[test]
fn duplicate_username_is_rejected_without_new_row() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteAuthService::from_connection(&conn).unwrap();
    auth.register("carol", "pw1").unwrap();

    let err = auth.register("carol", "other").unwrap_err();
    assert!(matches!(err, AuthServiceError::UsernameTaken(ref name) if name == "carol"));
    assert_eq!(user_count(&conn), 1);
    assert!(auth.username_exists("carol").unwrap());
    assert!(!auth.username_exists("Carol").unwrap());
}

#[test]
fn inactive_user_cannot_login() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteAuthService::from_connection(&conn).unwrap();
    let user = auth.register("dave", "pw1").unwrap();
    conn.execute(
        "UPDATE users SET is_active = 0 WHERE user_uuid = ?1;",
        [user.uuid.to_string()],
    )
    .unwrap();

    assert!(auth.login("dave", "pw1").unwrap().is_none());
}

#[test]
fn change_password_requires_old_password() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteAuthService::from_connection(&conn).unwrap();
    let user = auth.register("erin", "old").unwrap();

    assert!(matches!(
        auth.change_password(user.uuid, "nope", "new1"),
        Err(AuthServiceError::IncorrectPassword)
    ));
    auth.change_password(user.uuid, "old", "new1").unwrap();

    assert!(auth.login("erin", "old").unwrap().is_none());
    assert!(auth.login("erin", "new1").unwrap().is_some());
}

#[test]
fn login_view_model_reports_inline_errors() {
    let conn = open_db_in_memory().unwrap();
    let mut vm = LoginViewModel::new(&conn).unwrap();
    assert_eq!(vm.mode_title(), "Welcome Back");
    assert!(!vm.can_login());

    vm.set_username("ghost");
    vm.set_password("pw1");
    assert!(vm.can_login());
    assert_eq!(vm.login().unwrap(), None);
    assert_eq!(vm.error_message(), "Invalid username or password");

    vm.set_password("pw2");
    assert_eq!(vm.error_message(), "");

    vm.switch_mode();
    assert_eq!(vm.mode_title(), "Create Account");
    assert_eq!(vm.username(), "");

    vm.set_username("ab");
    vm.set_password("secret");
    assert_eq!(vm.register().unwrap(), None);
    assert_eq!(vm.error_message(), "Username must be at least 3 characters");

    vm.set_username("frank");
    vm.set_password("pw");
    vm.register().unwrap();
    assert_eq!(vm.error_message(), "Password must be at least 3 characters");

    vm.set_password("pw1");
    let user = LoginViewModel::register_command()
        .execute(&mut vm)
        .unwrap()
        .flatten()
        .expect("registered");
    assert_eq!(user.username, "frank");
    assert_eq!(vm.authenticated_user().map(|u| u.uuid), Some(user.uuid));

    vm.switch_mode();
    vm.switch_mode();
    vm.set_username("frank");
    vm.set_password("pw1");
    assert_eq!(vm.register().unwrap(), None);
    assert_eq!(vm.error_message(), "Username already exists");
}

#[test]
fn profile_view_model_validates_password_change() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteAuthService::from_connection(&conn).unwrap();
    let user = auth.register("grace", "old").unwrap();
    let mut vm = UserProfileViewModel::new(&conn, user.uuid).unwrap();
    vm.refresh().unwrap();
    assert_eq!(vm.username(), "grace");

    assert!(!vm.change_password().unwrap());
    assert_eq!(vm.error_message(), "Please enter your old password");

    vm.set_old_password("old");
    vm.change_password().unwrap();
    assert_eq!(vm.error_message(), "Please enter your new password");

    vm.set_new_password("ab");
    vm.change_password().unwrap();
    assert_eq!(vm.error_message(), "New password must be at least 3 characters");

    vm.set_new_password("newer");
    vm.set_confirm_password("other");
    vm.change_password().unwrap();
    assert_eq!(
        vm.error_message(),
        "New password and confirm password do not match"
    );

    vm.set_old_password("wrong");
    vm.set_confirm_password("newer");
    assert!(!vm.change_password().unwrap());
    assert_eq!(vm.error_message(), "Old password is incorrect");

    vm.set_old_password("old");
    assert!(vm.change_password().unwrap());
    assert_eq!(vm.success_message(), "Password changed successfully!");
    assert_eq!(vm.error_message(), "");
    assert_eq!(vm.old_password(), "");
    assert!(auth.login("grace", "newer").unwrap().is_some());
}

fn user_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap()
}
