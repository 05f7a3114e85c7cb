//! Login / registration screen state.

use crate::model::user::User;
use crate::repo::RepoResult;
use crate::service::auth_service::AuthServiceError;
use crate::service::SqliteAuthService;
use crate::viewmodel::command::Command;
use crate::viewmodel::observable::{replace_if_changed, Observable, PropertyNotifier};
use crate::viewmodel::{ViewModelError, ViewModelResult};
use rusqlite::Connection;

pub const MIN_CREDENTIAL_CHARS: usize = 3;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";
pub const USERNAME_TAKEN_MESSAGE: &str = "Username already exists";
pub const USERNAME_TOO_SHORT_MESSAGE: &str = "Username must be at least 3 characters";
pub const PASSWORD_TOO_SHORT_MESSAGE: &str = "Password must be at least 3 characters";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginProperty {
    Username,
    Password,
    ErrorMessage,
    IsLoginMode,
    IsBusy,
    AuthenticatedUser,
}

pub type LoginCommand<'conn> = Command<LoginViewModel<'conn>, Option<User>, ViewModelError>;

pub struct LoginViewModel<'conn> {
    auth: SqliteAuthService<'conn>,
    username: String,
    password: String,
    error_message: String,
    is_login_mode: bool,
    is_busy: bool,
    authenticated_user: Option<User>,
    notifier: PropertyNotifier<LoginProperty>,
}

impl<'conn> LoginViewModel<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            auth: SqliteAuthService::from_connection(conn)?,
            username: String::new(),
            password: String::new(),
            error_message: String::new(),
            is_login_mode: true,
            is_busy: false,
            authenticated_user: None,
            notifier: PropertyNotifier::new(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn is_login_mode(&self) -> bool {
        self.is_login_mode
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    /// User of the last successful login or registration.
    pub fn authenticated_user(&self) -> Option<&User> {
        self.authenticated_user.as_ref()
    }

    pub fn mode_title(&self) -> &'static str {
        if self.is_login_mode {
            "Welcome Back"
        } else {
            "Create Account"
        }
    }

    pub fn mode_switch_text(&self) -> &'static str {
        if self.is_login_mode {
            "Don't have an account? Sign up"
        } else {
            "Already have an account? Login"
        }
    }

    pub fn set_username(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.username, value.into()) {
            self.notifier.notify(LoginProperty::Username);
            self.set_error_message("");
        }
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.password, value.into()) {
            self.notifier.notify(LoginProperty::Password);
            self.set_error_message("");
        }
    }

    /// Flips between login and registration and clears the form.
    pub fn switch_mode(&mut self) {
        self.is_login_mode = !self.is_login_mode;
        self.notifier.notify(LoginProperty::IsLoginMode);
        self.set_username("");
        self.set_password("");
        self.set_error_message("");
    }

    pub fn can_login(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.trim().is_empty() && !self.is_busy
    }

    pub fn can_register(&self) -> bool {
        self.can_login()
    }

    pub fn login_command() -> LoginCommand<'conn> {
        Command::new("login", Self::can_login, Self::login)
    }

    pub fn register_command() -> LoginCommand<'conn> {
        Command::new("register", Self::can_register, Self::register)
    }

    /// Attempts login; sets the inline error on mismatch.
    pub fn login(&mut self) -> ViewModelResult<Option<User>> {
        self.set_error_message("");
        self.set_busy(true);
        let result = self.auth.login(&self.username, &self.password);
        self.set_busy(false);

        match result? {
            Some(user) => {
                self.set_authenticated(user.clone());
                Ok(Some(user))
            }
            None => {
                self.set_error_message(INVALID_CREDENTIALS_MESSAGE);
                Ok(None)
            }
        }
    }

    /// Attempts registration; sets inline errors for short or taken input.
    pub fn register(&mut self) -> ViewModelResult<Option<User>> {
        self.set_error_message("");
        if self.username.chars().count() < MIN_CREDENTIAL_CHARS {
            self.set_error_message(USERNAME_TOO_SHORT_MESSAGE);
            return Ok(None);
        }
        if self.password.chars().count() < MIN_CREDENTIAL_CHARS {
            self.set_error_message(PASSWORD_TOO_SHORT_MESSAGE);
            return Ok(None);
        }

        self.set_busy(true);
        let result = self.auth.register(&self.username, &self.password);
        self.set_busy(false);

        match result {
            Ok(user) => {
                self.set_authenticated(user.clone());
                Ok(Some(user))
            }
            Err(AuthServiceError::UsernameTaken(_)) => {
                self.set_error_message(USERNAME_TAKEN_MESSAGE);
                Ok(None)
            }
            Err(AuthServiceError::BlankCredentials) => {
                self.set_error_message(INVALID_CREDENTIALS_MESSAGE);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn set_authenticated(&mut self, user: User) {
        if replace_if_changed(&mut self.authenticated_user, Some(user)) {
            self.notifier.notify(LoginProperty::AuthenticatedUser);
        }
    }

    fn set_error_message(&mut self, message: &str) {
        if self.error_message != message {
            self.error_message = message.to_string();
            self.notifier.notify(LoginProperty::ErrorMessage);
        }
    }

    fn set_busy(&mut self, value: bool) {
        if replace_if_changed(&mut self.is_busy, value) {
            self.notifier.notify(LoginProperty::IsBusy);
        }
    }
}

impl Observable for LoginViewModel<'_> {
    type Property = LoginProperty;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<LoginProperty> {
        &mut self.notifier
    }
}
