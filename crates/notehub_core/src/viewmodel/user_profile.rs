//! User profile panel: username display and password change.

use crate::model::user::UserId;
use crate::repo::RepoResult;
use crate::service::auth_service::AuthServiceError;
use crate::service::SqliteAuthService;
use crate::viewmodel::command::Command;
use crate::viewmodel::login::MIN_CREDENTIAL_CHARS;
use crate::viewmodel::observable::{replace_if_changed, Observable, PropertyNotifier};
use crate::viewmodel::{ViewModelError, ViewModelResult};
use rusqlite::Connection;

pub const MISSING_OLD_PASSWORD_MESSAGE: &str = "Please enter your old password";
pub const MISSING_NEW_PASSWORD_MESSAGE: &str = "Please enter your new password";
pub const NEW_PASSWORD_TOO_SHORT_MESSAGE: &str = "New password must be at least 3 characters";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "New password and confirm password do not match";
pub const INCORRECT_OLD_PASSWORD_MESSAGE: &str = "Old password is incorrect";
pub const PASSWORD_CHANGED_MESSAGE: &str = "Password changed successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserProfileProperty {
    Username,
    OldPassword,
    NewPassword,
    ConfirmPassword,
    ErrorMessage,
    SuccessMessage,
}

pub struct UserProfileViewModel<'conn> {
    auth: SqliteAuthService<'conn>,
    user_uuid: UserId,
    username: String,
    old_password: String,
    new_password: String,
    confirm_password: String,
    error_message: String,
    success_message: String,
    notifier: PropertyNotifier<UserProfileProperty>,
}

impl<'conn> UserProfileViewModel<'conn> {
    pub fn new(conn: &'conn Connection, user_uuid: UserId) -> RepoResult<Self> {
        Ok(Self {
            auth: SqliteAuthService::from_connection(conn)?,
            user_uuid,
            username: String::new(),
            old_password: String::new(),
            new_password: String::new(),
            confirm_password: String::new(),
            error_message: String::new(),
            success_message: String::new(),
            notifier: PropertyNotifier::new(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn old_password(&self) -> &str {
        &self.old_password
    }

    pub fn new_password(&self) -> &str {
        &self.new_password
    }

    pub fn confirm_password(&self) -> &str {
        &self.confirm_password
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn success_message(&self) -> &str {
        &self.success_message
    }

    /// Reloads the username shown on the panel.
    pub fn refresh(&mut self) -> ViewModelResult<()> {
        let username = self
            .auth
            .get_user(self.user_uuid)?
            .map(|user| user.username)
            .unwrap_or_default();
        if replace_if_changed(&mut self.username, username) {
            self.notifier.notify(UserProfileProperty::Username);
        }
        Ok(())
    }

    pub fn set_old_password(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.old_password, value.into()) {
            self.notifier.notify(UserProfileProperty::OldPassword);
            self.set_messages("", "");
        }
    }

    pub fn set_new_password(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.new_password, value.into()) {
            self.notifier.notify(UserProfileProperty::NewPassword);
            self.set_messages("", "");
        }
    }

    pub fn set_confirm_password(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.confirm_password, value.into()) {
            self.notifier.notify(UserProfileProperty::ConfirmPassword);
            self.set_messages("", "");
        }
    }

    pub fn can_change_password(&self) -> bool {
        !self.old_password.is_empty()
            && !self.new_password.is_empty()
            && !self.confirm_password.is_empty()
    }

    pub fn change_password_command() -> Command<Self, bool, ViewModelError> {
        Command::new(
            "change_password",
            Self::can_change_password,
            Self::change_password,
        )
    }

    /// Validates the form and changes the password; returns whether it changed.
    pub fn change_password(&mut self) -> ViewModelResult<bool> {
        if let Some(message) = self.form_problem() {
            self.set_messages(message, "");
            return Ok(false);
        }

        match self
            .auth
            .change_password(self.user_uuid, &self.old_password, &self.new_password)
        {
            Ok(()) => {}
            Err(AuthServiceError::IncorrectPassword) => {
                self.set_messages(INCORRECT_OLD_PASSWORD_MESSAGE, "");
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        }

        self.set_old_password("");
        self.set_new_password("");
        self.set_confirm_password("");
        self.set_messages("", PASSWORD_CHANGED_MESSAGE);
        Ok(true)
    }

    fn form_problem(&self) -> Option<&'static str> {
        if self.old_password.trim().is_empty() {
            Some(MISSING_OLD_PASSWORD_MESSAGE)
        } else if self.new_password.trim().is_empty() {
            Some(MISSING_NEW_PASSWORD_MESSAGE)
        } else if self.new_password.chars().count() < MIN_CREDENTIAL_CHARS {
            Some(NEW_PASSWORD_TOO_SHORT_MESSAGE)
        } else if self.new_password != self.confirm_password {
            Some(PASSWORD_MISMATCH_MESSAGE)
        } else {
            None
        }
    }

    fn set_messages(&mut self, error: &str, success: &str) {
        if self.error_message != error {
            self.error_message = error.to_string();
            self.notifier.notify(UserProfileProperty::ErrorMessage);
        }
        if self.success_message != success {
            self.success_message = success.to_string();
            self.notifier.notify(UserProfileProperty::SuccessMessage);
        }
    }
}

impl Observable for UserProfileViewModel<'_> {
    type Property = UserProfileProperty;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<UserProfileProperty> {
        &mut self.notifier
    }
}
