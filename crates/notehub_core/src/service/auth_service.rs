//! Local account use-case service.
//!
//! # Responsibility
//! - Log in, register and change passwords for local accounts.
//!
//! # Invariants
//! - Blank credentials never match and are never stored.
//! - Usernames are unique by exact match; duplicates create no row.
//! - Passwords are compared and stored as plain text.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::SqliteAuthService;
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from account operations.
#[derive(Debug)]
pub enum AuthServiceError {
    /// Username or password is blank.
    BlankCredentials,
    /// Another account already uses this username.
    UsernameTaken(String),
    /// Old password did not match the stored one.
    IncorrectPassword,
    UserNotFound(UserId),
    Repo(RepoError),
}

impl Display for AuthServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankCredentials => write!(f, "username and password must not be blank"),
            Self::UsernameTaken(username) => write!(f, "username already exists: `{username}`"),
            Self::IncorrectPassword => write!(f, "old password is incorrect"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Account service facade.
pub struct AuthService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the active user matching both credentials.
    ///
    /// Blank input yields `Ok(None)` without touching storage.
    pub fn login(&self, username: &str, password: &str) -> Result<Option<User>, AuthServiceError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Ok(None);
        }
        let user = self.repo.find_active_by_credentials(username, password)?;
        match &user {
            Some(user) => info!(
                "event=auth_login module=service status=ok user_id={}",
                user.uuid
            ),
            None => info!("event=auth_login module=service status=rejected"),
        }
        Ok(user)
    }

    /// Creates a new account.
    ///
    /// # Errors
    /// - `BlankCredentials` when either value is blank.
    /// - `UsernameTaken` when the exact username already exists.
    pub fn register(&self, username: &str, password: &str) -> Result<User, AuthServiceError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(AuthServiceError::BlankCredentials);
        }
        if self.username_exists(username)? {
            return Err(AuthServiceError::UsernameTaken(username.to_string()));
        }

        let user = User::new(username, password);
        self.repo.create_user(&user)?;
        info!(
            "event=auth_register module=service status=ok user_id={}",
            user.uuid
        );
        Ok(user)
    }

    pub fn username_exists(&self, username: &str) -> RepoResult<bool> {
        Ok(self.repo.find_by_username(username)?.is_some())
    }

    /// Replaces the password after checking the old one.
    pub fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthServiceError> {
        if old_password.trim().is_empty() || new_password.trim().is_empty() {
            return Err(AuthServiceError::BlankCredentials);
        }
        let user = self
            .repo
            .get_user(user_id)?
            .ok_or(AuthServiceError::UserNotFound(user_id))?;
        if user.password != old_password {
            return Err(AuthServiceError::IncorrectPassword);
        }

        self.repo.update_password(user_id, new_password)?;
        info!("event=auth_change_password module=service status=ok user_id={user_id}");
        Ok(())
    }

    /// Loads one user for display.
    pub fn get_user(&self, user_id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(user_id)
    }
}

impl<'conn> SqliteAuthService<'conn> {
    /// Builds the service over a migrated connection.
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(SqliteUserRepository::try_new(conn)?))
    }
}
