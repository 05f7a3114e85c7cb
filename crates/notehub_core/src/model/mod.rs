//! Domain model for users, workspaces, pages and tags.
//!
//! # Responsibility
//! - Define canonical records shared by repositories, services and view-models.
//! - Provide validation and soft-delete lifecycle helpers.
//!
//! # Invariants
//! - Users, workspaces and pages are identified by stable UUIDs; tags by
//!   integer ids.
//! - `is_active == false` is the soft-delete marker for workspaces and pages.
//! - Timestamps are Unix epoch milliseconds.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod page;
pub mod tag;
pub mod user;
pub mod workspace;

/// Maximum username length accepted by storage.
pub const USERNAME_MAX_CHARS: usize = 100;
/// Maximum workspace name length accepted by storage.
pub const WORKSPACE_NAME_MAX_CHARS: usize = 100;
/// Maximum page title length accepted by storage.
pub const PAGE_TITLE_MAX_CHARS: usize = 200;
/// Maximum tag name length accepted by storage.
pub const TAG_NAME_MAX_CHARS: usize = 50;

/// Field-level validation failure for domain records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trimming.
    BlankField(&'static str),
    /// Text field exceeds its storage limit.
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} cannot be empty"),
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} cannot exceed {max_chars} characters (got {actual_chars})"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Returns current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_text, ValidationError};

    #[test]
    fn require_text_rejects_blank_and_over_long_values() {
        assert_eq!(
            require_text("name", "   ", 10),
            Err(ValidationError::BlankField("name"))
        );
        assert!(matches!(
            require_text("name", "abcdefghijk", 10),
            Err(ValidationError::TooLong { actual_chars: 11, .. })
        ));
        assert!(require_text("name", "ok", 10).is_ok());
    }
}
