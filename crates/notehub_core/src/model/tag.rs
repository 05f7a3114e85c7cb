//! Tag model and name normalization.
//!
//! # Invariants
//! - Tag names are unique ignoring case.
//! - Stored names are trimmed and keep the casing of first creation.

use crate::model::{require_text, ValidationError, TAG_NAME_MAX_CHARS};
use serde::{Deserialize, Serialize};

pub type TagId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Trims and validates a user-entered tag name.
pub fn normalize_tag_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    require_text("tag name", trimmed, TAG_NAME_MAX_CHARS)?;
    Ok(trimmed.to_string())
}

/// Uniqueness key of a tag name: trimmed and lowercased over full Unicode.
pub fn tag_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-insensitive tag name comparison.
pub fn tag_names_equal(left: &str, right: &str) -> bool {
    tag_name_key(left) == tag_name_key(right)
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag_name, tag_name_key, tag_names_equal};

    #[test]
    fn normalize_trims_and_keeps_case() {
        assert_eq!(normalize_tag_name("  Work ").unwrap(), "Work");
        assert!(normalize_tag_name("   ").is_err());
        assert!(normalize_tag_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn names_compare_ignoring_case() {
        assert!(tag_names_equal("Rust", " rUST "));
        assert!(!tag_names_equal("Rust", "Rusty"));
        assert!(tag_names_equal("Été", "ÉTÉ"));
        assert_eq!(tag_name_key(" ÉTÉ "), "été");
    }
}
