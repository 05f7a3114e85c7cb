//! Tag management panel state.

use crate::model::page::Page;
use crate::model::tag::TagId;
use crate::model::TAG_NAME_MAX_CHARS;
use crate::repo::tag_repo::TagRecord;
use crate::repo::RepoResult;
use crate::service::tag_service::TagServiceError;
use crate::service::SqliteTagService;
use crate::viewmodel::command::Command;
use crate::viewmodel::observable::{replace_if_changed, Observable, PropertyNotifier};
use crate::viewmodel::{ViewModelError, ViewModelResult};
use rusqlite::Connection;

pub const EMPTY_TAG_NAME_MESSAGE: &str = "Tag name cannot be empty";
pub const TAG_NAME_TOO_LONG_MESSAGE: &str = "Tag name cannot exceed 50 characters";
pub const TAG_DELETED_MESSAGE: &str = "Tag has been deleted successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagManagementProperty {
    Tags,
    SearchText,
    NewTagName,
    Selected,
    ErrorMessage,
    SuccessMessage,
}

pub type TagManagementCommand<'conn> = Command<TagManagementViewModel<'conn>, (), ViewModelError>;

pub struct TagManagementViewModel<'conn> {
    service: SqliteTagService<'conn>,
    tags: Vec<TagRecord>,
    search_text: String,
    new_tag_name: String,
    selected: Option<TagId>,
    error_message: String,
    success_message: String,
    notifier: PropertyNotifier<TagManagementProperty>,
}

impl<'conn> TagManagementViewModel<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            service: SqliteTagService::from_connection(conn)?,
            tags: Vec::new(),
            search_text: String::new(),
            new_tag_name: String::new(),
            selected: None,
            error_message: String::new(),
            success_message: String::new(),
            notifier: PropertyNotifier::new(),
        })
    }

    pub fn tags(&self) -> &[TagRecord] {
        &self.tags
    }

    /// Tags whose name contains the search text, ignoring case.
    pub fn filtered_tags(&self) -> Vec<&TagRecord> {
        let needle = self.search_text.trim().to_lowercase();
        self.tags
            .iter()
            .filter(|record| needle.is_empty() || record.tag.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn new_tag_name(&self) -> &str {
        &self.new_tag_name
    }

    pub fn selected(&self) -> Option<TagId> {
        self.selected
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn success_message(&self) -> &str {
        &self.success_message
    }

    pub fn set_search_text(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.search_text, value.into()) {
            self.notifier.notify(TagManagementProperty::SearchText);
        }
    }

    pub fn set_new_tag_name(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.new_tag_name, value.into()) {
            self.notifier.notify(TagManagementProperty::NewTagName);
            self.set_messages("", "");
        }
    }

    pub fn select(&mut self, id: Option<TagId>) -> bool {
        let id = id.filter(|id| self.tags.iter().any(|record| record.tag.id == *id));
        let changed = replace_if_changed(&mut self.selected, id);
        if changed {
            self.notifier.notify(TagManagementProperty::Selected);
        }
        changed
    }

    pub fn refresh(&mut self) -> ViewModelResult<()> {
        let tags = self.service.list_tags()?;
        if replace_if_changed(&mut self.tags, tags) {
            self.notifier.notify(TagManagementProperty::Tags);
        }
        if let Some(selected) = self.selected {
            if !self.tags.iter().any(|record| record.tag.id == selected) {
                self.select(None);
            }
        }
        Ok(())
    }

    pub fn can_add(&self) -> bool {
        !self.new_tag_name.trim().is_empty()
    }

    pub fn can_modify(&self) -> bool {
        self.selected.is_some()
    }

    pub fn add_command() -> TagManagementCommand<'conn> {
        Command::new("add_tag", Self::can_add, Self::add_tag)
    }

    pub fn delete_command() -> TagManagementCommand<'conn> {
        Command::new("delete_tag", Self::can_modify, Self::delete_selected)
    }

    /// Creates the tag named by the input.
    pub fn add_tag(&mut self) -> ViewModelResult<()> {
        let name = self.new_tag_name.trim().to_string();
        if let Some(message) = name_problem(&name) {
            self.set_messages(message, "");
            return Ok(());
        }

        let tag = match self.service.create_tag(&name) {
            Ok(tag) => tag,
            Err(TagServiceError::InvalidName(err)) => {
                self.set_messages(&err.to_string(), "");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        self.new_tag_name.clear();
        self.notifier.notify(TagManagementProperty::NewTagName);
        self.refresh()?;
        self.set_messages(
            "",
            &format!("Tag '{}' has been created successfully!", tag.name),
        );
        Ok(())
    }

    /// Deletes the selected tag and unlinks it from every page.
    pub fn delete_selected(&mut self) -> ViewModelResult<()> {
        let Some(id) = self.selected else {
            return Ok(());
        };
        self.service.delete_tag(id)?;
        self.select(None);
        self.refresh()?;
        self.set_messages("", TAG_DELETED_MESSAGE);
        Ok(())
    }

    /// Renames the selected tag; name clashes become an inline error.
    pub fn rename_selected(&mut self, name: &str) -> ViewModelResult<()> {
        let Some(id) = self.selected else {
            return Ok(());
        };
        let name = name.trim();
        if let Some(message) = name_problem(name) {
            self.set_messages(message, "");
            return Ok(());
        }

        match self.service.rename_tag(id, name) {
            Ok(_) => {}
            Err(TagServiceError::DuplicateName(name)) => {
                self.set_messages(&format!("Tag '{name}' already exists"), "");
                return Ok(());
            }
            Err(TagServiceError::InvalidName(err)) => {
                self.set_messages(&err.to_string(), "");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
        self.refresh()?;
        self.set_messages("", "");
        Ok(())
    }

    /// Visible pages carrying the selected tag.
    pub fn pages_for_selected(&self) -> ViewModelResult<Vec<Page>> {
        match self.selected {
            Some(id) => Ok(self.service.pages_for_tag(id)?),
            None => Ok(Vec::new()),
        }
    }

    fn set_messages(&mut self, error: &str, success: &str) {
        if self.error_message != error {
            self.error_message = error.to_string();
            self.notifier.notify(TagManagementProperty::ErrorMessage);
        }
        if self.success_message != success {
            self.success_message = success.to_string();
            self.notifier.notify(TagManagementProperty::SuccessMessage);
        }
    }
}

fn name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some(EMPTY_TAG_NAME_MESSAGE)
    } else if name.chars().count() > TAG_NAME_MAX_CHARS {
        Some(TAG_NAME_TOO_LONG_MESSAGE)
    } else {
        None
    }
}

impl Observable for TagManagementViewModel<'_> {
    type Property = TagManagementProperty;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<TagManagementProperty> {
        &mut self.notifier
    }
}
