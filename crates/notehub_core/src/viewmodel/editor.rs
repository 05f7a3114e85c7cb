//! Page editor state.
//!
//! # Responsibility
//! - Hold the title/body buffer and selected tags of the current page.
//! - Save, pin and delete through the page and tag services.
//!
//! # Invariants
//! - Commands report what happened as [`EditorEvent`] values; the
//!   coordinator applies them to the page and workspace lists.
//! - Pinning persists only the pin flag; unsaved buffer edits survive.

use crate::model::page::PageId;
use crate::model::tag::{tag_names_equal, Tag, TagId};
use crate::model::workspace::WorkspaceId;
use crate::repo::page_repo::PageRecord;
use crate::repo::RepoResult;
use crate::service::page_service::PageServiceError;
use crate::service::tag_service::TagServiceError;
use crate::service::{SqlitePageService, SqliteTagService};
use crate::viewmodel::command::Command;
use crate::viewmodel::observable::{replace_if_changed, Observable, PropertyNotifier};
use crate::viewmodel::{ViewModelError, ViewModelResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorProperty {
    Title,
    Content,
    IsDirty,
    IsEmpty,
    LastSavedAt,
    CurrentPage,
    CurrentWorkspace,
    SelectedTags,
    AvailableTags,
    NewTagInput,
    IsBusy,
    ErrorMessage,
}

/// Outcome of an editor command, routed by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Page was created, updated or (un)pinned.
    PageSaved(PageRecord),
    PageDeleted {
        page_id: PageId,
        workspace_uuid: WorkspaceId,
    },
}

pub type EditorCommand<'conn> = Command<EditorViewModel<'conn>, Option<EditorEvent>, ViewModelError>;

pub struct EditorViewModel<'conn> {
    pages: SqlitePageService<'conn>,
    tags: SqliteTagService<'conn>,
    title: String,
    content: String,
    is_dirty: bool,
    is_empty: bool,
    last_saved_at: Option<i64>,
    current_page: Option<PageRecord>,
    current_workspace: Option<WorkspaceId>,
    selected_tags: Vec<Tag>,
    available_tags: Vec<Tag>,
    new_tag_input: String,
    is_busy: bool,
    error_message: String,
    notifier: PropertyNotifier<EditorProperty>,
}

impl<'conn> EditorViewModel<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            pages: SqlitePageService::from_connection(conn)?,
            tags: SqliteTagService::from_connection(conn)?,
            title: String::new(),
            content: String::new(),
            is_dirty: false,
            is_empty: true,
            last_saved_at: None,
            current_page: None,
            current_workspace: None,
            selected_tags: Vec::new(),
            available_tags: Vec::new(),
            new_tag_input: String::new(),
            is_busy: false,
            error_message: String::new(),
            notifier: PropertyNotifier::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// `true` when both title and content are blank.
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn last_saved_at(&self) -> Option<i64> {
        self.last_saved_at
    }

    pub fn current_page(&self) -> Option<&PageRecord> {
        self.current_page.as_ref()
    }

    pub fn current_page_id(&self) -> Option<PageId> {
        self.current_page.as_ref().map(|record| record.page.uuid)
    }

    pub fn current_workspace(&self) -> Option<WorkspaceId> {
        self.current_workspace
    }

    pub fn selected_tags(&self) -> &[Tag] {
        &self.selected_tags
    }

    pub fn selected_tag_names(&self) -> Vec<String> {
        self.selected_tags.iter().map(|tag| tag.name.clone()).collect()
    }

    /// Known tags not currently selected, ordered by name.
    pub fn available_tags(&self) -> &[Tag] {
        &self.available_tags
    }

    pub fn new_tag_input(&self) -> &str {
        &self.new_tag_input
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.title, value.into()) {
            self.notifier.notify(EditorProperty::Title);
            self.mark_dirty();
        }
    }

    pub fn set_content(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.content, value.into()) {
            self.notifier.notify(EditorProperty::Content);
            self.mark_dirty();
        }
    }

    pub fn set_new_tag_input(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.new_tag_input, value.into()) {
            self.notifier.notify(EditorProperty::NewTagInput);
            self.set_error_message("");
        }
    }

    /// Workspace that receives pages saved without a loaded page.
    pub fn set_current_workspace(&mut self, workspace: Option<WorkspaceId>) {
        if replace_if_changed(&mut self.current_workspace, workspace) {
            self.notifier.notify(EditorProperty::CurrentWorkspace);
        }
    }

    /// Loads `record` into the buffer, or clears it for `None`.
    pub fn load_page(&mut self, record: Option<PageRecord>) -> ViewModelResult<()> {
        let (title, content, tags, saved_at) = match &record {
            Some(record) => (
                record.page.title.clone(),
                record.page.content.clone(),
                record.tags.clone(),
                Some(record.page.last_modified_at()),
            ),
            None => (String::new(), String::new(), Vec::new(), None),
        };
        if let Some(record) = &record {
            self.set_current_workspace(Some(record.page.workspace_uuid));
        }
        if replace_if_changed(&mut self.current_page, record) {
            self.notifier.notify(EditorProperty::CurrentPage);
        }
        if replace_if_changed(&mut self.title, title) {
            self.notifier.notify(EditorProperty::Title);
        }
        if replace_if_changed(&mut self.content, content) {
            self.notifier.notify(EditorProperty::Content);
        }
        if replace_if_changed(&mut self.selected_tags, tags) {
            self.notifier.notify(EditorProperty::SelectedTags);
        }
        if replace_if_changed(&mut self.last_saved_at, saved_at) {
            self.notifier.notify(EditorProperty::LastSavedAt);
        }
        self.set_new_tag_input("");
        self.set_error_message("");
        self.set_dirty(false);
        self.update_empty();
        self.refresh_available_tags()
    }

    /// Clears the buffer and the loaded page.
    pub fn clear(&mut self) -> ViewModelResult<()> {
        self.load_page(None)
    }

    /// Reloads the tag picker from storage.
    pub fn refresh_available_tags(&mut self) -> ViewModelResult<()> {
        let available: Vec<Tag> = self
            .tags
            .list_tags()?
            .into_iter()
            .map(|record| record.tag)
            .filter(|tag| !self.selected_tags.iter().any(|selected| selected.id == tag.id))
            .collect();
        if replace_if_changed(&mut self.available_tags, available) {
            self.notifier.notify(EditorProperty::AvailableTags);
        }
        Ok(())
    }

    pub fn can_save(&self) -> bool {
        !self.is_empty && !self.is_busy
    }

    pub fn can_pin(&self) -> bool {
        self.current_page.is_some() && !self.is_busy
    }

    pub fn can_delete(&self) -> bool {
        self.can_pin()
    }

    pub fn can_add_tag(&self) -> bool {
        !self.new_tag_input.trim().is_empty() && !self.is_busy
    }

    pub fn save_command() -> EditorCommand<'conn> {
        Command::new("save_page", Self::can_save, Self::save)
    }

    pub fn pin_command() -> EditorCommand<'conn> {
        Command::new("pin_page", Self::can_pin, Self::toggle_pin)
    }

    pub fn delete_command() -> EditorCommand<'conn> {
        Command::new("delete_page", Self::can_delete, Self::delete)
    }

    pub fn add_tag_command() -> Command<Self, (), ViewModelError> {
        Command::new("add_tag", Self::can_add_tag, Self::add_tag)
    }

    /// Persists the buffer and the selected tag set.
    ///
    /// Creates a page in the current workspace when none is loaded. Returns
    /// `None` when there is nowhere to save or the title is invalid.
    pub fn save(&mut self) -> ViewModelResult<Option<EditorEvent>> {
        self.set_error_message("");
        let page_id = match self.current_page_id() {
            Some(id) => Some(id),
            None if self.current_workspace.is_none() => return Ok(None),
            None => None,
        };

        self.set_busy(true);
        let result = self.persist(page_id);
        self.set_busy(false);

        let record = match result {
            Ok(record) => record,
            Err(ViewModelError::Page(PageServiceError::InvalidTitle(err))) => {
                self.set_error_message(&err.to_string());
                return Ok(None);
            }
            Err(ViewModelError::Tag(TagServiceError::InvalidName(err))) => {
                self.set_error_message(&err.to_string());
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        self.load_page(Some(record.clone()))?;
        Ok(Some(EditorEvent::PageSaved(record)))
    }

    fn persist(&self, page_id: Option<PageId>) -> ViewModelResult<PageRecord> {
        let page_id = match page_id {
            Some(id) => self.pages.update_page(id, &self.title, &self.content)?.page.uuid,
            None => {
                let workspace = self
                    .current_workspace
                    .ok_or(PageServiceError::InconsistentState("editor has no workspace"))?;
                self.pages
                    .create_page(workspace, &self.title, &self.content)?
                    .page
                    .uuid
            }
        };
        self.tags
            .reconcile_page_tags(page_id, &self.selected_tag_names())?;
        let record = self
            .pages
            .get_page(page_id)?
            .ok_or(PageServiceError::InconsistentState("saved page not found in read-back"))?;
        Ok(record)
    }

    /// Flips the pin flag of the loaded page.
    pub fn toggle_pin(&mut self) -> ViewModelResult<Option<EditorEvent>> {
        let Some(page_id) = self.current_page_id() else {
            return Ok(None);
        };
        self.set_busy(true);
        let result = self.pages.toggle_pin(page_id);
        self.set_busy(false);

        let record = result?;
        if replace_if_changed(&mut self.current_page, Some(record.clone())) {
            self.notifier.notify(EditorProperty::CurrentPage);
        }
        Ok(Some(EditorEvent::PageSaved(record)))
    }

    /// Soft-deletes the loaded page and clears the editor.
    pub fn delete(&mut self) -> ViewModelResult<Option<EditorEvent>> {
        let Some(record) = self.current_page.as_ref() else {
            return Ok(None);
        };
        let page_id = record.page.uuid;
        let workspace_uuid = record.page.workspace_uuid;

        self.set_busy(true);
        let result = self.pages.soft_delete_page(page_id);
        self.set_busy(false);
        result?;

        self.clear()?;
        Ok(Some(EditorEvent::PageDeleted {
            page_id,
            workspace_uuid,
        }))
    }

    /// Adds the tag named by the input to the selection, creating it if new.
    pub fn add_tag(&mut self) -> ViewModelResult<()> {
        let name = self.new_tag_input.trim().to_string();
        if name.is_empty() {
            return Ok(());
        }
        if self
            .selected_tags
            .iter()
            .any(|tag| tag_names_equal(&tag.name, &name))
        {
            self.set_new_tag_input("");
            return Ok(());
        }

        self.set_busy(true);
        let result = self.tags.create_tag(&name);
        self.set_busy(false);

        let tag = match result {
            Ok(tag) => tag,
            Err(TagServiceError::InvalidName(err)) => {
                self.set_error_message(&err.to_string());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        if !self.selected_tags.iter().any(|selected| selected.id == tag.id) {
            self.selected_tags.push(tag);
            self.notifier.notify(EditorProperty::SelectedTags);
            self.mark_dirty();
        }
        self.set_new_tag_input("");
        self.refresh_available_tags()
    }

    /// Adds an existing tag from the picker.
    pub fn select_tag(&mut self, tag: Tag) -> ViewModelResult<()> {
        if self.selected_tags.iter().any(|selected| selected.id == tag.id) {
            return Ok(());
        }
        self.selected_tags.push(tag);
        self.notifier.notify(EditorProperty::SelectedTags);
        self.mark_dirty();
        self.refresh_available_tags()
    }

    /// Drops a tag from the selection; persisted on the next save.
    pub fn remove_tag(&mut self, tag_id: TagId) -> ViewModelResult<()> {
        let before = self.selected_tags.len();
        self.selected_tags.retain(|tag| tag.id != tag_id);
        if self.selected_tags.len() == before {
            return Ok(());
        }
        self.notifier.notify(EditorProperty::SelectedTags);
        self.mark_dirty();
        self.refresh_available_tags()
    }

    fn mark_dirty(&mut self) {
        self.set_dirty(true);
        self.update_empty();
    }

    fn set_dirty(&mut self, value: bool) {
        if replace_if_changed(&mut self.is_dirty, value) {
            self.notifier.notify(EditorProperty::IsDirty);
        }
    }

    fn update_empty(&mut self) {
        let empty = self.title.trim().is_empty() && self.content.trim().is_empty();
        if replace_if_changed(&mut self.is_empty, empty) {
            self.notifier.notify(EditorProperty::IsEmpty);
        }
    }

    fn set_busy(&mut self, value: bool) {
        if replace_if_changed(&mut self.is_busy, value) {
            self.notifier.notify(EditorProperty::IsBusy);
        }
    }

    fn set_error_message(&mut self, message: &str) {
        if self.error_message != message {
            self.error_message = message.to_string();
            self.notifier.notify(EditorProperty::ErrorMessage);
        }
    }
}

impl Observable for EditorViewModel<'_> {
    type Property = EditorProperty;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<EditorProperty> {
        &mut self.notifier
    }
}
