//! Workspace list panel state.
//!
//! Selection changes made here must be routed through the coordinator so
//! the page list and editor follow.

use crate::model::user::UserId;
use crate::model::workspace::{Workspace, WorkspaceId, DEFAULT_WORKSPACE_NAME};
use crate::repo::workspace_repo::WorkspaceRecord;
use crate::repo::RepoResult;
use crate::service::workspace_service::WorkspaceServiceError;
use crate::service::SqliteWorkspaceService;
use crate::viewmodel::command::Command;
use crate::viewmodel::observable::{replace_if_changed, Observable, PropertyNotifier};
use crate::viewmodel::{ViewModelError, ViewModelResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceListProperty {
    Workspaces,
    SearchText,
    Selected,
    IsBusy,
    EditingWorkspace,
}

/// One row of the workspace list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceItem {
    pub workspace: Workspace,
    pub page_count: u32,
    /// Inline-edit buffer; equals the persisted name when not editing.
    pub edit_name: String,
    pub is_editing: bool,
}

impl WorkspaceItem {
    fn from_record(record: WorkspaceRecord) -> Self {
        Self {
            edit_name: record.workspace.name.clone(),
            workspace: record.workspace,
            page_count: record.active_page_count,
            is_editing: false,
        }
    }

    pub fn id(&self) -> WorkspaceId {
        self.workspace.uuid
    }
}

pub type WorkspaceListCommand<'conn, T> = Command<WorkspaceListViewModel<'conn>, T, ViewModelError>;

pub struct WorkspaceListViewModel<'conn> {
    service: SqliteWorkspaceService<'conn>,
    user_uuid: UserId,
    workspaces: Vec<WorkspaceItem>,
    search_text: String,
    selected: Option<WorkspaceId>,
    is_busy: bool,
    notifier: PropertyNotifier<WorkspaceListProperty>,
}

impl<'conn> WorkspaceListViewModel<'conn> {
    pub fn new(conn: &'conn Connection, user_uuid: UserId) -> RepoResult<Self> {
        Ok(Self {
            service: SqliteWorkspaceService::from_connection(conn)?,
            user_uuid,
            workspaces: Vec::new(),
            search_text: String::new(),
            selected: None,
            is_busy: false,
            notifier: PropertyNotifier::new(),
        })
    }

    pub fn workspaces(&self) -> &[WorkspaceItem] {
        &self.workspaces
    }

    /// Workspaces whose name contains the search text, ignoring case.
    pub fn filtered_workspaces(&self) -> Vec<&WorkspaceItem> {
        let needle = self.search_text.trim().to_lowercase();
        self.workspaces
            .iter()
            .filter(|item| needle.is_empty() || item.workspace.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_workspaces().is_empty()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selected(&self) -> Option<WorkspaceId> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&WorkspaceItem> {
        self.selected.and_then(|id| self.item(id))
    }

    pub fn item(&self, id: WorkspaceId) -> Option<&WorkspaceItem> {
        self.workspaces.iter().find(|item| item.id() == id)
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn set_search_text(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.search_text, value.into()) {
            self.notifier.notify(WorkspaceListProperty::SearchText);
        }
    }

    /// Sets the selection; returns whether it changed.
    pub fn select(&mut self, id: Option<WorkspaceId>) -> bool {
        let id = id.filter(|id| self.item(*id).is_some());
        let changed = replace_if_changed(&mut self.selected, id);
        if changed {
            self.notifier.notify(WorkspaceListProperty::Selected);
        }
        changed
    }

    /// Reloads rows and page counts; keeps the selection when it still exists.
    pub fn refresh(&mut self) -> ViewModelResult<()> {
        self.set_busy(true);
        let result = self.service.list_workspaces(self.user_uuid);
        self.set_busy(false);

        self.workspaces = result?.into_iter().map(WorkspaceItem::from_record).collect();
        self.notifier.notify(WorkspaceListProperty::Workspaces);
        if let Some(selected) = self.selected {
            if self.item(selected).is_none() {
                self.select(None);
            }
        }
        Ok(())
    }

    pub fn can_add(&self) -> bool {
        !self.is_busy
    }

    pub fn can_delete(&self) -> bool {
        self.selected.is_some() && !self.is_busy
    }

    pub fn can_rename(&self) -> bool {
        self.can_delete()
    }

    pub fn add_command() -> WorkspaceListCommand<'conn, WorkspaceId> {
        Command::new("add_workspace", Self::can_add, Self::add_workspace)
    }

    pub fn delete_command() -> WorkspaceListCommand<'conn, Option<WorkspaceId>> {
        Command::new("delete_workspace", Self::can_delete, Self::delete_selected)
    }

    pub fn rename_command() -> WorkspaceListCommand<'conn, ()> {
        Command::new("rename_workspace", Self::can_rename, Self::begin_rename_selected)
    }

    pub fn refresh_command() -> WorkspaceListCommand<'conn, ()> {
        Command::always("refresh_workspaces", Self::refresh)
    }

    /// Creates "New Workspace" at the top, selects it and opens inline rename.
    pub fn add_workspace(&mut self) -> ViewModelResult<WorkspaceId> {
        self.set_busy(true);
        let result = self
            .service
            .create_workspace(self.user_uuid, DEFAULT_WORKSPACE_NAME);
        self.set_busy(false);

        let mut item = WorkspaceItem::from_record(result?);
        item.is_editing = true;
        let id = item.id();
        self.workspaces.insert(0, item);
        self.notifier.notify(WorkspaceListProperty::Workspaces);
        self.select(Some(id));
        self.notifier.notify(WorkspaceListProperty::EditingWorkspace);
        Ok(id)
    }

    /// Soft-deletes the selected workspace and clears the selection.
    pub fn delete_selected(&mut self) -> ViewModelResult<Option<WorkspaceId>> {
        let Some(id) = self.selected else {
            return Ok(None);
        };
        self.set_busy(true);
        let result = self.service.soft_delete_workspace(id);
        self.set_busy(false);
        result?;

        self.workspaces.retain(|item| item.id() != id);
        self.notifier.notify(WorkspaceListProperty::Workspaces);
        self.select(None);
        Ok(Some(id))
    }

    fn begin_rename_selected(&mut self) -> ViewModelResult<()> {
        if let Some(id) = self.selected {
            self.begin_rename(id);
        }
        Ok(())
    }

    pub fn begin_rename(&mut self, id: WorkspaceId) {
        if let Some(item) = self.workspaces.iter_mut().find(|item| item.id() == id) {
            if !item.is_editing {
                item.is_editing = true;
                self.notifier.notify(WorkspaceListProperty::EditingWorkspace);
            }
        }
    }

    pub fn set_edit_name(&mut self, id: WorkspaceId, name: impl Into<String>) {
        if let Some(item) = self.workspaces.iter_mut().find(|item| item.id() == id) {
            if replace_if_changed(&mut item.edit_name, name.into()) {
                self.notifier.notify(WorkspaceListProperty::EditingWorkspace);
            }
        }
    }

    /// Ends inline rename and persists a changed name.
    ///
    /// An invalid name reverts the buffer to the stored name.
    pub fn commit_rename(&mut self, id: WorkspaceId) -> ViewModelResult<()> {
        let Some(index) = self.workspaces.iter().position(|item| item.id() == id) else {
            return Ok(());
        };
        let item = &mut self.workspaces[index];
        item.is_editing = false;
        if item.edit_name == item.workspace.name {
            self.notifier.notify(WorkspaceListProperty::EditingWorkspace);
            return Ok(());
        }

        match self.service.rename_workspace(id, &item.edit_name) {
            Ok(record) => {
                let item = &mut self.workspaces[index];
                item.workspace = record.workspace;
                item.edit_name = item.workspace.name.clone();
                item.page_count = record.active_page_count;
            }
            Err(WorkspaceServiceError::InvalidName(_)) => {
                let item = &mut self.workspaces[index];
                item.edit_name = item.workspace.name.clone();
            }
            Err(err) => return Err(err.into()),
        }
        self.notifier.notify(WorkspaceListProperty::EditingWorkspace);
        self.notifier.notify(WorkspaceListProperty::Workspaces);
        Ok(())
    }

    fn set_busy(&mut self, value: bool) {
        if replace_if_changed(&mut self.is_busy, value) {
            self.notifier.notify(WorkspaceListProperty::IsBusy);
        }
    }
}

impl Observable for WorkspaceListViewModel<'_> {
    type Property = WorkspaceListProperty;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<WorkspaceListProperty> {
        &mut self.notifier
    }
}
