//! Main window coordinator.
//!
//! # Responsibility
//! - Own every child view-model for one signed-in user.
//! - Cascade selection: workspace -> page list -> editor.
//! - Route [`EditorEvent`] and [`TrashEvent`] values back into the lists.
//!
//! # Invariants
//! - Selection changes go through this type; calling `select` on a child
//!   directly skips the cascade.
//! - Children share one borrowed connection and never call each other.

use crate::model::page::PageId;
use crate::model::user::User;
use crate::model::workspace::WorkspaceId;
use crate::repo::page_repo::PageRecord;
use crate::service::SqlitePageService;
use crate::settings::{AppSettings, Theme};
use crate::viewmodel::editor::{EditorEvent, EditorViewModel};
use crate::viewmodel::page_list::PageListViewModel;
use crate::viewmodel::settings::SettingsViewModel;
use crate::viewmodel::sidebar::{SidebarContent, SidebarViewModel};
use crate::viewmodel::tag_management::TagManagementViewModel;
use crate::viewmodel::trash::{TrashEvent, TrashViewModel};
use crate::viewmodel::user_profile::UserProfileViewModel;
use crate::viewmodel::workspace_list::WorkspaceListViewModel;
use crate::viewmodel::ViewModelResult;
use log::{debug, info};
use rusqlite::Connection;
use std::path::PathBuf;

pub struct MainViewModel<'conn> {
    user: User,
    pages: SqlitePageService<'conn>,
    workspace_list: WorkspaceListViewModel<'conn>,
    page_list: PageListViewModel<'conn>,
    editor: EditorViewModel<'conn>,
    sidebar: SidebarViewModel<'conn>,
    settings: SettingsViewModel,
    trash: TrashViewModel<'conn>,
    tag_management: TagManagementViewModel<'conn>,
    user_profile: UserProfileViewModel<'conn>,
}

impl<'conn> MainViewModel<'conn> {
    /// Builds the window for `user`, loads workspaces and selects the first.
    pub fn new(
        conn: &'conn Connection,
        user: User,
        settings: AppSettings,
        settings_path: Option<PathBuf>,
    ) -> ViewModelResult<Self> {
        let user_uuid = user.uuid;
        let mut main = Self {
            pages: SqlitePageService::from_connection(conn)?,
            workspace_list: WorkspaceListViewModel::new(conn, user_uuid)?,
            page_list: PageListViewModel::new(conn)?,
            editor: EditorViewModel::new(conn)?,
            sidebar: SidebarViewModel::new(conn, user_uuid)?,
            settings: SettingsViewModel::new(settings, settings_path),
            trash: TrashViewModel::new(conn, user_uuid)?,
            tag_management: TagManagementViewModel::new(conn)?,
            user_profile: UserProfileViewModel::new(conn, user_uuid)?,
            user,
        };

        main.sidebar.refresh()?;
        main.workspace_list.refresh()?;
        main.editor.refresh_available_tags()?;
        let first = main.workspace_list.workspaces().first().map(|item| item.id());
        main.select_workspace(first)?;
        info!(
            "event=main_window_ready module=viewmodel status=ok user_id={} workspaces={}",
            main.user.uuid,
            main.workspace_list.workspaces().len()
        );
        Ok(main)
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn workspace_list(&self) -> &WorkspaceListViewModel<'conn> {
        &self.workspace_list
    }

    /// Mutable access for search text and inline rename buffers.
    pub fn workspace_list_mut(&mut self) -> &mut WorkspaceListViewModel<'conn> {
        &mut self.workspace_list
    }

    pub fn page_list(&self) -> &PageListViewModel<'conn> {
        &self.page_list
    }

    /// Mutable access for search text and inline rename buffers.
    pub fn page_list_mut(&mut self) -> &mut PageListViewModel<'conn> {
        &mut self.page_list
    }

    pub fn editor(&self) -> &EditorViewModel<'conn> {
        &self.editor
    }

    /// Mutable access for buffer edits and tag picking.
    pub fn editor_mut(&mut self) -> &mut EditorViewModel<'conn> {
        &mut self.editor
    }

    pub fn sidebar(&self) -> &SidebarViewModel<'conn> {
        &self.sidebar
    }

    pub fn sidebar_mut(&mut self) -> &mut SidebarViewModel<'conn> {
        &mut self.sidebar
    }

    pub fn settings(&self) -> &SettingsViewModel {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsViewModel {
        &mut self.settings
    }

    pub fn trash(&self) -> &TrashViewModel<'conn> {
        &self.trash
    }

    pub fn trash_mut(&mut self) -> &mut TrashViewModel<'conn> {
        &mut self.trash
    }

    pub fn tag_management(&self) -> &TagManagementViewModel<'conn> {
        &self.tag_management
    }

    pub fn tag_management_mut(&mut self) -> &mut TagManagementViewModel<'conn> {
        &mut self.tag_management
    }

    pub fn user_profile(&self) -> &UserProfileViewModel<'conn> {
        &self.user_profile
    }

    pub fn user_profile_mut(&mut self) -> &mut UserProfileViewModel<'conn> {
        &mut self.user_profile
    }

    pub fn selected_workspace(&self) -> Option<WorkspaceId> {
        self.workspace_list.selected()
    }

    pub fn selected_page(&self) -> Option<PageId> {
        self.page_list.selected()
    }

    /// Selects a workspace and cascades to the page list and editor.
    pub fn select_workspace(&mut self, id: Option<WorkspaceId>) -> ViewModelResult<()> {
        self.workspace_list.select(id);
        self.on_workspace_selected()
    }

    /// Selects a page and loads it into the editor; `None` clears the editor.
    pub fn select_page(&mut self, id: Option<PageId>) -> ViewModelResult<()> {
        self.page_list.select(id);
        let record = match self.page_list.selected() {
            Some(id) => self.pages.get_page(id)?,
            None => None,
        };
        self.editor.load_page(record)
    }

    pub fn add_workspace(&mut self) -> ViewModelResult<Option<WorkspaceId>> {
        let created = WorkspaceListViewModel::add_command().execute(&mut self.workspace_list)?;
        if created.is_some() {
            self.on_workspace_selected()?;
        }
        Ok(created)
    }

    pub fn commit_workspace_rename(&mut self, id: WorkspaceId) -> ViewModelResult<()> {
        self.workspace_list.commit_rename(id)
    }

    /// Soft-deletes the selected workspace; its pages leave the view with it.
    pub fn delete_selected_workspace(&mut self) -> ViewModelResult<Option<WorkspaceId>> {
        let deleted = WorkspaceListViewModel::delete_command()
            .execute(&mut self.workspace_list)?
            .flatten();
        if deleted.is_some() {
            self.on_workspace_selected()?;
        }
        Ok(deleted)
    }

    /// Adds an untitled page to the selected workspace and opens it.
    pub fn add_page(&mut self) -> ViewModelResult<Option<PageId>> {
        let Some(record) = PageListViewModel::add_command()
            .execute(&mut self.page_list)?
            .flatten()
        else {
            return Ok(None);
        };
        let id = record.page.uuid;
        self.editor.load_page(Some(record))?;
        self.workspace_list.refresh()?;
        Ok(Some(id))
    }

    pub fn commit_page_rename(&mut self, id: PageId) -> ViewModelResult<()> {
        let Some(record) = self.page_list.commit_rename(id)? else {
            return Ok(());
        };
        if self.editor.current_page_id() == Some(id) && !self.editor.is_dirty() {
            self.editor.load_page(Some(record))?;
        }
        Ok(())
    }

    /// Soft-deletes the page selected in the list.
    pub fn delete_selected_page(&mut self) -> ViewModelResult<Option<PageId>> {
        let deleted = PageListViewModel::delete_command()
            .execute(&mut self.page_list)?
            .flatten();
        if let Some(id) = deleted {
            if self.editor.current_page_id() == Some(id) {
                self.editor.clear()?;
            }
            self.workspace_list.refresh()?;
        }
        Ok(deleted)
    }

    pub fn save_page(&mut self) -> ViewModelResult<Option<EditorEvent>> {
        let event = EditorViewModel::save_command()
            .execute(&mut self.editor)?
            .flatten();
        self.route_editor_event(event.as_ref())?;
        Ok(event)
    }

    pub fn toggle_pin(&mut self) -> ViewModelResult<Option<EditorEvent>> {
        let event = EditorViewModel::pin_command()
            .execute(&mut self.editor)?
            .flatten();
        self.route_editor_event(event.as_ref())?;
        Ok(event)
    }

    pub fn delete_page(&mut self) -> ViewModelResult<Option<EditorEvent>> {
        let event = EditorViewModel::delete_command()
            .execute(&mut self.editor)?
            .flatten();
        self.route_editor_event(event.as_ref())?;
        Ok(event)
    }

    /// Opens or closes a sidebar panel, refreshing the panel being opened.
    pub fn show_panel(&mut self, panel: SidebarContent) -> ViewModelResult<SidebarContent> {
        let shown = self.sidebar.show(panel);
        match shown {
            SidebarContent::Trash => self.trash.refresh()?,
            SidebarContent::TagManagement => self.tag_management.refresh()?,
            SidebarContent::UserProfile => self.user_profile.refresh()?,
            SidebarContent::Settings | SidebarContent::None => {}
        }
        Ok(shown)
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar.toggle_sidebar();
    }

    pub fn toggle_theme(&mut self) -> ViewModelResult<Theme> {
        self.settings.toggle_theme()
    }

    pub fn restore_trash_item(&mut self) -> ViewModelResult<Option<TrashEvent>> {
        let event = TrashViewModel::restore_command()
            .execute(&mut self.trash)?
            .flatten();
        self.route_trash_event(event)?;
        Ok(event)
    }

    pub fn hard_delete_trash_item(&mut self) -> ViewModelResult<Option<TrashEvent>> {
        let event = TrashViewModel::hard_delete_command()
            .execute(&mut self.trash)?
            .flatten();
        self.route_trash_event(event)?;
        Ok(event)
    }

    pub fn add_tag(&mut self) -> ViewModelResult<()> {
        TagManagementViewModel::add_command().execute(&mut self.tag_management)?;
        self.editor.refresh_available_tags()
    }

    pub fn rename_selected_tag(&mut self, name: &str) -> ViewModelResult<()> {
        self.tag_management.rename_selected(name)?;
        self.after_tag_change()
    }

    pub fn delete_selected_tag(&mut self) -> ViewModelResult<()> {
        TagManagementViewModel::delete_command().execute(&mut self.tag_management)?;
        self.after_tag_change()
    }

    fn on_workspace_selected(&mut self) -> ViewModelResult<()> {
        let workspace = self.workspace_list.selected();
        debug!(
            "event=workspace_selected module=viewmodel status=ok workspace_id={}",
            workspace.map(|id| id.to_string()).unwrap_or_else(|| "none".to_string())
        );
        self.page_list.set_workspace(workspace)?;
        self.editor.clear()?;
        self.editor.set_current_workspace(workspace);
        Ok(())
    }

    fn route_editor_event(&mut self, event: Option<&EditorEvent>) -> ViewModelResult<()> {
        match event {
            Some(EditorEvent::PageSaved(record)) => self.on_page_saved(record),
            Some(EditorEvent::PageDeleted { page_id, .. }) => {
                self.page_list.remove_page(*page_id);
                self.page_list.select(None);
                self.workspace_list.refresh()
            }
            None => Ok(()),
        }
    }

    fn on_page_saved(&mut self, record: &PageRecord) -> ViewModelResult<()> {
        self.page_list.apply_page_update(record)?;
        self.page_list.select(Some(record.page.uuid));
        self.workspace_list.refresh()
    }

    fn route_trash_event(&mut self, event: Option<TrashEvent>) -> ViewModelResult<()> {
        let Some(event) = event else {
            return Ok(());
        };
        self.workspace_list.refresh()?;
        if let TrashEvent::Restored(restored) = event {
            if self.workspace_list.selected() == Some(restored.workspace_uuid) {
                self.page_list.refresh()?;
            }
        }
        Ok(())
    }

    fn after_tag_change(&mut self) -> ViewModelResult<()> {
        self.page_list.refresh()?;
        if let Some(id) = self.editor.current_page_id() {
            if !self.editor.is_dirty() {
                let record = self.pages.get_page(id)?;
                self.editor.load_page(record)?;
                return Ok(());
            }
        }
        self.editor.refresh_available_tags()
    }
}
