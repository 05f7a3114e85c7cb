//! Sidebar state: expansion, username display and the open content panel.

use crate::model::user::UserId;
use crate::repo::RepoResult;
use crate::service::SqliteAuthService;
use crate::viewmodel::observable::{replace_if_changed, Observable, PropertyNotifier};
use crate::viewmodel::ViewModelResult;
use rusqlite::Connection;

/// Panel shown in place of the editor area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SidebarContent {
    #[default]
    None,
    Settings,
    UserProfile,
    TagManagement,
    Trash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarProperty {
    IsExpanded,
    Username,
    Content,
}

pub struct SidebarViewModel<'conn> {
    auth: SqliteAuthService<'conn>,
    user_uuid: UserId,
    is_expanded: bool,
    username: String,
    content: SidebarContent,
    notifier: PropertyNotifier<SidebarProperty>,
}

impl<'conn> SidebarViewModel<'conn> {
    pub fn new(conn: &'conn Connection, user_uuid: UserId) -> RepoResult<Self> {
        Ok(Self {
            auth: SqliteAuthService::from_connection(conn)?,
            user_uuid,
            is_expanded: true,
            username: String::new(),
            content: SidebarContent::None,
            notifier: PropertyNotifier::new(),
        })
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn content(&self) -> SidebarContent {
        self.content
    }

    /// Reloads the displayed username.
    pub fn refresh(&mut self) -> ViewModelResult<()> {
        let username = self
            .auth
            .get_user(self.user_uuid)?
            .map(|user| user.username)
            .unwrap_or_default();
        if replace_if_changed(&mut self.username, username) {
            self.notifier.notify(SidebarProperty::Username);
        }
        Ok(())
    }

    /// Opens `panel`, or closes it when it is already open.
    ///
    /// Returns the panel now shown.
    pub fn show(&mut self, panel: SidebarContent) -> SidebarContent {
        let next = if self.content == panel {
            SidebarContent::None
        } else {
            panel
        };
        self.set_content(next);
        next
    }

    /// Returns to the main editor area.
    pub fn close_content(&mut self) {
        self.set_content(SidebarContent::None);
    }

    /// Collapses or expands; collapsing also closes the open panel.
    pub fn toggle_sidebar(&mut self) {
        self.is_expanded = !self.is_expanded;
        self.notifier.notify(SidebarProperty::IsExpanded);
        if !self.is_expanded {
            self.close_content();
        }
    }

    fn set_content(&mut self, content: SidebarContent) {
        if replace_if_changed(&mut self.content, content) {
            self.notifier.notify(SidebarProperty::Content);
        }
        if content != SidebarContent::None && replace_if_changed(&mut self.is_expanded, true) {
            self.notifier.notify(SidebarProperty::IsExpanded);
        }
    }
}

impl Observable for SidebarViewModel<'_> {
    type Property = SidebarProperty;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<SidebarProperty> {
        &mut self.notifier
    }
}
