//! Trash panel state.

use crate::model::user::UserId;
use crate::repo::RepoResult;
use crate::service::trash_service::{RestoredItem, TrashItem, TrashServiceError, TrashTarget};
use crate::service::SqliteTrashService;
use crate::viewmodel::command::Command;
use crate::viewmodel::observable::{replace_if_changed, Observable, PropertyNotifier};
use crate::viewmodel::{ViewModelError, ViewModelResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrashProperty {
    Items,
    Selected,
    IsBusy,
    ErrorMessage,
}

/// Outcome of a trash command, routed by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrashEvent {
    Restored(RestoredItem),
    HardDeleted(TrashTarget),
}

pub type TrashCommand<'conn> = Command<TrashViewModel<'conn>, Option<TrashEvent>, ViewModelError>;

pub struct TrashViewModel<'conn> {
    service: SqliteTrashService<'conn>,
    user_uuid: UserId,
    items: Vec<TrashItem>,
    selected: Option<TrashTarget>,
    is_busy: bool,
    error_message: String,
    notifier: PropertyNotifier<TrashProperty>,
}

impl<'conn> TrashViewModel<'conn> {
    pub fn new(conn: &'conn Connection, user_uuid: UserId) -> RepoResult<Self> {
        Ok(Self {
            service: SqliteTrashService::from_connection(conn)?,
            user_uuid,
            items: Vec::new(),
            selected: None,
            is_busy: false,
            error_message: String::new(),
            notifier: PropertyNotifier::new(),
        })
    }

    /// Deleted workspaces and pages, newest deletion first.
    pub fn items(&self) -> &[TrashItem] {
        &self.items
    }

    pub fn selected(&self) -> Option<TrashTarget> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&TrashItem> {
        let selected = self.selected?;
        self.items.iter().find(|item| item.target == selected)
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn select(&mut self, target: Option<TrashTarget>) -> bool {
        let target = target.filter(|target| self.items.iter().any(|item| item.target == *target));
        let changed = replace_if_changed(&mut self.selected, target);
        if changed {
            self.notifier.notify(TrashProperty::Selected);
            self.set_error_message("");
        }
        changed
    }

    pub fn refresh(&mut self) -> ViewModelResult<()> {
        self.set_busy(true);
        let result = self.service.list_trash(self.user_uuid);
        self.set_busy(false);

        let items = result?;
        if replace_if_changed(&mut self.items, items) {
            self.notifier.notify(TrashProperty::Items);
        }
        if let Some(selected) = self.selected {
            if !self.items.iter().any(|item| item.target == selected) {
                self.select(None);
            }
        }
        Ok(())
    }

    pub fn can_restore(&self) -> bool {
        !self.is_busy
            && self
                .selected_item()
                .is_some_and(|item| !item.restore_disabled)
    }

    pub fn can_hard_delete(&self) -> bool {
        self.selected.is_some() && !self.is_busy
    }

    pub fn restore_command() -> TrashCommand<'conn> {
        Command::new("restore", Self::can_restore, Self::restore_selected)
    }

    pub fn hard_delete_command() -> TrashCommand<'conn> {
        Command::new("hard_delete", Self::can_hard_delete, Self::hard_delete_selected)
    }

    /// Restores the selected item.
    ///
    /// A page blocked by its deleted workspace sets the inline error.
    pub fn restore_selected(&mut self) -> ViewModelResult<Option<TrashEvent>> {
        let Some(target) = self.selected else {
            return Ok(None);
        };
        self.set_error_message("");
        self.set_busy(true);
        let result = self.service.restore(target);
        self.set_busy(false);

        let event = match result {
            Ok(restored) => restored.map(TrashEvent::Restored),
            Err(TrashServiceError::RestoreBlocked { workspace_name, .. }) => {
                self.set_error_message(&format!(
                    "Restore workspace '{workspace_name}' first"
                ));
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        self.select(None);
        self.refresh()?;
        Ok(event)
    }

    /// Permanently deletes the selected item.
    pub fn hard_delete_selected(&mut self) -> ViewModelResult<Option<TrashEvent>> {
        let Some(target) = self.selected else {
            return Ok(None);
        };
        self.set_busy(true);
        let result = self.service.hard_delete(target);
        self.set_busy(false);

        let removed = result?;
        self.select(None);
        self.refresh()?;
        Ok(removed.then_some(TrashEvent::HardDeleted(target)))
    }

    fn set_busy(&mut self, value: bool) {
        if replace_if_changed(&mut self.is_busy, value) {
            self.notifier.notify(TrashProperty::IsBusy);
        }
    }

    fn set_error_message(&mut self, message: &str) {
        if self.error_message != message {
            self.error_message = message.to_string();
            self.notifier.notify(TrashProperty::ErrorMessage);
        }
    }
}

impl Observable for TrashViewModel<'_> {
    type Property = TrashProperty;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<TrashProperty> {
        &mut self.notifier
    }
}
