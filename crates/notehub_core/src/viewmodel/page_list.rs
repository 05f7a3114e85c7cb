//! Page list panel state for the selected workspace.

use crate::model::page::{compare_for_listing, Page, PageId, DEFAULT_PAGE_TITLE};
use crate::model::tag::Tag;
use crate::model::workspace::WorkspaceId;
use crate::repo::page_repo::PageRecord;
use crate::repo::RepoResult;
use crate::service::page_service::{derive_preview_text, PageServiceError};
use crate::service::SqlitePageService;
use crate::viewmodel::command::Command;
use crate::viewmodel::observable::{replace_if_changed, Observable, PropertyNotifier};
use crate::viewmodel::{ViewModelError, ViewModelResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageListProperty {
    Workspace,
    Pages,
    SearchText,
    Selected,
    IsBusy,
    EditingPage,
}

/// One row of the page list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageItem {
    pub page: Page,
    pub tags: Vec<Tag>,
    /// First line of content, cleaned for display.
    pub preview: Option<String>,
    pub edit_title: String,
    pub is_editing: bool,
}

impl PageItem {
    fn from_record(record: PageRecord) -> Self {
        Self {
            preview: derive_preview_text(&record.page.content),
            edit_title: record.page.title.clone(),
            page: record.page,
            tags: record.tags,
            is_editing: false,
        }
    }

    pub fn id(&self) -> PageId {
        self.page.uuid
    }
}

pub type PageListCommand<'conn, T> = Command<PageListViewModel<'conn>, T, ViewModelError>;

pub struct PageListViewModel<'conn> {
    service: SqlitePageService<'conn>,
    workspace: Option<WorkspaceId>,
    pages: Vec<PageItem>,
    search_text: String,
    selected: Option<PageId>,
    is_busy: bool,
    notifier: PropertyNotifier<PageListProperty>,
}

impl<'conn> PageListViewModel<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            service: SqlitePageService::from_connection(conn)?,
            workspace: None,
            pages: Vec::new(),
            search_text: String::new(),
            selected: None,
            is_busy: false,
            notifier: PropertyNotifier::new(),
        })
    }

    pub fn workspace(&self) -> Option<WorkspaceId> {
        self.workspace
    }

    pub fn pages(&self) -> &[PageItem] {
        &self.pages
    }

    /// Pages whose title or content contains the search text, ignoring case,
    /// in listing order.
    pub fn filtered_pages(&self) -> Vec<&PageItem> {
        let needle = self.search_text.trim().to_lowercase();
        let mut pages: Vec<&PageItem> = self
            .pages
            .iter()
            .filter(|item| {
                needle.is_empty()
                    || item.page.title.to_lowercase().contains(&needle)
                    || item.page.content.to_lowercase().contains(&needle)
            })
            .collect();
        pages.sort_by(|left, right| compare_for_listing(&left.page, &right.page));
        pages
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_pages().is_empty()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selected(&self) -> Option<PageId> {
        self.selected
    }

    pub fn item(&self, id: PageId) -> Option<&PageItem> {
        self.pages.iter().find(|item| item.id() == id)
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn set_search_text(&mut self, value: impl Into<String>) {
        if replace_if_changed(&mut self.search_text, value.into()) {
            self.notifier.notify(PageListProperty::SearchText);
        }
    }

    /// Switches to another workspace (or none), clearing the selection.
    pub fn set_workspace(&mut self, workspace: Option<WorkspaceId>) -> ViewModelResult<()> {
        if replace_if_changed(&mut self.workspace, workspace) {
            self.notifier.notify(PageListProperty::Workspace);
        }
        self.select(None);
        self.refresh()
    }

    /// Sets the selection; returns whether it changed.
    pub fn select(&mut self, id: Option<PageId>) -> bool {
        let id = id.filter(|id| self.item(*id).is_some());
        let changed = replace_if_changed(&mut self.selected, id);
        if changed {
            self.notifier.notify(PageListProperty::Selected);
        }
        changed
    }

    /// Reloads pages of the current workspace.
    pub fn refresh(&mut self) -> ViewModelResult<()> {
        let pages = match self.workspace {
            Some(workspace) => {
                self.set_busy(true);
                let result = self.service.list_pages(workspace);
                self.set_busy(false);
                result?
            }
            None => Vec::new(),
        };
        self.pages = pages.into_iter().map(PageItem::from_record).collect();
        self.notifier.notify(PageListProperty::Pages);
        if let Some(selected) = self.selected {
            if self.item(selected).is_none() {
                self.select(None);
            }
        }
        Ok(())
    }

    pub fn can_add(&self) -> bool {
        self.workspace.is_some() && !self.is_busy
    }

    pub fn can_delete(&self) -> bool {
        self.selected.is_some() && !self.is_busy
    }

    pub fn add_command() -> PageListCommand<'conn, Option<PageRecord>> {
        Command::new("add_page", Self::can_add, Self::add_page)
    }

    pub fn delete_command() -> PageListCommand<'conn, Option<PageId>> {
        Command::new("delete_page", Self::can_delete, Self::delete_selected)
    }

    /// Creates an "Untitled Page", selects it and opens inline rename.
    pub fn add_page(&mut self) -> ViewModelResult<Option<PageRecord>> {
        let Some(workspace) = self.workspace else {
            return Ok(None);
        };
        self.set_busy(true);
        let result = self.service.create_page(workspace, DEFAULT_PAGE_TITLE, "");
        self.set_busy(false);

        let record = result?;
        let mut item = PageItem::from_record(record.clone());
        item.is_editing = true;
        let id = item.id();
        self.pages.insert(0, item);
        self.sort_pages();
        self.notifier.notify(PageListProperty::Pages);
        self.select(Some(id));
        self.notifier.notify(PageListProperty::EditingPage);
        Ok(Some(record))
    }

    /// Soft-deletes the selected page.
    pub fn delete_selected(&mut self) -> ViewModelResult<Option<PageId>> {
        let Some(id) = self.selected else {
            return Ok(None);
        };
        self.set_busy(true);
        let result = self.service.soft_delete_page(id);
        self.set_busy(false);
        result?;
        self.remove_page(id);
        Ok(Some(id))
    }

    /// Drops a row without touching storage.
    pub fn remove_page(&mut self, id: PageId) {
        let before = self.pages.len();
        self.pages.retain(|item| item.id() != id);
        if self.pages.len() != before {
            self.notifier.notify(PageListProperty::Pages);
        }
        if self.selected == Some(id) {
            self.select(None);
        }
    }

    /// Applies a saved page to the list.
    ///
    /// Returns `true` when the page was already listed. Otherwise the list
    /// reloads and the page becomes selected.
    pub fn apply_page_update(&mut self, record: &PageRecord) -> ViewModelResult<bool> {
        if self.workspace != Some(record.page.workspace_uuid) {
            return Ok(false);
        }
        if let Some(item) = self
            .pages
            .iter_mut()
            .find(|item| item.id() == record.page.uuid)
        {
            let is_editing = item.is_editing;
            *item = PageItem::from_record(record.clone());
            item.is_editing = is_editing;
            self.sort_pages();
            self.notifier.notify(PageListProperty::Pages);
            return Ok(true);
        }

        self.refresh()?;
        self.select(Some(record.page.uuid));
        Ok(false)
    }

    pub fn begin_rename(&mut self, id: PageId) {
        if let Some(item) = self.pages.iter_mut().find(|item| item.id() == id) {
            if !item.is_editing {
                item.is_editing = true;
                self.notifier.notify(PageListProperty::EditingPage);
            }
        }
    }

    pub fn set_edit_title(&mut self, id: PageId, title: impl Into<String>) {
        if let Some(item) = self.pages.iter_mut().find(|item| item.id() == id) {
            if replace_if_changed(&mut item.edit_title, title.into()) {
                self.notifier.notify(PageListProperty::EditingPage);
            }
        }
    }

    /// Ends inline rename; a blank title saves as the default title.
    pub fn commit_rename(&mut self, id: PageId) -> ViewModelResult<Option<PageRecord>> {
        let Some(index) = self.pages.iter().position(|item| item.id() == id) else {
            return Ok(None);
        };
        let item = &mut self.pages[index];
        item.is_editing = false;
        if item.edit_title == item.page.title {
            self.notifier.notify(PageListProperty::EditingPage);
            return Ok(None);
        }

        let record = match self.service.rename_page(id, &self.pages[index].edit_title) {
            Ok(record) => record,
            Err(PageServiceError::InvalidTitle(_)) => {
                let item = &mut self.pages[index];
                item.edit_title = item.page.title.clone();
                self.notifier.notify(PageListProperty::EditingPage);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        self.pages[index] = PageItem::from_record(record.clone());
        self.sort_pages();
        self.notifier.notify(PageListProperty::EditingPage);
        self.notifier.notify(PageListProperty::Pages);
        Ok(Some(record))
    }

    fn sort_pages(&mut self) {
        self.pages
            .sort_by(|left, right| compare_for_listing(&left.page, &right.page));
    }

    fn set_busy(&mut self, value: bool) {
        if replace_if_changed(&mut self.is_busy, value) {
            self.notifier.notify(PageListProperty::IsBusy);
        }
    }
}

impl Observable for PageListViewModel<'_> {
    type Property = PageListProperty;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<PageListProperty> {
        &mut self.notifier
    }
}
