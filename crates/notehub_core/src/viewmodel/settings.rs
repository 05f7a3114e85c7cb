//! Settings panel state.

use crate::settings::{save_settings, AppSettings, Theme};
use crate::viewmodel::observable::{Observable, PropertyNotifier};
use crate::viewmodel::ViewModelResult;
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsProperty {
    Theme,
}

pub struct SettingsViewModel {
    settings: AppSettings,
    /// Where changes are persisted; `None` keeps them in memory.
    settings_path: Option<PathBuf>,
    notifier: PropertyNotifier<SettingsProperty>,
}

impl SettingsViewModel {
    pub fn new(settings: AppSettings, settings_path: Option<PathBuf>) -> Self {
        Self {
            settings,
            settings_path,
            notifier: PropertyNotifier::new(),
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    pub fn is_dark_mode(&self) -> bool {
        self.settings.theme == Theme::Dark
    }

    /// Switches between light and dark and persists the choice.
    pub fn toggle_theme(&mut self) -> ViewModelResult<Theme> {
        let theme = self.settings.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    pub fn set_theme(&mut self, theme: Theme) -> ViewModelResult<()> {
        if self.settings.theme == theme {
            return Ok(());
        }
        let next = AppSettings {
            theme,
            ..self.settings.clone()
        };
        if let Some(path) = &self.settings_path {
            save_settings(path, &next)?;
        }
        self.settings = next;
        info!("event=settings_theme module=viewmodel status=ok theme={theme:?}");
        self.notifier.notify(SettingsProperty::Theme);
        Ok(())
    }
}

impl Observable for SettingsViewModel {
    type Property = SettingsProperty;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<SettingsProperty> {
        &mut self.notifier
    }
}
