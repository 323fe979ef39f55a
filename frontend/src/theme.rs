use crate::error::DashboardError;
use crate::persisted::PersistentStore;

#[derive(Hash, Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Caption of the button that switches away from this theme.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "🌙 Dark",
            Theme::Dark => "☀️ Light",
        }
    }
}

/// The persisted theme preference.
pub struct ThemeSetting {
    current: Theme,
    store: PersistentStore,
    key: &'static str,
}

impl ThemeSetting {
    pub fn load(store: PersistentStore, key: &'static str) -> Self {
        let current = store.get(key, Theme::default());
        ThemeSetting {
            current,
            store,
            key,
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn toggle(&mut self) -> Result<Theme, DashboardError> {
        let next = self.current.toggled();
        self.store.set(self.key, &next)?;
        self.current = next;
        Ok(next)
    }
}
