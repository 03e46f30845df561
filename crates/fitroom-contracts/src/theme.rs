use serde::{Deserialize, Serialize};

use crate::storage::PersistentStore;

pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

pub struct ThemePreference {
    theme: Theme,
    store: Box<dyn PersistentStore<Theme>>,
}

impl ThemePreference {
    pub fn load(store: Box<dyn PersistentStore<Theme>>) -> Self {
        Self {
            theme: store.load(),
            store,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(err) = self.store.save(&self.theme) {
            tracing::warn!(error = %err, "failed to persist theme");
        }
    }

    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled());
        self.theme
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Theme, ThemePreference, THEME_STORAGE_KEY};
    use crate::storage::{KeyedStore, LocalStorage, MemoryStore};

    #[test]
    fn theme_defaults_to_light_and_toggles() {
        let mut preference = ThemePreference::load(Box::new(MemoryStore::<Theme>::new()));
        assert_eq!(preference.theme(), Theme::Light);
        assert_eq!(preference.toggle(), Theme::Dark);
        assert_eq!(preference.toggle(), Theme::Light);
    }

    #[test]
    fn unknown_stored_theme_falls_back_to_light() {
        let preference = ThemePreference::load(Box::new(MemoryStore::<Theme>::with_raw(json!("sepia"))));
        assert_eq!(preference.theme(), Theme::Light);
    }

    #[test]
    fn theme_persists_as_plain_string() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let storage = LocalStorage::new(temp.path().join("storage.json"));
        let mut preference =
            ThemePreference::load(Box::new(KeyedStore::<Theme>::new(storage.clone(), THEME_STORAGE_KEY)));
        preference.set(Theme::Dark);

        assert_eq!(storage.get_item(THEME_STORAGE_KEY)?, Some(json!("dark")));
        let reloaded = ThemePreference::load(Box::new(KeyedStore::<Theme>::new(storage, THEME_STORAGE_KEY)));
        assert_eq!(reloaded.theme(), Theme::Dark);
        Ok(())
    }

    #[test]
    fn parse_accepts_case_insensitive_names() {
        assert_eq!(Theme::parse(" Dark "), Some(Theme::Dark));
        assert_eq!(Theme::parse("light"), Some(Theme::Light));
        assert_eq!(Theme::parse("blue"), None);
    }
}
