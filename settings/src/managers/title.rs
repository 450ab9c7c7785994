use crate::error::SettingsError;
use crate::store::Store;
use crate::ui::{Field, trimmed_value};

/// Title and subtitle of the chat. Together they pick the storage namespace,
/// so saving either one moves every other setting.
pub struct TitleManager {
    title_input: Option<Field>,
    subtitle_input: Option<Field>,
    store: Store,
}

impl TitleManager {
    pub fn new(title_input: Option<Field>, subtitle_input: Option<Field>, store: Store) -> Self {
        Self {
            title_input,
            subtitle_input,
            store,
        }
    }

    pub fn init(&self) {
        if let Some(input) = &self.title_input {
            match self.store.title() {
                Ok(title) => input.set_value(title.as_deref().unwrap_or_default()),
                Err(e) => tracing::warn!("Failed to read title: {e}"),
            }
        }
        if let Some(input) = &self.subtitle_input {
            match self.store.subtitle() {
                Ok(subtitle) => input.set_value(subtitle.as_deref().unwrap_or_default()),
                Err(e) => tracing::warn!("Failed to read subtitle: {e}"),
            }
        }
    }

    pub fn title(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.store.title()?)
    }

    pub fn subtitle(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.store.subtitle()?)
    }

    pub fn save_title(&self, title: &str) -> Result<(), SettingsError> {
        self.store.save_title(title.trim())?;
        tracing::info!("Title changed, settings namespace follows");
        Ok(())
    }

    pub fn save_subtitle(&self, subtitle: &str) -> Result<(), SettingsError> {
        self.store.save_subtitle(subtitle.trim())?;
        Ok(())
    }

    /// Saves both fields if either changed. Returns whether anything did.
    pub fn save_from_fields(&self) -> Result<bool, SettingsError> {
        let title = trimmed_value(self.title_input.as_ref());
        let subtitle = trimmed_value(self.subtitle_input.as_ref());
        let unchanged = self.title()?.unwrap_or_default() == title
            && self.subtitle()?.unwrap_or_default() == subtitle;
        if unchanged {
            return Ok(false);
        }
        self.save_title(&title)?;
        self.save_subtitle(&subtitle)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, MockField, field};

    #[test]
    fn saves_only_on_change() {
        let store = MemoryStore::new();
        let title = MockField::new("");
        let subtitle = MockField::new("");
        let manager = TitleManager::new(Some(field(&title)), Some(field(&subtitle)), store.clone());
        manager.init();

        assert!(!manager.save_from_fields().unwrap());

        title.type_value(" Research ");
        assert!(manager.save_from_fields().unwrap());
        assert_eq!(manager.title().unwrap().as_deref(), Some("Research"));
        assert_eq!(manager.subtitle().unwrap().as_deref(), Some(""));
        assert!(!manager.save_from_fields().unwrap());
    }
}
