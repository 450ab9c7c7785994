use crate::error::SettingsError;
use crate::store::Store;
use crate::ui::Field;

pub struct WelcomeManager {
    panel: Option<Field>,
    store: Store,
}

impl WelcomeManager {
    pub fn new(panel: Option<Field>, store: Store) -> Self {
        Self { panel, store }
    }

    /// First visit in this namespace and nothing configured yet.
    pub fn should_show_welcome(&self) -> bool {
        let seen = self.store.welcome_seen().unwrap_or(true);
        let has_key = matches!(self.store.api_key(), Ok(Some(k)) if !k.is_empty());
        !seen && !has_key
    }

    pub fn init(&self) {
        if let Some(panel) = &self.panel {
            if self.should_show_welcome() {
                panel.show();
            } else {
                panel.hide();
            }
        }
    }

    pub fn mark_seen(&self) -> Result<(), SettingsError> {
        self.store.save_welcome_seen(true)?;
        if let Some(panel) = &self.panel {
            panel.hide();
        }
        Ok(())
    }
}
