use crate::error::SettingsError;
use crate::store::Store;
use crate::ui::Field;

pub struct SystemPromptManager {
    field: Option<Field>,
    store: Store,
}

impl SystemPromptManager {
    pub fn new(field: Option<Field>, store: Store) -> Self {
        Self { field, store }
    }

    pub fn init(&self) {
        let Some(field) = &self.field else {
            tracing::warn!("System prompt field missing, skipping init");
            return;
        };
        match self.store.system_prompt() {
            Ok(prompt) => field.set_value(prompt.as_deref().unwrap_or_default()),
            Err(e) => tracing::warn!("Failed to read system prompt: {e}"),
        }
    }

    pub fn system_prompt(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.store.system_prompt()?)
    }

    pub fn save_system_prompt(&self, prompt: &str) -> Result<(), SettingsError> {
        self.store.save_system_prompt(prompt)?;
        if let Some(field) = &self.field {
            field.set_value(prompt);
        }
        Ok(())
    }

    /// Unlike the key, the prompt keeps its surrounding whitespace.
    pub fn save_from_field(&self) -> Result<(), SettingsError> {
        match &self.field {
            Some(field) => self.store.save_system_prompt(&field.value()).map_err(Into::into),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::FieldHandle;
    use crate::testing::{MemoryStore, MockField, field};

    #[test]
    fn init_loads_and_save_round_trips() {
        let store = MemoryStore::new();
        store.data.borrow_mut().system_prompt = Some("Be brief.".into());
        let input = MockField::new("");
        let manager = SystemPromptManager::new(Some(field(&input)), store.clone());

        manager.init();
        assert_eq!(input.value(), "Be brief.");

        input.type_value("  Answer in French.\n");
        manager.save_from_field().unwrap();
        assert_eq!(
            manager.system_prompt().unwrap().as_deref(),
            Some("  Answer in French.\n")
        );
    }
}
