use crate::error::SettingsError;
use crate::store::Store;
use crate::ui::Field;

/// Checkbox values as the DOM reports them.
const CHECKED: &str = "true";
const UNCHECKED: &str = "false";

pub struct ToolCallingManager {
    checkbox: Option<Field>,
    store: Store,
}

impl ToolCallingManager {
    pub fn new(checkbox: Option<Field>, store: Store) -> Self {
        Self { checkbox, store }
    }

    pub fn init(&self) {
        let Some(checkbox) = &self.checkbox else {
            return;
        };
        checkbox.set_value(if self.is_enabled() { CHECKED } else { UNCHECKED });

        let store = self.store.clone();
        let field = checkbox.clone();
        checkbox.add_change_listener(Box::new(move || {
            let enabled = field.value() == CHECKED;
            if let Err(e) = store.save_tool_calling_enabled(enabled) {
                tracing::warn!("Failed to save tool calling flag: {e}");
            }
        }));
    }

    pub fn is_enabled(&self) -> bool {
        self.store.tool_calling_enabled().unwrap_or_else(|e| {
            tracing::warn!("Failed to read tool calling flag: {e}");
            false
        })
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), SettingsError> {
        self.store.save_tool_calling_enabled(enabled)?;
        if let Some(checkbox) = &self.checkbox {
            checkbox.set_value(if enabled { CHECKED } else { UNCHECKED });
        }
        Ok(())
    }
}
