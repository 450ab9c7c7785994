use crate::error::SettingsError;
use crate::models::ApiKey;
use crate::store::Store;
use crate::ui::{Field, trimmed_value};

/// Masked form of a saved key: bullets and the last four characters.
pub fn mask_api_key(key: &ApiKey) -> String {
    let chars: Vec<char> = key.expose().chars().collect();
    if chars.len() <= 8 {
        return "•".repeat(8);
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "•".repeat(8))
}

pub struct ApiKeyManager {
    /// Key field of the first-run modal
    key_input: Option<Field>,
    /// Replacement key field inside settings
    update_input: Option<Field>,
    status: Option<Field>,
    store: Store,
}

impl ApiKeyManager {
    pub fn new(
        key_input: Option<Field>,
        update_input: Option<Field>,
        status: Option<Field>,
        store: Store,
    ) -> Self {
        Self {
            key_input,
            update_input,
            status,
            store,
        }
    }

    /// The stored key never goes back into an input, only its mask into the
    /// status line.
    pub fn init(&self) {
        if let Some(input) = &self.update_input {
            input.set_value("");
        }
        self.refresh_status();
    }

    /// Shows the mask of the stored key, or hides the status line when none
    /// is stored.
    pub fn refresh_status(&self) {
        let Some(status) = &self.status else {
            return;
        };
        match self.store.api_key() {
            Ok(Some(key)) if !key.is_empty() => {
                status.set_value(&format!("Current key: {}", mask_api_key(&key)));
                status.show();
            }
            Ok(_) => status.hide(),
            Err(e) => tracing::warn!("Failed to read API key: {e}"),
        }
    }

    pub fn api_key(&self) -> Result<Option<ApiKey>, SettingsError> {
        Ok(self.store.api_key()?.filter(|k| !k.is_empty()))
    }

    pub fn has_api_key(&self) -> bool {
        matches!(self.api_key(), Ok(Some(_)))
    }

    /// Explicit save; keystrokes never reach the store.
    pub fn save_api_key(&self, raw: &str) -> Result<ApiKey, SettingsError> {
        let key = ApiKey::new(raw);
        if key.is_empty() {
            return Err(SettingsError::EmptyApiKey);
        }
        self.store.save_api_key(&key)?;
        for input in [&self.key_input, &self.update_input].into_iter().flatten() {
            input.set_value("");
        }
        self.refresh_status();
        tracing::info!("Saved API key");
        Ok(key)
    }

    /// Saves a key typed into either field, the settings one first. Returns
    /// `None` when both are empty.
    pub fn save_from_fields(&self) -> Result<Option<ApiKey>, SettingsError> {
        let update = trimmed_value(self.update_input.as_ref());
        let fresh = trimmed_value(self.key_input.as_ref());
        let raw = if update.is_empty() { fresh } else { update };
        if raw.is_empty() {
            return Ok(None);
        }
        self.save_api_key(&raw).map(Some)
    }
}
