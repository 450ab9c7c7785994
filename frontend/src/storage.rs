//! `localStorage` persistence for the settings core.

use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};
use settings::error::{StoreError, StoreResult};
use settings::models::{
    ApiKey, AzureSettings, ClearReport, Provider, ProviderSelection, StoredSettings,
};
use settings::state::{SharedStateHandle, session_key};
use settings::store::SettingsStore;

const KEY_PREFIX: &str = "renoma.settings";
/// Title and subtitle pick the namespace, so they cannot live inside it.
const PROFILE_KEY: &str = "renoma.profile";
const DEFAULT_NAMESPACE: &str = "default";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Profile {
    title: Option<String>,
    subtitle: Option<String>,
}

/// Reads `?session=<key>` from the page address.
pub fn session_key_from_location() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    session_key_from_search(&search)
}

fn session_key_from_search(search: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| pair.strip_prefix("session="))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// Session key first, then the profile title and subtitle, then the default.
fn namespace_for(session: Option<String>, profile: &Profile) -> String {
    if let Some(key) = session.filter(|key| !key.trim().is_empty()) {
        return key;
    }
    let parts: Vec<&str> = [profile.title.as_deref(), profile.subtitle.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        DEFAULT_NAMESPACE.to_string()
    } else {
        parts.join("/")
    }
}

fn map_err(err: StorageError) -> StoreError {
    match err {
        StorageError::SerdeError(e) => StoreError::Serde(e),
        other => StoreError::Backend(other.to_string()),
    }
}

fn read<T: for<'de> Deserialize<'de> + Default>(key: &str) -> StoreResult<T> {
    match LocalStorage::get(key) {
        Ok(value) => Ok(value),
        Err(StorageError::KeyNotFound(_)) => Ok(T::default()),
        Err(e) => Err(map_err(e)),
    }
}

/// One JSON document per namespace under `renoma.settings.<namespace>`.
pub struct LocalStore {
    state: SharedStateHandle,
}

impl LocalStore {
    pub fn new(state: SharedStateHandle) -> Self {
        Self { state }
    }

    fn namespace(&self) -> StoreResult<String> {
        let session = session_key(&self.state).filter(|key| !key.trim().is_empty());
        let profile: Profile = match session {
            Some(_) => Profile::default(),
            None => read(PROFILE_KEY)?,
        };
        Ok(namespace_for(session, &profile))
    }

    fn storage_key(&self) -> StoreResult<String> {
        Ok(format!("{KEY_PREFIX}.{}", self.namespace()?))
    }

    fn load(&self) -> StoreResult<StoredSettings> {
        read(&self.storage_key()?)
    }

    fn update(&self, apply: impl FnOnce(&mut StoredSettings)) -> StoreResult<()> {
        let key = self.storage_key()?;
        let mut settings: StoredSettings = read(&key)?;
        apply(&mut settings);
        LocalStorage::set(&key, &settings).map_err(map_err)
    }

    fn update_profile(&self, apply: impl FnOnce(&mut Profile)) -> StoreResult<()> {
        let mut profile: Profile = read(PROFILE_KEY)?;
        apply(&mut profile);
        LocalStorage::set(PROFILE_KEY, &profile).map_err(map_err)
    }
}

impl SettingsStore for LocalStore {
    fn base_url(&self) -> StoreResult<Option<String>> {
        Ok(self.load()?.selection.map(|s| s.base_url))
    }

    fn base_url_provider(&self) -> StoreResult<Option<Provider>> {
        Ok(self.load()?.selection.map(|s| s.provider))
    }

    fn save_provider_selection(&self, selection: &ProviderSelection) -> StoreResult<()> {
        self.update(|s| s.selection = Some(selection.clone()))
    }

    fn azure_settings(&self) -> StoreResult<Option<AzureSettings>> {
        Ok(self.load()?.azure)
    }

    fn save_azure_settings(&self, azure: &AzureSettings) -> StoreResult<()> {
        self.update(|s| s.azure = Some(azure.clone()))
    }

    fn api_key(&self) -> StoreResult<Option<ApiKey>> {
        Ok(self.load()?.api_key)
    }

    fn save_api_key(&self, key: &ApiKey) -> StoreResult<()> {
        self.update(|s| s.api_key = Some(key.clone()))
    }

    fn model(&self) -> StoreResult<Option<String>> {
        Ok(self.load()?.model)
    }

    fn save_model(&self, model: &str) -> StoreResult<()> {
        self.update(|s| s.model = Some(model.to_string()))
    }

    fn system_prompt(&self) -> StoreResult<Option<String>> {
        Ok(self.load()?.system_prompt)
    }

    fn save_system_prompt(&self, prompt: &str) -> StoreResult<()> {
        self.update(|s| s.system_prompt = Some(prompt.to_string()))
    }

    fn title(&self) -> StoreResult<Option<String>> {
        Ok(read::<Profile>(PROFILE_KEY)?.title)
    }

    fn save_title(&self, title: &str) -> StoreResult<()> {
        self.update_profile(|p| p.title = Some(title.to_string()))
    }

    fn subtitle(&self) -> StoreResult<Option<String>> {
        Ok(read::<Profile>(PROFILE_KEY)?.subtitle)
    }

    fn save_subtitle(&self, subtitle: &str) -> StoreResult<()> {
        self.update_profile(|p| p.subtitle = Some(subtitle.to_string()))
    }

    fn tool_calling_enabled(&self) -> StoreResult<bool> {
        Ok(self.load()?.tool_calling_enabled)
    }

    fn save_tool_calling_enabled(&self, enabled: bool) -> StoreResult<()> {
        self.update(|s| s.tool_calling_enabled = enabled)
    }

    fn welcome_seen(&self) -> StoreResult<bool> {
        Ok(self.load()?.welcome_seen)
    }

    fn save_welcome_seen(&self, seen: bool) -> StoreResult<()> {
        self.update(|s| s.welcome_seen = seen)
    }

    fn clear_all_data(&self) -> StoreResult<ClearReport> {
        let key = self.storage_key()?;
        let cleared = self.load()?.populated_keys();
        LocalStorage::delete(&key);
        tracing::debug!(%key, "Removed settings document");
        Ok(ClearReport::cleared(cleared))
    }
}
