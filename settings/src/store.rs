use std::rc::Rc;

use crate::error::StoreResult;
use crate::models::{ApiKey, AzureSettings, ClearReport, Provider, ProviderSelection};

/// Persistence collaborator. Namespacing is entirely the implementation's
/// business: the core never builds storage keys.
///
/// Implementations use interior mutability; the UI is single-threaded.
pub trait SettingsStore {
    fn base_url(&self) -> StoreResult<Option<String>>;
    fn base_url_provider(&self) -> StoreResult<Option<Provider>>;
    /// Base URL and provider are only ever written together.
    fn save_provider_selection(&self, selection: &ProviderSelection) -> StoreResult<()>;

    fn default_base_url_for_provider(&self, provider: Provider) -> String {
        provider.default_base_url().unwrap_or_default().to_string()
    }

    fn azure_settings(&self) -> StoreResult<Option<AzureSettings>>;
    fn save_azure_settings(&self, azure: &AzureSettings) -> StoreResult<()>;

    fn api_key(&self) -> StoreResult<Option<ApiKey>>;
    fn save_api_key(&self, key: &ApiKey) -> StoreResult<()>;

    fn model(&self) -> StoreResult<Option<String>>;
    fn save_model(&self, model: &str) -> StoreResult<()>;

    fn system_prompt(&self) -> StoreResult<Option<String>>;
    fn save_system_prompt(&self, prompt: &str) -> StoreResult<()>;

    fn title(&self) -> StoreResult<Option<String>>;
    fn save_title(&self, title: &str) -> StoreResult<()>;
    fn subtitle(&self) -> StoreResult<Option<String>>;
    fn save_subtitle(&self, subtitle: &str) -> StoreResult<()>;

    fn tool_calling_enabled(&self) -> StoreResult<bool>;
    fn save_tool_calling_enabled(&self, enabled: bool) -> StoreResult<()>;

    fn welcome_seen(&self) -> StoreResult<bool>;
    fn save_welcome_seen(&self, seen: bool) -> StoreResult<()>;

    /// Removes everything in the active namespace.
    fn clear_all_data(&self) -> StoreResult<ClearReport>;
}

pub type Store = Rc<dyn SettingsStore>;
