use serde::{Deserialize, Serialize};
use std::fmt;

use super::message::ChatMessage;
use super::provider::Provider;
use crate::error::SettingsError;

pub const DEFAULT_AZURE_API_VERSION: &str = "2024-10-21";

/// Secret API key. Never printed, not even through `Debug`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Provider identity inferred from the shape of an API key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub provider_name: String,
    pub default_model: Option<String>,
}

/// Provider and base URL, always persisted as a pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSelection {
    pub provider: Provider,
    pub base_url: String,
}

impl ProviderSelection {
    /// Builds a selection, rejecting a custom provider without a URL.
    pub fn new(provider: Provider, base_url: impl Into<String>) -> Result<Self, SettingsError> {
        let base_url = base_url.into().trim().to_string();
        if provider == Provider::Custom && base_url.is_empty() {
            return Err(SettingsError::EmptyCustomUrl);
        }
        Ok(Self { provider, base_url })
    }

    /// Selection for a provider with a fixed endpoint.
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            base_url: provider.default_base_url().unwrap_or_default().to_string(),
        }
    }
}

impl Default for ProviderSelection {
    fn default() -> Self {
        Self::for_provider(Provider::default())
    }
}

/// Azure deployments are addressed by base, version and deployment name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureSettings {
    pub api_base: String,
    pub api_version: String,
    pub deployment_name: String,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            deployment_name: String::new(),
        }
    }
}

/// Outcome of wiping every setting in the active namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    pub success: bool,
    pub cleared_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ClearReport {
    pub fn cleared(keys: Vec<String>) -> Self {
        Self {
            success: true,
            cleared_keys: keys,
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Best description of a failure, for the chat log.
    pub fn failure_reason(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("unknown error")
    }
}

/// Everything persisted under one namespace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    pub api_key: Option<ApiKey>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub selection: Option<ProviderSelection>,
    pub azure: Option<AzureSettings>,
    pub tool_calling_enabled: bool,
    pub welcome_seen: bool,
}

impl StoredSettings {
    /// Names of the fields that currently hold a value.
    pub fn populated_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if self.api_key.is_some() {
            keys.push("api_key");
        }
        if self.model.is_some() {
            keys.push("model");
        }
        if self.system_prompt.is_some() {
            keys.push("system_prompt");
        }
        if self.selection.is_some() {
            keys.push("base_url");
            keys.push("base_url_provider");
        }
        if self.azure.is_some() {
            keys.push("azure");
        }
        if self.tool_calling_enabled {
            keys.push("tool_calling_enabled");
        }
        if self.welcome_seen {
            keys.push("welcome_seen");
        }
        keys.into_iter().map(String::from).collect()
    }
}

/// Body of `GET <base_url>/models` on an OpenAI-compatible API.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}

impl ModelList {
    pub fn into_ids(self) -> Vec<String> {
        let mut ids: Vec<String> = self.data.into_iter().map(|m| m.id).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Settings carried by a shared link. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedLinkPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ApiKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ChatMessage>,
}

impl SharedLinkPayload {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(SettingsError::InvalidSharedLink)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string(self).map_err(SettingsError::InvalidSharedLink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_redacted() {
        let key = ApiKey::new("  sk-proj-secret  ");
        assert_eq!(key.expose(), "sk-proj-secret");
        assert_eq!(format!("{key:?}"), "ApiKey(<redacted>)");
        assert_eq!(key.to_string(), "<redacted>");
    }

    #[test]
    fn custom_selection_requires_url() {
        assert!(matches!(
            ProviderSelection::new(Provider::Custom, "   "),
            Err(SettingsError::EmptyCustomUrl)
        ));
        let selection = ProviderSelection::new(Provider::Custom, " https://x/v1 ").unwrap();
        assert_eq!(selection.base_url, "https://x/v1");
    }

    #[test]
    fn clear_report_prefers_error_over_message() {
        let mut report = ClearReport::failed("quota");
        report.message = Some("ignored".into());
        assert_eq!(report.failure_reason(), "quota");
        report.error = None;
        assert_eq!(report.failure_reason(), "ignored");
    }

    #[test]
    fn model_list_parses_openai_shape() {
        let list: ModelList = serde_json::from_str(
            r#"{"object":"list","data":[{"id":"gpt-4o","object":"model"},{"id":"gpt-4o-mini"},{"id":"gpt-4o"}]}"#,
        )
        .unwrap();
        assert_eq!(list.into_ids(), vec!["gpt-4o", "gpt-4o-mini"]);
    }

    #[test]
    fn shared_link_tolerates_missing_fields() {
        let payload = SharedLinkPayload::from_json(r#"{"model":"gpt-4o","provider":"groq"}"#).unwrap();
        assert_eq!(payload.model.as_deref(), Some("gpt-4o"));
        assert_eq!(payload.provider, Some(Provider::Groq));
        assert!(payload.api_key.is_none());
        assert!(SharedLinkPayload::from_json("not json").is_err());
    }
}
