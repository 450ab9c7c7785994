//! Shared links carry a settings snapshot (and optionally a conversation) in
//! the URL fragment.

use crate::error::SettingsError;
use crate::models::{Provider, SharedLinkPayload};
use crate::state::{SharedStateHandle, set_messages};
use crate::ui::Field;

use super::api_key::ApiKeyManager;
use super::base_url::BaseUrlResolver;
use super::model::ModelSelector;
use super::system_prompt::SystemPromptManager;

pub const FRAGMENT_PREFIX: &str = "#shared=";

/// Which parts of a shared link were applied, for the chat log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppliedLink {
    pub provider: Option<Provider>,
    pub api_key: bool,
    pub model: Option<String>,
    pub system_prompt: bool,
    pub messages: usize,
}

impl AppliedLink {
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(provider) = self.provider {
            parts.push(format!("provider {provider}"));
        }
        if self.api_key {
            parts.push("API key".to_string());
        }
        if let Some(model) = &self.model {
            parts.push(format!("model {model}"));
        }
        if self.system_prompt {
            parts.push("system prompt".to_string());
        }
        if self.messages > 0 {
            parts.push(format!("{} messages", self.messages));
        }
        if parts.is_empty() {
            "Shared link contained no settings".to_string()
        } else {
            format!("Loaded from shared link: {}", parts.join(", "))
        }
    }
}

/// Collaborators a payload is applied through.
pub struct LinkTargets<'a> {
    pub base_url: &'a BaseUrlResolver,
    pub api_key: &'a ApiKeyManager,
    pub system_prompt: &'a SystemPromptManager,
    pub model: &'a dyn ModelSelector,
}

pub struct SharedLinkManager {
    /// "Include API key" checkbox of the share dialog
    include_key: Option<Field>,
    state: SharedStateHandle,
}

impl SharedLinkManager {
    pub fn new(include_key: Option<Field>, state: SharedStateHandle) -> Self {
        Self { include_key, state }
    }

    /// Pulls the payload out of a location fragment, `None` when there is no
    /// shared link.
    pub fn payload_from_fragment(
        decoded_fragment: &str,
    ) -> Option<Result<SharedLinkPayload, SettingsError>> {
        decoded_fragment
            .strip_prefix(FRAGMENT_PREFIX)
            .map(SharedLinkPayload::from_json)
    }

    pub fn include_api_key(&self) -> bool {
        self.include_key
            .as_ref()
            .is_some_and(|f| f.value() == "true")
    }

    pub fn apply(
        &self,
        payload: SharedLinkPayload,
        targets: LinkTargets<'_>,
    ) -> Result<AppliedLink, SettingsError> {
        let mut applied = AppliedLink::default();

        let provider = match (payload.provider, &payload.base_url) {
            (Some(provider), _) => Some(provider),
            (None, Some(_)) => Some(Provider::Custom),
            (None, None) => None,
        };
        if let Some(provider) = provider {
            let url = BaseUrlResolver::determine_base_url(
                provider,
                payload.base_url.as_deref().unwrap_or_default(),
            );
            targets.base_url.save_base_url(&url, provider)?;
            applied.provider = Some(provider);
        }
        if let Some(key) = payload.api_key.filter(|k| !k.is_empty()) {
            targets.api_key.save_api_key(key.expose())?;
            applied.api_key = true;
        }
        if let Some(prompt) = payload.system_prompt {
            targets.system_prompt.save_system_prompt(&prompt)?;
            applied.system_prompt = true;
        }
        if let Some(model) = payload.model.filter(|m| !m.trim().is_empty()) {
            targets.model.set_pending_shared_model(&model);
            applied.model = Some(model);
        }
        if !payload.messages.is_empty() {
            applied.messages = payload.messages.len();
            set_messages(&self.state, payload.messages);
        }
        tracing::info!("{}", applied.summary());
        Ok(applied)
    }

    /// Snapshot of the current settings. The key is included only when the
    /// share dialog asks for it.
    pub fn create_payload(
        &self,
        targets: LinkTargets<'_>,
        model: Option<String>,
    ) -> Result<SharedLinkPayload, SettingsError> {
        let provider = targets.base_url.provider()?;
        let api_key = if self.include_api_key() {
            targets.api_key.api_key()?
        } else {
            None
        };
        Ok(SharedLinkPayload {
            base_url: Some(targets.base_url.base_url()?),
            provider: Some(provider),
            api_key,
            model,
            system_prompt: targets.system_prompt.system_prompt()?,
            messages: Vec::new(),
        })
    }
}
