use crate::error::SettingsError;
use crate::models::{
    AzureSettings, DEFAULT_AZURE_API_VERSION, DetectionResult, Provider, ProviderSelection,
};
use crate::store::Store;
use crate::ui::{Field, set_visible, trimmed_value};

/// DOM handles the base URL section needs. Any of them may be missing.
#[derive(Clone, Default)]
pub struct BaseUrlFields {
    pub provider_select: Option<Field>,
    pub base_url_input: Option<Field>,
    pub custom_url_group: Option<Field>,
    pub azure_group: Option<Field>,
    pub azure_api_base: Option<Field>,
    pub azure_api_version: Option<Field>,
    pub azure_deployment: Option<Field>,
}

/// Owns the provider / base URL selection.
pub struct BaseUrlResolver {
    fields: BaseUrlFields,
    store: Store,
}

/// Projects a provider onto the visible fields. Runs at init, on every manual
/// change and after detection, so all three look the same.
fn project_provider(fields: &BaseUrlFields, store: &Store, provider: Provider) {
    set_visible(fields.custom_url_group.as_ref(), provider == Provider::Custom);
    set_visible(fields.azure_group.as_ref(), provider == Provider::AzureOpenAi);
    if !provider.uses_custom_url()
        && let Some(input) = &fields.base_url_input
    {
        input.set_value(&store.default_base_url_for_provider(provider));
    }
}

impl BaseUrlResolver {
    pub fn new(fields: BaseUrlFields, store: Store) -> Self {
        Self { fields, store }
    }

    pub fn init(&self) {
        let provider = match self.store.base_url_provider() {
            Ok(provider) => provider.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read base URL provider: {e}");
                Provider::default()
            }
        };

        if let Some(select) = &self.fields.provider_select {
            select.set_value(provider.as_str());
        }
        if provider.uses_custom_url() {
            match self.store.base_url() {
                Ok(url) => {
                    if let Some(input) = &self.fields.base_url_input {
                        input.set_value(url.as_deref().unwrap_or_default());
                    }
                }
                Err(e) => tracing::warn!("Failed to read base URL: {e}"),
            }
        }
        if provider == Provider::AzureOpenAi {
            self.show_azure_settings();
        }
        project_provider(&self.fields, &self.store, provider);

        let Some(select) = &self.fields.provider_select else {
            tracing::warn!("Provider selector missing, base URL section is read-only");
            return;
        };
        let fields = self.fields.clone();
        let store = self.store.clone();
        select.add_change_listener(Box::new(move || {
            let Some(select) = &fields.provider_select else {
                return;
            };
            match select.value().parse::<Provider>() {
                Ok(provider) => project_provider(&fields, &store, provider),
                Err(e) => tracing::warn!("{e}"),
            }
        }));
    }

    fn show_azure_settings(&self) {
        let azure = match self.store.azure_settings() {
            Ok(azure) => azure.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read Azure settings: {e}");
                AzureSettings::default()
            }
        };
        let version = if azure.api_version.trim().is_empty() {
            DEFAULT_AZURE_API_VERSION
        } else {
            azure.api_version.as_str()
        };
        if let Some(f) = &self.fields.azure_api_base {
            f.set_value(&azure.api_base);
        }
        if let Some(f) = &self.fields.azure_api_version {
            f.set_value(version);
        }
        if let Some(f) = &self.fields.azure_deployment {
            f.set_value(&azure.deployment_name);
        }
    }

    /// Always read back from the store: the namespace can move underneath
    /// (e.g. after a title change).
    pub fn base_url(&self) -> Result<String, SettingsError> {
        if let Some(url) = self.store.base_url()?.filter(|u| !u.trim().is_empty()) {
            return Ok(url);
        }
        let provider = self.store.base_url_provider()?.unwrap_or_default();
        Ok(self.store.default_base_url_for_provider(provider))
    }

    pub fn provider(&self) -> Result<Provider, SettingsError> {
        Ok(self.store.base_url_provider()?.unwrap_or_default())
    }

    /// Provider currently shown in the selector.
    pub fn selected_provider(&self) -> Provider {
        self.fields
            .provider_select
            .as_ref()
            .and_then(|s| s.value().parse().ok())
            .unwrap_or_default()
    }

    pub fn save_base_url(&self, url: &str, provider: Provider) -> Result<(), SettingsError> {
        let selection = ProviderSelection::new(provider, url)?;
        self.store.save_provider_selection(&selection)?;
        tracing::info!(provider = provider.as_str(), "Saved base URL");
        Ok(())
    }

    /// `custom` and `azure-openai` take the custom text, everything else its
    /// fixed endpoint.
    pub fn determine_base_url(selected_provider: Provider, custom_url: &str) -> String {
        if selected_provider.uses_custom_url() {
            custom_url.trim().to_string()
        } else {
            selected_provider
                .default_base_url()
                .unwrap_or_default()
                .to_string()
        }
    }

    /// Persists whatever the section currently shows.
    pub fn save_from_fields(&self) -> Result<(), SettingsError> {
        let provider = self.selected_provider();
        // Azure keeps its endpoint in the API base field
        let custom = if provider == Provider::AzureOpenAi {
            trimmed_value(self.fields.azure_api_base.as_ref())
        } else {
            trimmed_value(self.fields.base_url_input.as_ref())
        };
        self.save_base_url(&Self::determine_base_url(provider, &custom), provider)?;
        if provider == Provider::AzureOpenAi {
            self.save_azure_settings(
                &custom,
                &trimmed_value(self.fields.azure_api_version.as_ref()),
                &trimmed_value(self.fields.azure_deployment.as_ref()),
            )?;
        }
        Ok(())
    }

    pub fn azure_settings(&self) -> Result<AzureSettings, SettingsError> {
        Ok(self.store.azure_settings()?.unwrap_or_default())
    }

    pub fn save_azure_settings(
        &self,
        api_base: &str,
        api_version: &str,
        deployment_name: &str,
    ) -> Result<(), SettingsError> {
        let api_version = match api_version.trim() {
            "" => DEFAULT_AZURE_API_VERSION,
            v => v,
        };
        self.store.save_azure_settings(&AzureSettings {
            api_base: api_base.trim().to_string(),
            api_version: api_version.to_string(),
            deployment_name: deployment_name.trim().to_string(),
        })?;
        Ok(())
    }

    /// Switches to the detected provider exactly as a manual selection would
    /// and persists it. Returns the provider's default model; choosing it is
    /// left to the caller.
    pub fn update_provider_from_detection(&self, detection: &DetectionResult) -> Option<String> {
        let Some(provider) = Provider::from_display_name(&detection.provider_name) else {
            tracing::warn!("No provider matches detected name {}", detection.provider_name);
            return None;
        };

        if let Some(select) = &self.fields.provider_select {
            select.set_value(provider.as_str());
        }
        project_provider(&self.fields, &self.store, provider);

        let url = Self::determine_base_url(
            provider,
            &trimmed_value(self.fields.base_url_input.as_ref()),
        );
        if let Err(e) = self.save_base_url(&url, provider) {
            tracing::warn!("Failed to persist detected provider: {e}");
        }
        detection.default_model.clone()
    }
}
