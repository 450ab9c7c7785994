use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SettingsError;

/// An inference API vendor profile the base URL can be bound to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "azure-openai")]
    AzureOpenAi,
    #[serde(rename = "groq")]
    Groq,
    #[serde(rename = "berget")]
    Berget,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "lmstudio")]
    LmStudio,
    #[serde(rename = "llamafile")]
    Llamafile,
    #[serde(rename = "gpt4all")]
    Gpt4All,
    #[serde(rename = "custom")]
    Custom,
}

impl Provider {
    /// Every provider, in the order the selector lists them.
    pub const ALL: [Provider; 10] = [
        Provider::OpenAi,
        Provider::AzureOpenAi,
        Provider::Groq,
        Provider::Berget,
        Provider::OpenRouter,
        Provider::Ollama,
        Provider::LmStudio,
        Provider::Llamafile,
        Provider::Gpt4All,
        Provider::Custom,
    ];

    /// Identifier used for persistence and as the `<option>` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::AzureOpenAi => "azure-openai",
            Provider::Groq => "groq",
            Provider::Berget => "berget",
            Provider::OpenRouter => "openrouter",
            Provider::Ollama => "ollama",
            Provider::LmStudio => "lmstudio",
            Provider::Llamafile => "llamafile",
            Provider::Gpt4All => "gpt4all",
            Provider::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::AzureOpenAi => "Azure OpenAI",
            Provider::Groq => "Groq",
            Provider::Berget => "Berget",
            Provider::OpenRouter => "OpenRouter",
            Provider::Ollama => "Ollama",
            Provider::LmStudio => "LM Studio",
            Provider::Llamafile => "Llamafile",
            Provider::Gpt4All => "GPT4All",
            Provider::Custom => "Custom",
        }
    }

    /// Fixed endpoint for the provider. `None` when the user supplies it.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("https://api.openai.com/v1"),
            Provider::Groq => Some("https://api.groq.com/openai/v1"),
            Provider::Berget => Some("https://api.berget.ai/v1"),
            Provider::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Provider::Ollama => Some("http://localhost:11434/v1"),
            Provider::LmStudio => Some("http://localhost:1234/v1"),
            Provider::Llamafile => Some("http://localhost:8080/v1"),
            Provider::Gpt4All => Some("http://localhost:4891/v1"),
            Provider::AzureOpenAi | Provider::Custom => None,
        }
    }

    /// Whether the base URL comes from the custom URL field.
    pub fn uses_custom_url(&self) -> bool {
        matches!(self, Provider::Custom | Provider::AzureOpenAi)
    }

    /// Maps a detected provider name ("OpenAI", "groq", "LM Studio") back to
    /// its identifier.
    pub fn from_display_name(name: &str) -> Option<Provider> {
        let name = name.trim();
        Provider::ALL.into_iter().find(|p| {
            p.display_name().eq_ignore_ascii_case(name) || p.as_str().eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| SettingsError::UnknownProvider(s.to_string()))
    }
}
