//! Provider identities and the request shape each one speaks.

use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

/// Value of the `HTTP-Referer` header sent to OpenRouter.
const OPENROUTER_REFERER: &str = "https://github.com/mrgoonie/cmai";
/// Value of the `X-Title` header sent to OpenRouter.
const OPENROUTER_TITLE: &str = "cmai - AI Commit Message Generator";

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenRouter,
    Ollama,
    LmStudio,
    Custom,
}

/// The two request/response dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiShape {
    /// Chat completions: `messages` in, `choices[0].message.content` out.
    OpenRouterLike,
    /// Single prompt: `prompt` in, `response` out.
    OllamaLike,
}

/// When an `Authorization` header is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Never.
    None,
    /// Only if a key is configured.
    Optional,
    /// Always; a missing key is a configuration error.
    Required,
}

/// Static description of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider: Provider,
    pub shape: ApiShape,
    pub default_base_url: &'static str,
    /// Path appended to the base URL.
    pub endpoint: &'static str,
    pub auth: AuthPolicy,
    pub extra_headers: &'static [(&'static str, &'static str)],
    pub default_model: Option<&'static str>,
}

const OPENROUTER: ProviderProfile = ProviderProfile {
    provider: Provider::OpenRouter,
    shape: ApiShape::OpenRouterLike,
    default_base_url: "https://openrouter.ai/api/v1",
    endpoint: "chat/completions",
    auth: AuthPolicy::Required,
    extra_headers: &[("HTTP-Referer", OPENROUTER_REFERER), ("X-Title", OPENROUTER_TITLE)],
    default_model: Some("google/gemini-flash-1.5-8b"),
};

// The base URL already ends in `/api`, so only `generate` is appended.
const OLLAMA: ProviderProfile = ProviderProfile {
    provider: Provider::Ollama,
    shape: ApiShape::OllamaLike,
    default_base_url: "http://localhost:11434/api",
    endpoint: "generate",
    auth: AuthPolicy::None,
    extra_headers: &[],
    default_model: Some("qwen3:1.7b"),
};

const LMSTUDIO: ProviderProfile = ProviderProfile {
    provider: Provider::LmStudio,
    shape: ApiShape::OpenRouterLike,
    default_base_url: "http://localhost:1234/v1",
    endpoint: "chat/completions",
    auth: AuthPolicy::None,
    extra_headers: &[],
    default_model: Some("default"),
};

const CUSTOM: ProviderProfile = ProviderProfile {
    provider: Provider::Custom,
    shape: ApiShape::OpenRouterLike,
    default_base_url: "",
    endpoint: "chat/completions",
    auth: AuthPolicy::Optional,
    extra_headers: &[],
    default_model: None,
};

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::OpenRouter,
        Provider::Ollama,
        Provider::LmStudio,
        Provider::Custom,
    ];

    /// Identifier persisted in the config directory.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::Ollama => "ollama",
            Provider::LmStudio => "lmstudio",
            Provider::Custom => "custom",
        }
    }

    pub fn profile(&self) -> &'static ProviderProfile {
        match self {
            Provider::OpenRouter => &OPENROUTER,
            Provider::Ollama => &OLLAMA,
            Provider::LmStudio => &LMSTUDIO,
            Provider::Custom => &CUSTOM,
        }
    }

    pub fn shape(&self) -> ApiShape {
        self.profile().shape
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.id() == wanted)
            .ok_or_else(|| ProviderError::UnknownProvider(s.to_string()))
    }
}

impl ProviderProfile {
    /// Full request URL for a base URL.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.endpoint)
    }

    /// Request headers for this provider, given the configured API key.
    pub fn headers(&self, api_key: Option<&str>) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];

        let key = api_key.filter(|k| !k.is_empty());
        match (self.auth, key) {
            (AuthPolicy::Required, _) | (AuthPolicy::Optional, Some(_)) => {
                headers.push((
                    "Authorization".to_string(),
                    format!("Bearer {}", key.unwrap_or_default()),
                ));
            }
            (AuthPolicy::Optional, None) | (AuthPolicy::None, _) => {}
        }

        headers.extend(
            self.extra_headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        headers
    }

    /// Whether a run can proceed with the given key.
    pub fn has_required_key(&self, api_key: Option<&str>) -> bool {
        self.auth != AuthPolicy::Required || api_key.is_some_and(|k| !k.is_empty())
    }
}
