//! Provider 注册表 — 每个厂商一条静态注册记录，端点、鉴权、默认模型与价格不再分表维护
//!
//! Provider registry. Each supported provider is described by exactly one
//! static [`ProviderSpec`] record carrying its endpoint, auth scheme,
//! default model, provider-mandated generation defaults, credential source
//! and per-1K-token prices. Request shaping, cost accounting and credential
//! loading all consult the same record, so the tables cannot drift apart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::tokens::pricing::Pricing;

/// Closed set of supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Groq,
    Gemini,
    Mistral,
}

impl ProviderId {
    /// All supported providers, in display order.
    pub const ALL: [ProviderId; 3] = [ProviderId::Groq, ProviderId::Gemini, ProviderId::Mistral];

    /// The registration record for this provider.
    pub fn spec(self) -> &'static ProviderSpec {
        match self {
            ProviderId::Groq => &GROQ,
            ProviderId::Gemini => &GEMINI,
            ProviderId::Mistral => &MISTRAL,
        }
    }

    /// Stable lowercase identifier, as used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Groq => "groq",
            ProviderId::Gemini => "gemini",
            ProviderId::Mistral => "mistral",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "groq" => Ok(ProviderId::Groq),
            "gemini" => Ok(ProviderId::Gemini),
            "mistral" => Ok(ProviderId::Mistral),
            other => Err(Error::UnsupportedProvider {
                name: other.to_string(),
            }),
        }
    }
}

/// Wire format family a provider speaks. Two styles cover the current set:
/// groq and mistral are OpenAI-compatible chat completions, gemini uses the
/// generateContent shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStyle {
    OpenAiCompatible,
    GeminiGenerate,
}

/// How the credential is attached to an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>` header.
    BearerHeader,
    /// API key as a query-string parameter with the given name.
    QueryKey(&'static str),
}

/// Static registration record for one provider.
#[derive(Debug)]
pub struct ProviderSpec {
    pub id: ProviderId,
    pub api_style: ApiStyle,
    /// Scheme + host, no trailing slash.
    pub base_url: &'static str,
    /// Path template appended to the base URL. `{model}` is interpolated.
    pub chat_path: &'static str,
    pub auth: AuthScheme,
    pub default_model: &'static str,
    /// Applied when the caller does not supply `max_tokens`. `None` omits
    /// the field from the request entirely.
    pub default_max_tokens: Option<u32>,
    /// Environment variable holding the API key.
    pub env_key: &'static str,
    /// USD per 1000 tokens.
    pub pricing: Pricing,
}

impl ProviderSpec {
    /// Full chat endpoint URL for the given model.
    pub fn chat_url(&self, base_override: Option<&str>, model: &str) -> String {
        let base = base_override.unwrap_or(self.base_url);
        format!(
            "{}{}",
            base.trim_end_matches('/'),
            self.chat_path.replace("{model}", model)
        )
    }
}

static GROQ: ProviderSpec = ProviderSpec {
    id: ProviderId::Groq,
    api_style: ApiStyle::OpenAiCompatible,
    base_url: "https://api.groq.com",
    chat_path: "/openai/v1/chat/completions",
    auth: AuthScheme::BearerHeader,
    default_model: "llama3-8b-8192",
    default_max_tokens: None,
    env_key: "GROQ_API_KEY",
    pricing: Pricing {
        prompt_per_1k: 0.002,
        completion_per_1k: 0.002,
    },
};

static GEMINI: ProviderSpec = ProviderSpec {
    id: ProviderId::Gemini,
    api_style: ApiStyle::GeminiGenerate,
    base_url: "https://generativelanguage.googleapis.com",
    chat_path: "/v1/models/{model}:generateContent",
    auth: AuthScheme::QueryKey("key"),
    default_model: "gemini-2.0-flash",
    default_max_tokens: Some(1024),
    env_key: "GEMINI_API_KEY",
    pricing: Pricing {
        prompt_per_1k: 0.001,
        completion_per_1k: 0.001,
    },
};

static MISTRAL: ProviderSpec = ProviderSpec {
    id: ProviderId::Mistral,
    api_style: ApiStyle::OpenAiCompatible,
    base_url: "https://api.mistral.ai",
    chat_path: "/v1/chat/completions",
    auth: AuthScheme::BearerHeader,
    default_model: "devstral-medium-2507",
    default_max_tokens: Some(300),
    env_key: "MISTRAL_API_KEY",
    pricing: Pricing {
        prompt_per_1k: 0.0005,
        completion_per_1k: 0.0005,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_ids_round_trip() {
        for provider in ProviderId::ALL {
            let spec = provider.spec();
            assert_eq!(spec.id, provider);
            assert_eq!(provider.as_str().parse::<ProviderId>().unwrap(), provider);
        }
    }

    #[test]
    fn unknown_provider_is_rejected_at_parse() {
        let err = "openai".parse::<ProviderId>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedProvider { ref name } if name == "openai"));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Groq".parse::<ProviderId>().unwrap(), ProviderId::Groq);
        assert_eq!("MISTRAL".parse::<ProviderId>().unwrap(), ProviderId::Mistral);
    }

    #[test]
    fn chat_url_interpolates_model() {
        let url = ProviderId::Gemini.spec().chat_url(None, "gemini-2.0-flash");
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn chat_url_honors_base_override() {
        let url = ProviderId::Groq
            .spec()
            .chat_url(Some("http://127.0.0.1:1234/"), "llama3-8b-8192");
        assert_eq!(url, "http://127.0.0.1:1234/openai/v1/chat/completions");
    }

    #[test]
    fn every_spec_has_positive_rates() {
        for provider in ProviderId::ALL {
            let pricing = &provider.spec().pricing;
            assert!(pricing.prompt_per_1k > 0.0);
            assert!(pricing.completion_per_1k > 0.0);
        }
    }
}
