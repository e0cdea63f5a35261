//! Credential loading and caller-facing generation options.

use std::env;

use keyring::Entry;
use tracing::debug;

use crate::error::Error;
use crate::providers::{ProviderId, ProviderSpec};

/// Temperature applied when the caller supplies none.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Caller-tunable generation parameters.
///
/// Precedence is explicit: a caller-supplied field always wins; an absent
/// field falls back to the provider-mandated default recorded in the
/// [`ProviderSpec`] (`default_max_tokens`); an absent field with no
/// provider default is omitted from the request. Temperature falls back to
/// [`DEFAULT_TEMPERATURE`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature in `[0, 1]`.
    pub temperature: Option<f64>,
    /// Completion length cap, must be greater than zero.
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Range check, performed before any network call.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(t) = self.temperature {
            if !(0.0..=1.0).contains(&t) {
                return Err(Error::InvalidOptions {
                    message: format!("temperature {t} outside [0, 1]"),
                });
            }
        }
        if self.max_tokens == Some(0) {
            return Err(Error::InvalidOptions {
                message: "max_tokens must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Effective temperature after defaulting.
    pub fn effective_temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Effective completion cap for a provider after defaulting.
    pub fn effective_max_tokens(&self, spec: &ProviderSpec) -> Option<u32> {
        self.max_tokens.or(spec.default_max_tokens)
    }
}

/// One API key per provider, resolved at startup and shared read-only.
#[derive(Clone)]
pub struct Credentials {
    groq: String,
    gemini: String,
    mistral: String,
}

// Keys must never leak through debug logging.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("groq", &"<redacted>")
            .field("gemini", &"<redacted>")
            .field("mistral", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve every provider credential from the OS keyring, falling back
    /// to environment variables. Fails fast, naming every missing
    /// credential at once rather than the first one found.
    pub fn from_env() -> Result<Self, Error> {
        Self::resolve(keyring_then_env)
    }

    /// Resolve through an arbitrary lookup. The lookup receives the
    /// provider's registration record and returns its key, if any.
    pub fn resolve(lookup: impl Fn(&ProviderSpec) -> Option<String>) -> Result<Self, Error> {
        let mut missing = Vec::new();
        let mut get = |provider: ProviderId| {
            let spec = provider.spec();
            lookup(spec).unwrap_or_else(|| {
                missing.push(spec.env_key.to_string());
                String::new()
            })
        };
        let groq = get(ProviderId::Groq);
        let gemini = get(ProviderId::Gemini);
        let mistral = get(ProviderId::Mistral);
        if !missing.is_empty() {
            return Err(Error::MissingCredentials { names: missing });
        }
        Ok(Self {
            groq,
            gemini,
            mistral,
        })
    }

    pub fn key(&self, provider: ProviderId) -> &str {
        match provider {
            ProviderId::Groq => &self.groq,
            ProviderId::Gemini => &self.gemini,
            ProviderId::Mistral => &self.mistral,
        }
    }
}

fn keyring_then_env(spec: &ProviderSpec) -> Option<String> {
    if let Ok(entry) = Entry::new("textlens", spec.id.as_str()) {
        if let Ok(key) = entry.get_password() {
            debug!(provider = %spec.id, "credential resolved from keyring");
            return Some(key);
        }
    }
    env::var(spec.env_key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_missing_reports_every_credential_at_once() {
        let err = Credentials::resolve(|_| None).unwrap_err();
        match err {
            Error::MissingCredentials { names } => {
                assert_eq!(
                    names,
                    vec!["GROQ_API_KEY", "GEMINI_API_KEY", "MISTRAL_API_KEY"]
                );
            }
            other => panic!("expected MissingCredentials, got {other:?}"),
        }
    }

    #[test]
    fn partially_missing_reports_only_the_missing_ones() {
        let err = Credentials::resolve(|spec| {
            (spec.id != ProviderId::Gemini).then(|| "k".to_string())
        })
        .unwrap_err();
        match err {
            Error::MissingCredentials { names } => assert_eq!(names, vec!["GEMINI_API_KEY"]),
            other => panic!("expected MissingCredentials, got {other:?}"),
        }
    }

    #[test]
    fn resolved_keys_are_retrievable_per_provider() {
        let creds =
            Credentials::resolve(|spec| Some(format!("key-{}", spec.id))).unwrap();
        assert_eq!(creds.key(ProviderId::Groq), "key-groq");
        assert_eq!(creds.key(ProviderId::Gemini), "key-gemini");
        assert_eq!(creds.key(ProviderId::Mistral), "key-mistral");
    }

    #[test]
    fn out_of_range_temperature_fails_validation() {
        let opts = GenerationOptions::default().with_temperature(1.5);
        assert!(matches!(
            opts.validate(),
            Err(Error::InvalidOptions { .. })
        ));
    }

    #[test]
    fn zero_max_tokens_fails_validation() {
        let opts = GenerationOptions::default().with_max_tokens(0);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn defaults_validate() {
        assert!(GenerationOptions::default().validate().is_ok());
    }

    #[test]
    fn caller_max_tokens_beats_provider_default() {
        let spec = ProviderId::Mistral.spec();
        let defaulted = GenerationOptions::default();
        let explicit = GenerationOptions::default().with_max_tokens(42);
        assert_eq!(defaulted.effective_max_tokens(spec), Some(300));
        assert_eq!(explicit.effective_max_tokens(spec), Some(42));
    }
}
