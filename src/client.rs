//! Unified client for provider calls.
//!
//! [`Client`] is the adapter boundary of the crate: given a rendered
//! prompt, a provider, a model and generation options it performs exactly
//! one HTTP call and returns either extracted text or a tagged error,
//! never an unhandled fault.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Credentials, GenerationOptions};
use crate::drivers::driver_for;
use crate::error::Error;
use crate::providers::ProviderId;
use crate::tasks::ChatAdapter;
use crate::transport::HttpTransport;
use crate::Result;

#[derive(Debug, Clone)]
pub struct Client {
    transport: HttpTransport,
    credentials: Credentials,
    base_url_overrides: HashMap<ProviderId, String>,
}

/// Builder for [`Client`]. Credentials default to
/// [`Credentials::from_env`]; the base-url override exists for tests and
/// self-hosted gateways.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    timeout: Option<Duration>,
    credentials: Option<Credentials>,
    base_url_overrides: HashMap<ProviderId, String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url_override(mut self, provider: ProviderId, url: impl Into<String>) -> Self {
        self.base_url_overrides.insert(provider, url.into());
        self
    }

    pub fn build(self) -> Result<Client> {
        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => Credentials::from_env()?,
        };
        Ok(Client {
            transport: HttpTransport::new(self.timeout)?,
            credentials,
            base_url_overrides: self.base_url_overrides,
        })
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Perform one provider call and extract the generated text.
    ///
    /// `model` defaults to the provider's registered model. Transport
    /// failures, non-2xx statuses and unparseable bodies come back as
    /// tagged errors in the `Result`; a parseable body missing the
    /// expected fields degrades to an empty string.
    pub async fn call_provider(
        &self,
        prompt: &str,
        provider: ProviderId,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<String> {
        options.validate()?;
        let spec = provider.spec();
        let model = model.unwrap_or(spec.default_model);
        let driver = driver_for(spec.api_style);

        let body = driver.build_body(spec, prompt, model, options);
        let url = spec.chat_url(
            self.base_url_overrides.get(&provider).map(String::as_str),
            model,
        );

        debug!(%provider, model, "dispatching provider call");
        let raw = self
            .transport
            .post_json(&url, spec.auth, self.credentials.key(provider), &body)
            .await?;

        let json: Value = serde_json::from_str(&raw).map_err(|e| Error::ResponseShape {
            provider,
            detail: e.to_string(),
        })?;

        let text = driver.extract_text(&json);
        if text.is_empty() {
            warn!(%provider, model, "no extractable text in provider response");
        }
        Ok(text)
    }
}

#[async_trait]
impl ChatAdapter for Client {
    async fn generate(
        &self,
        prompt: &str,
        provider: ProviderId,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<String> {
        self.call_provider(prompt, provider, model, options).await
    }
}
