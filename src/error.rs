use crate::providers::ProviderId;
use thiserror::Error;

/// Unified error type for the textlens core.
///
/// This aggregates all low-level failures into actionable, high-level
/// categories. The adapter boundary (`Client::call_provider`) guarantees
/// that every failure below it is carried in the `Result` value; nothing
/// panics past that boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider identifier outside the supported set. Raised at the string
    /// parsing boundary, before any network activity.
    #[error("Provider '{name}' is not supported (expected one of: groq, gemini, mistral)")]
    UnsupportedProvider { name: String },

    /// Network failure, timeout, or non-2xx status from a provider.
    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    /// Provider returned a body that could not be parsed as JSON.
    ///
    /// A body that parses but is missing the expected extraction path is
    /// NOT this error: it degrades to empty text so a display layer never
    /// crashes on schema drift from a third-party API.
    #[error("Malformed response from {provider}: {detail}")]
    ResponseShape { provider: ProviderId, detail: String },

    /// One or more provider credentials absent at startup. Lists every
    /// missing credential at once rather than failing on the first.
    #[error("Missing credentials: {}", names.join(", "))]
    MissingCredentials { names: Vec<String> },

    /// Caller-supplied generation options out of range. Fails before any
    /// network call.
    #[error("Invalid generation options: {message}")]
    InvalidOptions { message: String },
}

impl Error {
    /// True when the error should abort process initialization rather than
    /// be recovered into a per-task result.
    pub fn is_startup(&self) -> bool {
        matches!(self, Error::MissingCredentials { .. })
    }
}
