//! Provider 驱动层 — 以翻译表方式完成各厂商请求/响应格式的适配
//!
//! Per-API-style request/response drivers. Each wire format the registry
//! declares has one driver: request shaping and text extraction are a
//! translation table, not ad hoc branching at the call site. Drivers are
//! stateless; the transport layer owns the HTTP call and auth.

pub mod gemini;

use serde_json::Value;

use crate::config::GenerationOptions;
use crate::providers::{ApiStyle, ProviderSpec};

pub use gemini::GeminiDriver;

/// Request shaping and response extraction for one wire format.
///
/// Extraction is deliberately lenient: a response that parses as JSON but
/// lacks the expected path yields an empty string, never a fault, so a
/// display layer survives schema drift from a third-party API.
pub trait ChatDriver: Send + Sync + std::fmt::Debug {
    /// Wire format this driver implements.
    fn api_style(&self) -> ApiStyle;

    /// Build the JSON request body for a single-turn prompt.
    fn build_body(
        &self,
        spec: &ProviderSpec,
        prompt: &str,
        model: &str,
        options: &GenerationOptions,
    ) -> Value;

    /// Pull the generated text out of a parsed response body.
    fn extract_text(&self, body: &Value) -> String;
}

/// OpenAI-compatible chat completions — serves groq and mistral.
#[derive(Debug)]
pub struct OpenAiCompatDriver;

impl ChatDriver for OpenAiCompatDriver {
    fn api_style(&self) -> ApiStyle {
        ApiStyle::OpenAiCompatible
    }

    fn build_body(
        &self,
        spec: &ProviderSpec,
        prompt: &str,
        model: &str,
        options: &GenerationOptions,
    ) -> Value {
        let mut body = serde_json::json!({
            "model": model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": options.effective_temperature(),
        });
        if let Some(max_tokens) = options.effective_max_tokens(spec) {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }

    fn extract_text(&self, body: &Value) -> String {
        body.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

static OPENAI_COMPAT: OpenAiCompatDriver = OpenAiCompatDriver;
static GEMINI: GeminiDriver = GeminiDriver;

/// Resolve the driver for a registry-declared wire format.
pub fn driver_for(style: ApiStyle) -> &'static dyn ChatDriver {
    match style {
        ApiStyle::OpenAiCompatible => &OPENAI_COMPAT,
        ApiStyle::GeminiGenerate => &GEMINI,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderId;

    #[test]
    fn groq_body_is_a_chat_message_array() {
        let spec = ProviderId::Groq.spec();
        let body = OpenAiCompatDriver.build_body(
            spec,
            "Hello",
            "llama3-8b-8192",
            &GenerationOptions::default(),
        );
        assert_eq!(body["model"], "llama3-8b-8192");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
        assert_eq!(body["temperature"], 0.2);
        // groq mandates no completion cap by default
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn mistral_body_carries_the_mandated_completion_cap() {
        let spec = ProviderId::Mistral.spec();
        let body = OpenAiCompatDriver.build_body(
            spec,
            "Hi",
            "devstral-medium-2507",
            &GenerationOptions::default(),
        );
        assert_eq!(body["max_tokens"], 300);
    }

    #[test]
    fn caller_options_override_provider_defaults() {
        let spec = ProviderId::Mistral.spec();
        let options = GenerationOptions::default()
            .with_temperature(0.9)
            .with_max_tokens(64);
        let body = OpenAiCompatDriver.build_body(spec, "Hi", "devstral-medium-2507", &options);
        assert_eq!(body["temperature"], 0.9);
        assert_eq!(body["max_tokens"], 64);
    }

    #[test]
    fn extracts_first_choice_message_content() {
        let body = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Hi there!" }, "finish_reason": "stop" }
            ],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
        });
        assert_eq!(OpenAiCompatDriver.extract_text(&body), "Hi there!");
    }

    #[test]
    fn missing_choices_degrade_to_empty_text() {
        assert_eq!(
            OpenAiCompatDriver.extract_text(&serde_json::json!({ "choices": [] })),
            ""
        );
        assert_eq!(
            OpenAiCompatDriver.extract_text(&serde_json::json!({ "unexpected": true })),
            ""
        );
    }

    #[test]
    fn driver_for_covers_every_style() {
        for provider in ProviderId::ALL {
            let spec = provider.spec();
            assert_eq!(driver_for(spec.api_style).api_style(), spec.api_style);
        }
    }
}
