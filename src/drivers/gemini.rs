//! Gemini generateContent 驱动 — 适配 Google 特有的请求与响应结构
//!
//! Google Gemini generateContent driver. Key differences from the
//! OpenAI-compatible shape:
//! - `contents[].parts[].text` instead of a `messages` array.
//! - Generation parameters live under `generationConfig`; the completion
//!   cap is `maxOutputTokens`.
//! - Response text sits at `candidates[0].content.parts[0].text`.
//! - The model name is part of the URL path, not the body; the API key is
//!   a `?key=` query parameter (see the registry record).

use serde_json::Value;

use crate::config::GenerationOptions;
use crate::providers::{ApiStyle, ProviderSpec};

use super::ChatDriver;

// Sampling defaults the upstream API applies for this endpoint.
const TOP_P: f64 = 0.8;
const TOP_K: u32 = 40;

#[derive(Debug)]
pub struct GeminiDriver;

impl ChatDriver for GeminiDriver {
    fn api_style(&self) -> ApiStyle {
        ApiStyle::GeminiGenerate
    }

    fn build_body(
        &self,
        spec: &ProviderSpec,
        prompt: &str,
        _model: &str,
        options: &GenerationOptions,
    ) -> Value {
        let mut generation_config = serde_json::json!({
            "temperature": options.effective_temperature(),
            "topP": TOP_P,
            "topK": TOP_K,
        });
        if let Some(max_tokens) = options.effective_max_tokens(spec) {
            generation_config["maxOutputTokens"] = serde_json::json!(max_tokens);
        }

        serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": generation_config,
        })
    }

    fn extract_text(&self, body: &Value) -> String {
        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderId;

    #[test]
    fn body_uses_contents_parts_and_generation_config() {
        let spec = ProviderId::Gemini.spec();
        let body = GeminiDriver.build_body(
            spec,
            "Summarize this.",
            "gemini-2.0-flash",
            &GenerationOptions::default(),
        );
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Summarize this.");
        assert_eq!(body["generationConfig"]["temperature"], 0.2);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(body["generationConfig"]["topP"], 0.8);
        assert_eq!(body["generationConfig"]["topK"], 40);
        // model travels in the URL, never the body
        assert!(body.get("model").is_none());
    }

    #[test]
    fn caller_max_tokens_overrides_the_default_cap() {
        let spec = ProviderId::Gemini.spec();
        let options = GenerationOptions::default().with_max_tokens(256);
        let body = GeminiDriver.build_body(spec, "Hi", "gemini-2.0-flash", &options);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let body = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "A summary." } ], "role": "model" },
                  "finishReason": "STOP" }
            ],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4 }
        });
        assert_eq!(GeminiDriver.extract_text(&body), "A summary.");
    }

    #[test]
    fn empty_candidates_degrade_to_empty_text() {
        assert_eq!(
            GeminiDriver.extract_text(&serde_json::json!({ "candidates": [] })),
            ""
        );
    }
}
