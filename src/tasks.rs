//! 任务执行层 — 渲染提示词、计量 token 与延迟，统一产出 TaskResult
//!
//! Task execution. A task kind picks a prompt template, the runner renders
//! it, counts prompt tokens, performs the provider call, counts completion
//! tokens, measures wall-clock latency and packages everything into a
//! uniform [`TaskResult`]. Adapter failures land in `TaskResult::error`;
//! they are never fatal to the caller or to sibling tasks.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GenerationOptions;
use crate::error::Error;
use crate::providers::ProviderId;
use crate::tokens::estimate_token_count;
use crate::Result;

/// The supported analysis operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Summarize,
    Sentiment,
    Style,
}

impl TaskKind {
    /// All task kinds, in the order an analysis run issues them.
    pub const ALL: [TaskKind; 3] = [TaskKind::Summarize, TaskKind::Sentiment, TaskKind::Style];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Summarize => "summarize",
            TaskKind::Sentiment => "sentiment",
            TaskKind::Style => "style",
        }
    }

    /// The fixed instruction template for this task. Exactly one
    /// substitution point (`{text}`) for the user text.
    fn template(self) -> &'static str {
        match self {
            TaskKind::Summarize => {
                "You are a concise summarizer.\n\
                 Produce a 3-sentence summary of the text below.\n\
                 Output only JSON: { \"summary\": \"...\" }\n\
                 \n\
                 Text:\n\
                 {text}\n"
            }
            TaskKind::Sentiment => {
                "Classify sentiment: Positive / Neutral / Negative.\n\
                 Provide justification in JSON: { \"label\": \"...\", \"reason\": \"...\" }\n\
                 \n\
                 Text:\n\
                 {text}\n"
            }
            TaskKind::Style => {
                "Analyze writing style: Formal / Informal / Neutral.\n\
                 Rate complexity: Simple / Medium / Complex.\n\
                 Give 2 examples in JSON: { \"style\": \"...\", \"complexity\": \"...\", \"examples\": [\"...\", \"...\"] }\n\
                 \n\
                 Text:\n\
                 {text}\n"
            }
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "summarize" => Ok(TaskKind::Summarize),
            "sentiment" => Ok(TaskKind::Sentiment),
            "style" => Ok(TaskKind::Style),
            other => Err(Error::InvalidOptions {
                message: format!("unknown task kind '{other}'"),
            }),
        }
    }
}

/// Render a task's prompt. The user text is substituted verbatim; the
/// template has a single placeholder, so no escaping is needed.
pub fn render_prompt(kind: TaskKind, text: &str) -> String {
    kind.template().replace("{text}", text)
}

/// Uniform result of one task invocation.
///
/// A result with `error` set is non-fatal: one task's failure must not
/// prevent sibling tasks from running or being reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub output_text: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub latency_seconds: f64,
    pub error: Option<String>,
}

impl TaskResult {
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// The single seam between task execution and provider I/O. [`crate::Client`]
/// is the production implementation; tests substitute mocks.
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        provider: ProviderId,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<String>;
}

/// Executes analysis tasks against a [`ChatAdapter`].
#[derive(Clone)]
pub struct TaskRunner {
    adapter: Arc<dyn ChatAdapter>,
}

impl TaskRunner {
    pub fn new(adapter: Arc<dyn ChatAdapter>) -> Self {
        Self { adapter }
    }

    /// Run one task: render, count, call, count, time, package.
    pub async fn run(
        &self,
        kind: TaskKind,
        text: &str,
        provider: ProviderId,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> TaskResult {
        let prompt = render_prompt(kind, text);
        let prompt_tokens = estimate_token_count(&prompt) as u64;

        let start = Instant::now();
        match self.adapter.generate(&prompt, provider, model, options).await {
            Ok(output_text) => {
                let completion_tokens = estimate_token_count(&output_text) as u64;
                let latency_seconds = start.elapsed().as_secs_f64();
                debug!(%kind, %provider, prompt_tokens, completion_tokens, latency_seconds, "task completed");
                TaskResult {
                    output_text,
                    prompt_tokens,
                    completion_tokens,
                    latency_seconds,
                    error: None,
                }
            }
            Err(e) => {
                let latency_seconds = start.elapsed().as_secs_f64();
                warn!(%kind, %provider, error = %e, "task failed");
                TaskResult {
                    output_text: String::new(),
                    prompt_tokens,
                    completion_tokens: 0,
                    latency_seconds,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub async fn summarize(
        &self,
        text: &str,
        provider: ProviderId,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> TaskResult {
        self.run(TaskKind::Summarize, text, provider, model, options)
            .await
    }

    pub async fn sentiment(
        &self,
        text: &str,
        provider: ProviderId,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> TaskResult {
        self.run(TaskKind::Sentiment, text, provider, model, options)
            .await
    }

    pub async fn style(
        &self,
        text: &str,
        provider: ProviderId,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> TaskResult {
        self.run(TaskKind::Style, text, provider, model, options).await
    }

    /// Run all three task kinds sequentially against one provider.
    ///
    /// Failures are isolated per task: every kind gets a result slot, and
    /// an error in one slot never suppresses the others.
    pub async fn run_all(
        &self,
        text: &str,
        provider: ProviderId,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> Vec<(TaskKind, TaskResult)> {
        let mut results = Vec::with_capacity(TaskKind::ALL.len());
        for kind in TaskKind::ALL {
            let result = self.run(kind, text, provider, model, options).await;
            results.push((kind, result));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;

    struct EchoAdapter;

    #[async_trait]
    impl ChatAdapter for EchoAdapter {
        async fn generate(
            &self,
            prompt: &str,
            _provider: ProviderId,
            _model: Option<&str>,
            _options: &GenerationOptions,
        ) -> Result<String> {
            Ok(format!("echo of {} bytes", prompt.len()))
        }
    }

    struct FailsOnSentiment;

    #[async_trait]
    impl ChatAdapter for FailsOnSentiment {
        async fn generate(
            &self,
            prompt: &str,
            _provider: ProviderId,
            _model: Option<&str>,
            _options: &GenerationOptions,
        ) -> Result<String> {
            if prompt.contains("Classify sentiment") {
                return Err(Error::Transport(TransportError::Other(
                    "connection refused".into(),
                )));
            }
            Ok("fine".into())
        }
    }

    #[test]
    fn render_substitutes_text_verbatim() {
        let prompt = render_prompt(TaskKind::Summarize, "line one\nline two");
        assert!(prompt.contains("Text:\nline one\nline two"));
        assert!(!prompt.contains("{text}"));
    }

    #[test]
    fn each_kind_has_exactly_one_placeholder() {
        for kind in TaskKind::ALL {
            assert_eq!(kind.template().matches("{text}").count(), 1);
        }
    }

    #[tokio::test]
    async fn round_trip_counts_both_sides() {
        let runner = TaskRunner::new(Arc::new(EchoAdapter));
        let result = runner
            .run(
                TaskKind::Summarize,
                "Artificial Intelligence is transforming industries worldwide.",
                ProviderId::Groq,
                None,
                &GenerationOptions::default(),
            )
            .await;

        assert!(result.error.is_none());
        assert!(result.prompt_tokens > 0);
        assert_eq!(
            result.completion_tokens,
            estimate_token_count(&result.output_text) as u64
        );
        assert!(result.latency_seconds >= 0.0);
    }

    #[tokio::test]
    async fn adapter_failure_lands_in_the_result() {
        let runner = TaskRunner::new(Arc::new(FailsOnSentiment));
        let result = runner
            .sentiment("some text", ProviderId::Mistral, None, &GenerationOptions::default())
            .await;

        assert!(result.is_err());
        assert!(result.output_text.is_empty());
        assert_eq!(result.completion_tokens, 0);
        // prompt-side accounting still happened
        assert!(result.prompt_tokens > 0);
        assert!(result.error.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn one_failing_task_never_blocks_the_others() {
        let runner = TaskRunner::new(Arc::new(FailsOnSentiment));
        let results = runner
            .run_all("some text", ProviderId::Groq, None, &GenerationOptions::default())
            .await;

        assert_eq!(results.len(), 3);
        for (kind, result) in &results {
            match kind {
                TaskKind::Sentiment => assert!(result.is_err()),
                _ => {
                    assert!(result.error.is_none());
                    assert_eq!(result.output_text, "fine");
                }
            }
        }
    }

    #[tokio::test]
    async fn concurrent_runs_share_an_accumulator_without_lost_updates() {
        use crate::tokens::estimate_cost;
        use crate::usage::UsageAccumulator;

        let runner = TaskRunner::new(Arc::new(EchoAdapter));
        let usage = Arc::new(UsageAccumulator::new());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let runner = runner.clone();
            let usage = Arc::clone(&usage);
            handles.push(tokio::spawn(async move {
                let result = runner
                    .run(
                        TaskKind::Style,
                        "concurrent input",
                        ProviderId::Gemini,
                        None,
                        &GenerationOptions::default(),
                    )
                    .await;
                let cost = estimate_cost(
                    ProviderId::Gemini,
                    result.prompt_tokens,
                    result.completion_tokens,
                );
                usage.accumulate(result.prompt_tokens, result.completion_tokens, cost);
                result.total_tokens()
            }));
        }

        let mut expected = 0;
        for handle in handles {
            expected += handle.await.expect("task panicked");
        }
        assert_eq!(usage.total_tokens(), expected);
    }

    #[test]
    fn task_kind_parses_and_rejects() {
        assert_eq!("summarize".parse::<TaskKind>().unwrap(), TaskKind::Summarize);
        assert!("translate".parse::<TaskKind>().is_err());
    }
}
