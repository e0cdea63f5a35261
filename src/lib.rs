//! # textlens
//!
//! 多厂商文本分析核心库：统一的请求适配、token 估算与成本核算。
//!
//! Multi-provider text analysis core. One calling convention over several
//! hosted LLM APIs, plus the token estimation and cost accounting a
//! display layer needs to show what an analysis run cost.
//!
//! ## Overview
//!
//! The crate normalizes three provider HTTP APIs (groq, gemini, mistral)
//! behind a single adapter boundary, runs the three analysis task kinds
//! (summarize, sentiment, style) through it, and accounts for tokens and
//! dollars along the way. There is deliberately no retry policy, no rate
//! limiting, no streaming and no conversation state: this is an accounting
//! and adaptation layer over single-shot remote calls, not an LLM runtime.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use textlens::{Client, GenerationOptions, ProviderId, TaskKind, TaskRunner};
//! use textlens::{estimate_cost, UsageAccumulator};
//!
//! #[tokio::main]
//! async fn main() -> textlens::Result<()> {
//!     // Fails fast if any provider credential is missing, naming all of them.
//!     let client = Client::builder().build()?;
//!     let runner = TaskRunner::new(Arc::new(client));
//!     let usage = UsageAccumulator::new();
//!
//!     let result = runner
//!         .run(
//!             TaskKind::Summarize,
//!             "Artificial Intelligence is transforming industries worldwide.",
//!             ProviderId::Groq,
//!             None,
//!             &GenerationOptions::default(),
//!         )
//!         .await;
//!
//!     if result.error.is_none() {
//!         let cost = estimate_cost(
//!             ProviderId::Groq,
//!             result.prompt_tokens,
//!             result.completion_tokens,
//!         );
//!         usage.accumulate(result.prompt_tokens, result.completion_tokens, cost);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`providers`] | One static registration record per provider: endpoint, auth, default model, prices |
//! | [`drivers`] | Per-wire-format request shaping and lenient response extraction |
//! | [`transport`] | Shared HTTP transport: auth application, timeout, status handling |
//! | [`client`] | The adapter boundary: one call in, text or tagged error out |
//! | [`tasks`] | Prompt templates, task runner, uniform `TaskResult` |
//! | [`tokens`] | Token counting, display tokenization schemes, pricing |
//! | [`usage`] | Session-scoped monotonic usage accounting |
//! | [`config`] | Credential resolution and generation options |

pub mod client;
pub mod config;
pub mod drivers;
pub mod providers;
pub mod tasks;
pub mod tokens;
pub mod transport;
pub mod usage;

/// Error type for the library
pub mod error;
pub use error::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the surface a display layer consumes
pub use client::{Client, ClientBuilder};
pub use config::{Credentials, GenerationOptions};
pub use providers::{ProviderId, ProviderSpec};
pub use tasks::{render_prompt, ChatAdapter, TaskKind, TaskResult, TaskRunner};
pub use tokens::{
    estimate_cost, estimate_token_count, tokenize_for_display, CostEstimate, SchemeId,
    TokenBreakdown,
};
pub use usage::{UsageAccumulator, UsageSnapshot};
