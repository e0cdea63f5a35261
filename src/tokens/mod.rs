//! Token 计数与成本估算模块：统一的计费口径与多方案分词展示。
//!
//! # Token Counting and Cost Estimation
//!
//! Everything that turns text into token counts and token counts into
//! dollars lives here.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`estimate_token_count`] | Deterministic count under one fixed BPE vocabulary, used for accounting |
//! | [`tokenize_for_display`] | Per-scheme token breakdowns (GPT-style BPE and BERT WordPiece) for display |
//! | [`Pricing`] | Per-1K-token rates, embedded in each provider registration record |
//! | [`estimate_cost`] | Pure cost computation from a provider's rates |
//! | [`CostEstimate`] | Itemized cost breakdown for display layers |
//!
//! The accounting count and the display breakdowns are deliberately
//! separate operations: accounting needs one reproducible number, display
//! wants to show how different model families segment the same text.

pub mod counter;
pub mod pricing;
pub mod schemes;

pub use counter::estimate_token_count;
pub use pricing::{estimate_cost, CostEstimate, Pricing};
pub use schemes::{tokenize_for_display, SchemeId, TokenBreakdown, DISPLAY_TOKEN_LIMIT};
