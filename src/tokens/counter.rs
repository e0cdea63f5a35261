//! Deterministic token counting for accounting.

use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;

// The accounting estimate uses one fixed vocabulary so cost figures are
// reproducible across runs and providers. cl100k_base is the sub-word
// vocabulary shared by the common chat models.
static CL100K: Lazy<CoreBPE> =
    Lazy::new(|| tiktoken_rs::cl100k_base().expect("embedded cl100k_base vocabulary"));

/// Shared cl100k vocabulary, also used by the display schemes.
pub(crate) fn cl100k() -> &'static CoreBPE {
    Lazy::force(&CL100K)
}

/// Approximate token count of `text` under the cl100k_base BPE vocabulary.
///
/// Deterministic and pure. Empty and whitespace-only input counts as zero
/// tokens, matching what any provider would bill for it in practice.
pub fn estimate_token_count(text: &str) -> usize {
    if text.trim().is_empty() {
        return 0;
    }
    CL100K.encode_with_special_tokens(text).len()
}
