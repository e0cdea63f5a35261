//! 多方案分词展示 — 同一文本在不同子词词表下的切分结果，供界面对比展示
//!
//! Display-oriented tokenizer breakdowns. The same text is run through
//! several named tokenization schemes so a display layer can show how
//! different model families would segment it. Scheme failures are isolated:
//! a scheme that cannot tokenize the input sanitizes it and retries once,
//! then degrades to a zero-count breakdown without aborting the others.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;
use tracing::{debug, warn};

/// Token lists are truncated to this many entries for display; the count
/// always reflects the full tokenization.
pub const DISPLAY_TOKEN_LIMIT: usize = 50;

/// Named tokenization schemes available for display breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchemeId {
    /// GPT-2 byte-level BPE (r50k_base).
    #[serde(rename = "gpt2")]
    Gpt2,
    /// cl100k_base BPE, the vocabulary of the common chat models.
    #[serde(rename = "cl100k")]
    Cl100k,
    /// BERT WordPiece, lowercased.
    #[serde(rename = "bert-base-uncased")]
    BertBaseUncased,
}

impl SchemeId {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemeId::Gpt2 => "gpt2",
            SchemeId::Cl100k => "cl100k",
            SchemeId::BertBaseUncased => "bert-base-uncased",
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheme's view of a text: the first [`DISPLAY_TOKEN_LIMIT`] token
/// strings plus the full count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenBreakdown {
    pub tokens: Vec<String>,
    pub count: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct SchemeError(String);

trait TokenizerScheme: Send + Sync {
    fn id(&self) -> SchemeId;
    fn tokenize(&self, text: &str) -> Result<TokenBreakdown, SchemeError>;
}

struct BpeScheme {
    id: SchemeId,
    bpe: fn() -> &'static CoreBPE,
}

static R50K: Lazy<CoreBPE> =
    Lazy::new(|| tiktoken_rs::r50k_base().expect("embedded r50k_base vocabulary"));

fn r50k() -> &'static CoreBPE {
    Lazy::force(&R50K)
}

impl TokenizerScheme for BpeScheme {
    fn id(&self) -> SchemeId {
        self.id
    }

    fn tokenize(&self, text: &str) -> Result<TokenBreakdown, SchemeError> {
        let bpe = (self.bpe)();
        let ids = bpe.encode_with_special_tokens(text);
        let tokens = ids
            .iter()
            .take(DISPLAY_TOKEN_LIMIT)
            // Byte-level BPE tokens need not align with UTF-8 boundaries;
            // an undecodable token renders as the replacement character.
            .map(|&id| {
                bpe.decode(vec![id])
                    .unwrap_or_else(|_| "\u{fffd}".to_string())
            })
            .collect();
        Ok(TokenBreakdown {
            tokens,
            count: ids.len(),
        })
    }
}

/// WordPiece scheme backed by the `tokenizers` crate. The tokenizer file is
/// taken from `TEXTLENS_BERT_TOKENIZER` when set, otherwise fetched once
/// through the hf-hub cache. When neither source is available the scheme
/// reports failure and the isolation policy degrades it to a zero count.
struct BertScheme;

static BERT: Lazy<Option<tokenizers::Tokenizer>> = Lazy::new(|| match bert_tokenizer_file() {
    Ok(path) => match tokenizers::Tokenizer::from_file(&path) {
        Ok(tok) => {
            debug!(path = %path.display(), "bert tokenizer loaded");
            Some(tok)
        }
        Err(e) => {
            warn!(error = %e, path = %path.display(), "bert tokenizer load failed");
            None
        }
    },
    Err(e) => {
        warn!(error = %e, "bert tokenizer unavailable");
        None
    }
});

fn bert_tokenizer_file() -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
    if let Ok(path) = env::var("TEXTLENS_BERT_TOKENIZER") {
        return Ok(PathBuf::from(path));
    }
    let api = hf_hub::api::sync::ApiBuilder::new().build()?;
    let repo = api.model("bert-base-uncased".to_string());
    Ok(repo.get("tokenizer.json")?)
}

impl TokenizerScheme for BertScheme {
    fn id(&self) -> SchemeId {
        SchemeId::BertBaseUncased
    }

    fn tokenize(&self, text: &str) -> Result<TokenBreakdown, SchemeError> {
        let tokenizer = BERT
            .as_ref()
            .ok_or_else(|| SchemeError("wordpiece tokenizer unavailable".into()))?;
        let encoding = tokenizer
            .encode(text, false)
            .map_err(|e| SchemeError(e.to_string()))?;
        let all = encoding.get_tokens();
        Ok(TokenBreakdown {
            tokens: all.iter().take(DISPLAY_TOKEN_LIMIT).cloned().collect(),
            count: all.len(),
        })
    }
}

static SCHEMES: Lazy<Vec<Box<dyn TokenizerScheme>>> = Lazy::new(|| {
    vec![
        Box::new(BpeScheme {
            id: SchemeId::Gpt2,
            bpe: r50k,
        }),
        Box::new(BpeScheme {
            id: SchemeId::Cl100k,
            bpe: super::counter::cl100k,
        }),
        Box::new(BertScheme),
    ]
});

/// Tokenize `text` under every registered scheme for display purposes.
///
/// Empty and whitespace-only input yields a zero breakdown for every
/// scheme. One scheme's failure never blocks another scheme's result.
pub fn tokenize_for_display(text: &str) -> BTreeMap<SchemeId, TokenBreakdown> {
    run_schemes(text, SCHEMES.iter().map(|scheme| scheme.as_ref()))
}

fn run_schemes<'a>(
    text: &str,
    schemes: impl Iterator<Item = &'a dyn TokenizerScheme>,
) -> BTreeMap<SchemeId, TokenBreakdown> {
    let blank = text.trim().is_empty();
    let mut out = BTreeMap::new();
    for scheme in schemes {
        if blank {
            out.insert(scheme.id(), TokenBreakdown::default());
            continue;
        }
        let breakdown = match scheme.tokenize(text) {
            Ok(b) => b,
            Err(first) => {
                // Unusual input: drop problematic characters and retry once.
                let cleaned = sanitize(text);
                match scheme.tokenize(&cleaned) {
                    Ok(b) => b,
                    Err(second) => {
                        warn!(
                            scheme = %scheme.id(),
                            error = %first,
                            retry_error = %second,
                            "tokenization scheme degraded to zero count"
                        );
                        TokenBreakdown::default()
                    }
                }
            }
        };
        out.insert(scheme.id(), breakdown);
    }
    out
}

fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .filter(|&c| c != '\u{fffd}')
        .collect()
}
