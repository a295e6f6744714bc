//! Text normalization: turn raw text into the token sequence a chain is
//! built from, and back into display text.

use crate::core::chain::{Context, Token};

/// Controls how raw text is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    /// Drop ASCII punctuation characters (they are removed, not replaced
    /// by spaces, so "don't" becomes "dont").
    pub strip_punctuation: bool,
    pub lowercase: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            strip_punctuation: true,
            lowercase: true,
        }
    }
}

impl Normalizer {
    /// Split text on whitespace after applying the configured
    /// normalization. Line breaks count as whitespace.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let cleaned: String = if self.strip_punctuation {
            text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
        } else {
            text.to_string()
        };
        let cleaned = if self.lowercase {
            cleaned.to_lowercase()
        } else {
            cleaned
        };
        cleaned.split_whitespace().map(str::to_string).collect()
    }

    /// Normalize user-entered seed words into a start context of `k` tokens.
    ///
    /// Extra words beyond the first `k` are ignored. Returns `None` when
    /// fewer than `k` words remain after normalization.
    pub fn parse_start_context(&self, input: &str, k: usize) -> Option<Context> {
        let mut tokens = self.tokenize(input);
        if k == 0 || tokens.len() < k {
            return None;
        }
        tokens.truncate(k);
        Some(Context::new(tokens))
    }
}

/// Join tokens into display text.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens.join(" ")
}
