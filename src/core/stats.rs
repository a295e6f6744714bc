//! Corpus and chain statistics for reporting.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::core::chain::{Chain, Token};

/// The `top` most frequent tokens, by descending count. Ties are ordered
/// alphabetically so the table is stable.
pub fn word_frequencies(tokens: &[Token], top: usize) -> Vec<(Token, usize)> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for token in tokens {
        *counts.entry(token.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(Token, usize)> = counts
        .into_iter()
        .map(|(token, count)| (token.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top);
    ranked
}

/// Summary of a built chain relative to the corpus it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSummary {
    pub tokens: usize,
    pub order: usize,
    pub contexts: usize,
    pub transitions: usize,
    /// Distinct corpus windows that never precede a token. A walk that
    /// reaches one of these hits a dead end.
    pub dead_end_contexts: usize,
}

impl ChainSummary {
    pub fn new(tokens: &[Token], chain: &Chain) -> Self {
        let order = chain.order();
        let dead_end_contexts = if order == 0 {
            0
        } else {
            tokens
                .windows(order)
                .filter(|w| !chain.contains(w))
                .collect::<FxHashSet<_>>()
                .len()
        };

        Self {
            tokens: tokens.len(),
            order,
            contexts: chain.len(),
            transitions: chain.transition_count(),
            dead_end_contexts,
        }
    }
}
