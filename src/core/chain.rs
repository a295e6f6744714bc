//! Context index construction: slide a k-token window over a corpus and
//! record every token observed to follow each window.

use log::debug;
use rand::Rng;
use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// An atomic unit of text, typically a normalized word.
pub type Token = String;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("context length must be at least 1")]
    ZeroOrder,
    #[error("corpus of {tokens} tokens is too short for context length {order}")]
    InsufficientData { tokens: usize, order: usize },
}

/// A fixed-length window of consecutive tokens, used as a lookup key.
///
/// Equality and hashing are element-wise over the full sequence, so
/// `("a", "b")` and `("b", "a")` are distinct contexts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Context(Vec<Token>);

impl Context {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pick a uniformly random window of `k` tokens from a corpus.
    ///
    /// Window starts range over `0..=tokens.len() - k`, so the final window
    /// of the corpus is a valid choice even though it never has a successor.
    /// Returns `None` if `k` is zero or the corpus is shorter than `k`.
    pub fn random_window<R: Rng + ?Sized>(tokens: &[Token], k: usize, rng: &mut R) -> Option<Self> {
        if k == 0 || tokens.len() < k {
            return None;
        }
        let start = rng.gen_range(0..=tokens.len() - k);
        Some(Self(tokens[start..start + k].to_vec()))
    }
}

impl Borrow<[Token]> for Context {
    fn borrow(&self) -> &[Token] {
        &self.0
    }
}

impl From<&[&str]> for Context {
    fn from(tokens: &[&str]) -> Self {
        Self(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// Immutable mapping from every observed context to the tokens that
/// followed it, duplicates included.
///
/// Successor lists keep one entry per occurrence, so sampling uniformly
/// from a list reproduces the empirical frequency of each successor.
/// Contexts are kept in the order they were first seen in the corpus.
#[derive(Debug, Clone)]
pub struct Chain {
    pub(crate) order: usize,
    pub(crate) entries: Vec<(Context, Vec<Token>)>,
    pub(crate) index: FxHashMap<Context, usize>,
}

impl Chain {
    /// Number of tokens in every context key.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of distinct contexts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of recorded transitions across all contexts.
    pub fn transition_count(&self) -> usize {
        self.entries.iter().map(|(_, successors)| successors.len()).sum()
    }

    /// Successors recorded for a context, or `None` if it was never seen
    /// as a predecessor.
    pub fn successors(&self, context: &[Token]) -> Option<&[Token]> {
        self.index
            .get(context)
            .map(|&i| self.entries[i].1.as_slice())
    }

    pub fn contains(&self, context: &[Token]) -> bool {
        self.index.contains_key(context)
    }

    /// Contexts in first-seen order.
    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.entries.iter().map(|(context, _)| context)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Context, &[Token])> {
        self.entries
            .iter()
            .map(|(context, successors)| (context, successors.as_slice()))
    }

    /// Uniformly pick one of the recorded contexts together with its
    /// successors. `None` only for an empty chain.
    pub fn random_entry<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(&Context, &[Token])> {
        if self.entries.is_empty() {
            return None;
        }
        let (context, successors) = &self.entries[rng.gen_range(0..self.entries.len())];
        Some((context, successors.as_slice()))
    }

    pub fn random_context<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Context> {
        self.random_entry(rng).map(|(context, _)| context)
    }
}

/// Builds [`Chain`]s from token sequences.
pub struct ChainBuilder;

impl ChainBuilder {
    /// Build a chain of order `k` from an ordered token sequence.
    ///
    /// Every window `tokens[i..i + k]` with a following token contributes
    /// exactly one transition, so the result always holds
    /// `tokens.len() - k` transitions. The input is not modified.
    ///
    /// # Errors
    /// `ZeroOrder` if `k == 0`, `InsufficientData` if `tokens.len() <= k`.
    pub fn build(tokens: &[Token], k: usize) -> Result<Chain, ChainError> {
        if k == 0 {
            return Err(ChainError::ZeroOrder);
        }
        if tokens.len() <= k {
            return Err(ChainError::InsufficientData {
                tokens: tokens.len(),
                order: k,
            });
        }

        let mut entries: Vec<(Context, Vec<Token>)> = Vec::new();
        let mut index: FxHashMap<Context, usize> = FxHashMap::default();

        for window in tokens.windows(k + 1) {
            let (prefix, next) = window.split_at(k);
            let next = next[0].clone();
            match index.get(prefix) {
                Some(&i) => entries[i].1.push(next),
                None => {
                    let context = Context(prefix.to_vec());
                    index.insert(context.clone(), entries.len());
                    entries.push((context, vec![next]));
                }
            }
        }

        debug!(
            "built order-{} chain: {} contexts, {} transitions from {} tokens",
            k,
            entries.len(),
            tokens.len() - k,
            tokens.len()
        );

        Ok(Chain {
            order: k,
            entries,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn toks(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn alternating_corpus_order_one() {
        let chain = ChainBuilder::build(&toks(&["a", "b", "a", "b", "a"]), 1).unwrap();
        assert_eq!(chain.order(), 1);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.successors(&toks(&["a"])), Some(&toks(&["b", "b"])[..]));
        assert_eq!(chain.successors(&toks(&["b"])), Some(&toks(&["a", "a"])[..]));
    }

    #[test]
    fn duplicates_are_retained() {
        let chain = ChainBuilder::build(&toks(&["x", "y", "x", "y", "x", "z"]), 1).unwrap();
        assert_eq!(chain.successors(&toks(&["x"])), Some(&toks(&["y", "y", "z"])[..]));
    }

    #[test]
    fn contexts_are_position_sensitive() {
        let chain = ChainBuilder::build(&toks(&["a", "b", "c", "b", "a", "d"]), 2).unwrap();
        assert_eq!(chain.successors(&toks(&["a", "b"])), Some(&toks(&["c"])[..]));
        assert_eq!(chain.successors(&toks(&["b", "a"])), Some(&toks(&["d"])[..]));
    }

    #[test]
    fn first_seen_order() {
        let chain = ChainBuilder::build(&toks(&["c", "a", "b", "c", "a"]), 1).unwrap();
        let order: Vec<String> = chain.contexts().map(|c| c.to_string()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn tail_window_has_no_successors() {
        let chain = ChainBuilder::build(&toks(&["a", "b", "c"]), 2).unwrap();
        assert!(chain.contains(&toks(&["a", "b"])));
        assert!(!chain.contains(&toks(&["b", "c"])));
        assert_eq!(chain.successors(&toks(&["b", "c"])), None);
    }

    #[test]
    fn rejects_zero_order() {
        assert_eq!(
            ChainBuilder::build(&toks(&["a", "b"]), 0).unwrap_err(),
            ChainError::ZeroOrder
        );
    }

    #[test]
    fn rejects_corpus_not_longer_than_order() {
        let err = ChainBuilder::build(&toks(&["a", "b"]), 2).unwrap_err();
        assert_eq!(err, ChainError::InsufficientData { tokens: 2, order: 2 });
        assert!(ChainBuilder::build(&[], 1).is_err());
    }

    #[test]
    fn random_window_stays_in_bounds() {
        let tokens = toks(&["a", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let window = Context::random_window(&tokens, 3, &mut rng).unwrap();
            assert_eq!(window.len(), 3);
            let s = window.to_string();
            assert!(s == "a b c" || s == "b c d", "unexpected window {s}");
        }
        assert!(Context::random_window(&tokens, 5, &mut rng).is_none());
        assert!(Context::random_window(&tokens, 0, &mut rng).is_none());
    }

    #[test]
    fn random_context_is_a_key() {
        let chain = ChainBuilder::build(&toks(&["a", "b", "c", "a", "d"]), 1).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let context = chain.random_context(&mut rng).unwrap();
            assert!(chain.contains(context.as_slice()));
        }
    }

    #[test]
    fn context_display_joins_with_spaces() {
        let context = Context::from(&["hello", "world"][..]);
        assert_eq!(context.to_string(), "hello world");
    }
}
