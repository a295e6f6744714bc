//! Token generation by weighted random walk over a [`Chain`].

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::iter::FusedIterator;
use thiserror::Error;

use crate::core::chain::{Chain, Token};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("start context has {found} tokens but the chain uses contexts of {expected}")]
    ContextLengthMismatch { expected: usize, found: usize },
    #[error("requested length {length} is shorter than the {seed}-token start context")]
    InvalidLength { length: usize, seed: usize },
    #[error("chain has no contexts to continue from")]
    EmptyChain,
}

/// What to do when the current context has no recorded successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadEndPolicy {
    /// Jump to a uniformly chosen context of the chain and append one of
    /// its successors in the same step. The jumped-to context is not
    /// emitted, so the text loses continuity there, but every step appends
    /// a token and the output always reaches the requested length.
    #[default]
    Teleport,
    /// Stop immediately. The output is shorter than requested.
    Halt,
}

/// Walks a chain to produce token sequences.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    chain: &'a Chain,
    policy: DeadEndPolicy,
}

impl<'a> Generator<'a> {
    pub fn new(chain: &'a Chain) -> Self {
        Self {
            chain,
            policy: DeadEndPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DeadEndPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DeadEndPolicy {
        self.policy
    }

    /// Generate a sequence of at most `length` tokens starting with `start`.
    ///
    /// The output begins with the tokens of `start`. Under
    /// [`DeadEndPolicy::Teleport`] it has exactly `length` tokens; under
    /// [`DeadEndPolicy::Halt`] it is cut short at the first dead end.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        start: &[Token],
        length: usize,
        rng: &mut R,
    ) -> Result<Vec<Token>, GenerateError> {
        Ok(self.stream(start, length, rng)?.collect())
    }

    /// Like [`generate`](Self::generate), but yields tokens one at a time.
    ///
    /// The start tokens are yielded first, followed by each sampled token
    /// as it is drawn. The stream is finite and cannot be restarted.
    pub fn stream<'r, R: Rng + ?Sized>(
        &self,
        start: &[Token],
        length: usize,
        rng: &'r mut R,
    ) -> Result<TokenStream<'a, 'r, R>, GenerateError> {
        let order = self.chain.order();
        if start.len() != order {
            return Err(GenerateError::ContextLengthMismatch {
                expected: order,
                found: start.len(),
            });
        }
        if length < start.len() {
            return Err(GenerateError::InvalidLength {
                length,
                seed: start.len(),
            });
        }
        if self.policy == DeadEndPolicy::Teleport && self.chain.is_empty() {
            return Err(GenerateError::EmptyChain);
        }

        Ok(TokenStream {
            chain: self.chain,
            policy: self.policy,
            rng,
            seed: start.to_vec().into_iter(),
            window: start.iter().cloned().collect(),
            remaining: length - start.len(),
            dead_ends: 0,
            halted: false,
        })
    }
}

/// Generate from `chain` with an explicit dead-end policy.
pub fn generate<R: Rng + ?Sized>(
    chain: &Chain,
    start: &[Token],
    length: usize,
    policy: DeadEndPolicy,
    rng: &mut R,
) -> Result<Vec<Token>, GenerateError> {
    Generator::new(chain).with_policy(policy).generate(start, length, rng)
}

/// Lazy token sequence produced by [`Generator::stream`].
pub struct TokenStream<'a, 'r, R: Rng + ?Sized> {
    chain: &'a Chain,
    policy: DeadEndPolicy,
    rng: &'r mut R,
    seed: std::vec::IntoIter<Token>,
    /// Trailing `order` tokens of the output so far.
    window: VecDeque<Token>,
    remaining: usize,
    dead_ends: usize,
    halted: bool,
}

impl<R: Rng + ?Sized> TokenStream<'_, '_, R> {
    /// Dead ends met so far.
    pub fn dead_ends(&self) -> usize {
        self.dead_ends
    }

    /// Whether a dead end stopped the stream under [`DeadEndPolicy::Halt`].
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn next_generated(&mut self) -> Option<Token> {
        let chain = self.chain;
        let successors = chain.successors(self.window.make_contiguous());

        let next = match successors.and_then(|s| s.choose(&mut *self.rng)) {
            Some(token) => token.clone(),
            None => {
                self.dead_ends += 1;
                match self.policy {
                    DeadEndPolicy::Halt => {
                        debug!(
                            "dead end at [{}], halting with {} tokens unfilled",
                            join(&self.window),
                            self.remaining
                        );
                        self.halted = true;
                        self.remaining = 0;
                        return None;
                    }
                    DeadEndPolicy::Teleport => {
                        let (context, successors) = chain.random_entry(&mut *self.rng)?;
                        debug!(
                            "dead end at [{}], teleporting to [{}]",
                            join(&self.window),
                            context
                        );
                        successors.choose(&mut *self.rng)?.clone()
                    }
                }
            }
        };

        trace!("[{}] -> {}", join(&self.window), next);
        self.window.pop_front();
        self.window.push_back(next.clone());
        self.remaining -= 1;
        Some(next)
    }
}

impl<R: Rng + ?Sized> Iterator for TokenStream<'_, '_, R> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.seed.next() {
            return Some(token);
        }
        if self.remaining == 0 {
            return None;
        }
        self.next_generated()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let seed = self.seed.len();
        let lower = match self.policy {
            DeadEndPolicy::Teleport => seed + self.remaining,
            DeadEndPolicy::Halt => seed,
        };
        (lower, Some(seed + self.remaining))
    }
}

impl<R: Rng + ?Sized> FusedIterator for TokenStream<'_, '_, R> {}

fn join(window: &VecDeque<Token>) -> String {
    window.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chain::ChainBuilder;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rustc_hash::FxHashMap;

    fn toks(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn alternating_chain() -> Chain {
        ChainBuilder::build(&toks(&["a", "b", "a", "b", "a"]), 1).unwrap()
    }

    #[test]
    fn alternating_walk_is_fixed() {
        let chain = alternating_chain();
        let mut rng = StepRng::new(0, 1);
        let out = Generator::new(&chain)
            .generate(&toks(&["a"]), 5, &mut rng)
            .unwrap();
        assert_eq!(out, toks(&["a", "b", "a", "b", "a"]));
    }

    #[test]
    fn length_equal_to_seed_returns_seed() {
        let chain = alternating_chain();
        let mut rng = StdRng::seed_from_u64(1);
        let out = Generator::new(&chain)
            .generate(&toks(&["b"]), 1, &mut rng)
            .unwrap();
        assert_eq!(out, toks(&["b"]));
    }

    #[test]
    fn rejects_mismatched_start() {
        let chain = alternating_chain();
        let mut rng = StdRng::seed_from_u64(1);
        let err = Generator::new(&chain)
            .generate(&toks(&["a", "b"]), 5, &mut rng)
            .unwrap_err();
        assert_eq!(err, GenerateError::ContextLengthMismatch { expected: 1, found: 2 });
    }

    #[test]
    fn rejects_length_shorter_than_seed() {
        let chain = ChainBuilder::build(&toks(&["a", "b", "c", "d"]), 2).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = Generator::new(&chain)
            .generate(&toks(&["a", "b"]), 1, &mut rng)
            .unwrap_err();
        assert_eq!(err, GenerateError::InvalidLength { length: 1, seed: 2 });
    }

    #[test]
    fn empty_chain_is_guarded_before_teleport() {
        let chain = Chain {
            order: 1,
            entries: Vec::new(),
            index: FxHashMap::default(),
        };
        let mut rng = StdRng::seed_from_u64(1);
        let err = Generator::new(&chain)
            .generate(&toks(&["a"]), 3, &mut rng)
            .unwrap_err();
        assert_eq!(err, GenerateError::EmptyChain);

        let out = Generator::new(&chain)
            .with_policy(DeadEndPolicy::Halt)
            .generate(&toks(&["a"]), 3, &mut rng)
            .unwrap();
        assert_eq!(out, toks(&["a"]));
    }

    #[test]
    fn unknown_start_halts_immediately() {
        let chain = alternating_chain();
        let mut rng = StdRng::seed_from_u64(3);
        let mut stream = Generator::new(&chain)
            .with_policy(DeadEndPolicy::Halt)
            .stream(&toks(&["z"]), 4, &mut rng)
            .unwrap();
        assert_eq!(stream.next().as_deref(), Some("z"));
        assert_eq!(stream.next(), None);
        assert!(stream.is_halted());
        assert_eq!(stream.dead_ends(), 1);
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn unknown_start_teleports_and_fills() {
        let chain = alternating_chain();
        let mut rng = StdRng::seed_from_u64(3);
        let mut stream = Generator::new(&chain)
            .stream(&toks(&["z"]), 4, &mut rng)
            .unwrap();
        assert_eq!(stream.size_hint(), (4, Some(4)));
        let out: Vec<Token> = stream.by_ref().collect();
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], "z");
        assert_eq!(stream.dead_ends(), 1);
        assert!(!stream.is_halted());
    }

    #[test]
    fn free_function_matches_generator() {
        let chain = alternating_chain();
        let a = generate(&chain, &toks(&["b"]), 6, DeadEndPolicy::Halt, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = Generator::new(&chain)
            .with_policy(DeadEndPolicy::Halt)
            .generate(&toks(&["b"]), 6, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a, toks(&["b", "a", "b", "a", "b", "a"]));
    }
}
