//! Markov Text: k-order Markov chain text generation.
//!
//! Builds an index from every k-token context in a corpus to the tokens
//! observed after it, then samples new token sequences by walking that
//! index with an injected random source.

pub mod config;
pub mod core;

pub use crate::core::chain::{Chain, ChainBuilder, ChainError, Context, Token};
pub use crate::core::generator::{generate, DeadEndPolicy, GenerateError, Generator, TokenStream};
