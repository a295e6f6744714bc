//! WASM bindings for markov-text: powers the browser upload-and-generate page.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use markov_text::core::preprocess::{join_tokens, Normalizer};
use markov_text::core::stats::{word_frequencies, ChainSummary};
use markov_text::{Chain, ChainBuilder, ChainError, Context, DeadEndPolicy, Generator, Token};

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct WordCount {
    word: String,
    count: usize,
}

#[derive(serde::Serialize)]
struct Generation {
    text: String,
    words: usize,
    requested: usize,
    /// True when the output stopped short of the requested length.
    truncated: bool,
}

// ---------------------------------------------------------------------------
// MarkovText: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct MarkovText {
    tokens: Vec<Token>,
    chain: Chain,
    normalizer: Normalizer,
}

#[wasm_bindgen]
impl MarkovText {
    /// Tokenize `text` and build a chain with context size `order`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        text: &str,
        order: usize,
        strip_punctuation: bool,
        lowercase: bool,
    ) -> Result<MarkovText, JsError> {
        let normalizer = Normalizer {
            strip_punctuation,
            lowercase,
        };
        let tokens = normalizer.tokenize(text);
        let chain = ChainBuilder::build(&tokens, order).map_err(|e| match e {
            ChainError::InsufficientData { order, .. } => JsError::new(&format!(
                "The text is too short for context size k={order}. Try reducing k or uploading a larger text file."
            )),
            other => JsError::new(&other.to_string()),
        })?;

        Ok(MarkovText {
            tokens,
            chain,
            normalizer,
        })
    }

    /// Generate `length` words. A `seed` of 0 draws from entropy.
    ///
    /// `start` supplies the first words; when absent a random window of
    /// the uploaded text is used. Returns a JSON `Generation` object.
    pub fn generate(
        &self,
        length: usize,
        seed: u64,
        start: Option<String>,
        halt: bool,
    ) -> Result<String, JsError> {
        let mut rng = if seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(seed)
        };
        let order = self.chain.order();
        let start = match start {
            Some(words) => self
                .normalizer
                .parse_start_context(&words, order)
                .ok_or_else(|| {
                    JsError::new(&format!("The starting context must contain at least {order} words."))
                })?,
            None => Context::random_window(&self.tokens, order, &mut rng)
                .ok_or_else(|| JsError::new("No starting context available"))?,
        };
        let policy = if halt {
            DeadEndPolicy::Halt
        } else {
            DeadEndPolicy::Teleport
        };

        let words = Generator::new(&self.chain)
            .with_policy(policy)
            .generate(start.as_slice(), length, &mut rng)
            .map_err(|e| JsError::new(&format!("Generation error: {e}")))?;

        let result = Generation {
            text: join_tokens(&words),
            words: words.len(),
            requested: length,
            truncated: words.len() < length,
        };
        serde_json::to_string(&result)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return a JSON `ChainSummary` for the loaded text.
    pub fn summary(&self) -> Result<String, JsError> {
        serde_json::to_string(&ChainSummary::new(&self.tokens, &self.chain))
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return a JSON array of the `top` most frequent words, for charting.
    pub fn top_words(&self, top: usize) -> Result<String, JsError> {
        let counts: Vec<WordCount> = word_frequencies(&self.tokens, top)
            .into_iter()
            .map(|(word, count)| WordCount { word, count })
            .collect();
        serde_json::to_string(&counts)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// The first `count` tokens of the uploaded text, space-joined.
    pub fn sample(&self, count: usize) -> String {
        join_tokens(&self.tokens[..count.min(self.tokens.len())])
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }
}
