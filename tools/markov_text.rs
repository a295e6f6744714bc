//! markov_text: generate text from a corpus file with a k-order Markov chain.
//!
//! Usage: markov_text <corpus.txt> [-k <order>] [-n <length>] [--seed <n>]
//!                    [--start "<words>"] [--halt] [--stream] [--config <file.ron>]

use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::{info, warn};
use markov_text::config::GenerationConfig;
use markov_text::core::preprocess::join_tokens;
use markov_text::core::stats::{word_frequencies, ChainSummary};
use markov_text::{ChainBuilder, ChainError, Context, DeadEndPolicy, Generator};

#[derive(Parser, Debug)]
#[command(author, version, about = "Markov chain text generator", long_about = None)]
struct Cli {
    /// Text file to learn from
    input: PathBuf,

    /// RON file with generation settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Context size k: how many words predict the next one
    #[arg(short = 'k', long)]
    order: Option<usize>,

    /// Total number of words to generate, start context included
    #[arg(short = 'n', long)]
    length: Option<usize>,

    /// Seed for repeatable output
    #[arg(long)]
    seed: Option<u64>,

    /// Starting words (at least k); a random corpus window otherwise
    #[arg(long)]
    start: Option<String>,

    /// Stop at a dead end instead of jumping to a random context
    #[arg(long)]
    halt: bool,

    /// Keep punctuation in tokens
    #[arg(long)]
    keep_punctuation: bool,

    /// Keep the original letter case
    #[arg(long)]
    keep_case: bool,

    /// Print words one at a time
    #[arg(long)]
    stream: bool,

    /// Pause between streamed words, in milliseconds
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Print the N most frequent words of the corpus
    #[arg(long)]
    top_words: Option<usize>,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, action = ArgAction::Count)]
    quiet: u8,
}

impl Cli {
    fn resolve_config(&self) -> Result<GenerationConfig> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::load_from_ron(path)
                .with_context(|| format!("loading config '{}'", path.display()))?,
            None => GenerationConfig::default(),
        };
        if let Some(order) = self.order {
            config.order = order;
        }
        if let Some(length) = self.length {
            config.length = length;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.start.is_some() {
            config.start = self.start.clone();
        }
        if self.halt {
            config.dead_end = DeadEndPolicy::Halt;
        }
        if self.keep_punctuation {
            config.strip_punctuation = false;
        }
        if self.keep_case {
            config.lowercase = false;
        }
        if self.top_words.is_some() {
            config.top_words = self.top_words;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => "off",
        -1 => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let config = cli.resolve_config()?;

    let text = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading input file '{}'", cli.input.display()))?;
    let tokens = config.normalizer().tokenize(&text);
    info!("loaded {} tokens from '{}'", tokens.len(), cli.input.display());

    if let Some(top) = config.top_words {
        println!("Most frequent words:");
        for (word, count) in word_frequencies(&tokens, top) {
            println!("{count:>8}  {word}");
        }
        println!();
    }

    let chain = match ChainBuilder::build(&tokens, config.order) {
        Ok(chain) => chain,
        Err(ChainError::InsufficientData { tokens, order }) => bail!(
            "the text is too short for context size k={order} ({tokens} words); \
             try a smaller k or a larger text"
        ),
        Err(e) => return Err(e.into()),
    };
    let summary = ChainSummary::new(&tokens, &chain);
    info!(
        "chain: {} contexts, {} transitions, {} dead-end windows",
        summary.contexts, summary.transitions, summary.dead_end_contexts
    );

    let mut rng = config.rng();
    let start = match &config.start {
        Some(words) => config
            .normalizer()
            .parse_start_context(words, config.order)
            .with_context(|| format!("the starting context must contain at least {} words", config.order))?,
        None => Context::random_window(&tokens, config.order, &mut rng)
            .context("corpus has no window to start from")?,
    };
    if config.length < start.len() {
        bail!(
            "cannot generate {} words from a {}-word starting context",
            config.length,
            start.len()
        );
    }

    let generator = Generator::new(&chain).with_policy(config.dead_end);
    let produced = if cli.stream {
        let mut stdout = io::stdout().lock();
        let mut stream = generator.stream(start.as_slice(), config.length, &mut rng)?;
        let mut count = 0;
        for (i, word) in stream.by_ref().enumerate() {
            if i > 0 {
                write!(stdout, " ")?;
            }
            write!(stdout, "{word}")?;
            stdout.flush()?;
            count += 1;
            thread::sleep(Duration::from_millis(cli.delay_ms));
        }
        writeln!(stdout)?;
        info!("{} dead ends during generation", stream.dead_ends());
        count
    } else {
        let words = generator.generate(start.as_slice(), config.length, &mut rng)?;
        println!("{}", join_tokens(&words));
        words.len()
    };

    if produced < config.length {
        warn!(
            "not enough data to generate {} words (stopped at {}); try reducing k or using a larger text",
            config.length, produced
        );
    }
    Ok(())
}
