//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::pipeline::{DEFAULT_MAX_CHUNK, DEFAULT_MAX_CONCURRENCY, DEFAULT_MIN_CHUNK, DEFAULT_WINDOW};
use crate::predictor::config::PredictorConfigBuilder;

/// `LLMPress`: a lossless text compressor driven by a language model's
/// next-token predictions.
#[derive(Parser, Debug)]
#[command(name = "llmpress")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a text file.
    #[command(after_help = r#"Examples:
  llmpress compress input.txt                       # Write to input.txt.llmp
  llmpress compress input.txt -o out.bin            # Explicit output path
  llmpress compress input.txt --window 32           # Smaller context window
"#)]
    Compress {
        /// Path to the input text file.
        input: PathBuf,

        /// Path to write the compressed output. Defaults to `<input>.llmp`.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sliding context window size, in tokens (also the `k` in `top_k`).
        #[arg(long, default_value_t = DEFAULT_WINDOW)]
        window: u32,

        /// Minimum chunk size in bytes.
        #[arg(long, default_value_t = DEFAULT_MIN_CHUNK)]
        min_chunk: usize,

        /// Maximum chunk size in bytes.
        #[arg(long, default_value_t = DEFAULT_MAX_CHUNK)]
        max_chunk: usize,

        /// Maximum number of chunks tokenized/encoded concurrently.
        #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
        max_concurrency: usize,

        /// Predictor service connection settings.
        #[command(flatten)]
        predictor: PredictorArgs,
    },

    /// Decompress an `LLMPress` stream back to text.
    #[command(after_help = r#"Examples:
  llmpress decompress input.llmp                    # Write to input.llmp.txt
  llmpress decompress input.llmp -o out.txt         # Explicit output path
"#)]
    Decompress {
        /// Path to the compressed input file.
        input: PathBuf,

        /// Path to write the decompressed text. Defaults to `<input>.txt`.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of chunks rank-decoded/detokenized concurrently.
        #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
        max_concurrency: usize,

        /// Predictor service connection settings.
        #[command(flatten)]
        predictor: PredictorArgs,
    },
}

/// Shared predictor-connection arguments for both subcommands.
#[derive(clap::Args, Debug, Clone)]
pub struct PredictorArgs {
    /// Base URL of the predictor service.
    #[arg(long, env = "LLMPRESS_PREDICTOR_URL")]
    pub predictor_url: Option<String>,

    /// Per-request timeout, in seconds.
    #[arg(long, env = "LLMPRESS_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Maximum retry attempts per request.
    #[arg(long, env = "LLMPRESS_MAX_RETRIES")]
    pub max_retries: Option<u32>,
}

impl PredictorArgs {
    /// Builds a [`crate::predictor::PredictorConfig`], layering explicit
    /// flags over environment variables over defaults.
    #[must_use]
    pub fn into_builder(self) -> PredictorConfigBuilder {
        let mut builder = crate::predictor::PredictorConfig::builder().from_env();
        if let Some(url) = self.predictor_url {
            builder = builder.base_url(url);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        if let Some(retries) = self.max_retries {
            builder = builder.max_retries(retries);
        }
        builder
    }
}
