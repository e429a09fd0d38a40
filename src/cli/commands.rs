//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::path::{Path, PathBuf};

use crate::cli::parser::{Cli, Commands, PredictorArgs};
use crate::error::Result;
use crate::pipeline::{compress_path, decompress_path, CompressOptions};
use crate::predictor::HttpPredictor;

/// Executes the parsed CLI command.
///
/// # Errors
///
/// Returns the propagated error from the underlying pipeline call. A
/// failed compression or decompression leaves no output file behind.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compress {
            input,
            output,
            window,
            min_chunk,
            max_chunk,
            max_concurrency,
            predictor,
        } => {
            run_compress(
                &input,
                output.as_deref(),
                window,
                min_chunk,
                max_chunk,
                max_concurrency,
                predictor,
            )
            .await
        }
        Commands::Decompress {
            input,
            output,
            max_concurrency,
            predictor,
        } => run_decompress(&input, output.as_deref(), max_concurrency, predictor).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_compress(
    input: &Path,
    output: Option<&Path>,
    window: u32,
    min_chunk: usize,
    max_chunk: usize,
    max_concurrency: usize,
    predictor_args: PredictorArgs,
) -> Result<()> {
    let output_path = output.map_or_else(|| default_output_path(input, "llmp"), PathBuf::from);
    let predictor = HttpPredictor::new(predictor_args.into_builder().build());
    let options = CompressOptions {
        window,
        min_chunk,
        max_chunk,
        max_concurrency,
    };

    let observer = |stage, index, total| {
        tracing::debug!(?stage, index, total, "compression progress");
    };

    let report = compress_path(input, Some(&output_path), &predictor, options, Some(&observer)).await?;

    tracing::info!(
        original_size = report.original_size,
        compressed_size = report.compressed_size,
        output = %output_path.display(),
        "compression complete",
    );
    Ok(())
}

async fn run_decompress(
    input: &Path,
    output: Option<&Path>,
    max_concurrency: usize,
    predictor_args: PredictorArgs,
) -> Result<()> {
    let output_path = output.map_or_else(|| default_output_path(input, "txt"), PathBuf::from);
    let predictor = HttpPredictor::new(predictor_args.into_builder().build());

    let observer = |stage, index, total| {
        tracing::debug!(?stage, index, total, "decompression progress");
    };

    let text = decompress_path(input, Some(&output_path), &predictor, max_concurrency, Some(&observer)).await?;

    tracing::info!(
        decompressed_size = text.len(),
        output = %output_path.display(),
        "decompression complete",
    );
    Ok(())
}

/// Appends `extension` as an additional suffix, e.g. `input.txt` → `input.txt.llmp`.
fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
