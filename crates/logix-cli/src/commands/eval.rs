//! Evaluate a single document

use anyhow::{Context, Result};
use logix_core::{LogixConfig, evaluate_with};

use super::{OutputFormat, print, read_document};

/// Run the eval command
pub async fn run(
    config: &LogixConfig,
    input: &str,
    format: OutputFormat,
    trace: bool,
    max_depth: Option<usize>,
) -> Result<()> {
    let mut options = config.eval.clone().with_trace(config.eval.trace || trace);
    if let Some(max_depth) = max_depth {
        anyhow::ensure!(max_depth > 0, "--max-depth must be at least 1");
        options.max_depth = max_depth;
    }

    tracing::debug!("Evaluating {}", input);
    let root = read_document(input)?;
    let result = evaluate_with(&root, &options).with_context(|| format!("Failed to evaluate {}", input))?;

    print(result, format)
}
