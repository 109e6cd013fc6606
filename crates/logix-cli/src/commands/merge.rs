//! Evaluate several documents and deep-merge them

use anyhow::{Context, Result};
use logix_core::{LogixConfig, MergeOptions, MergeRequest, Node, evaluate_with};

use super::{OutputFormat, print, read_document};

/// Run the merge command
pub async fn run(
    config: &LogixConfig,
    files: &[String],
    no_dedup: bool,
    no_recursive: bool,
    format: OutputFormat,
) -> Result<()> {
    let options = MergeOptions::new(
        config.merge.dedup && !no_dedup,
        config.merge.recursive && !no_recursive,
    );

    let mut values = Vec::with_capacity(files.len());
    for file in files {
        let root = read_document(file)?;
        let evaluated =
            evaluate_with(&root, &config.eval).with_context(|| format!("Failed to evaluate {}", file))?;
        values.push(as_mergeable(evaluated));
    }

    tracing::debug!(
        "Merging {} documents (dedup: {}, recursive: {})",
        values.len(),
        options.dedup,
        options.recursive
    );
    let merged = MergeRequest::new(values, options, files.join(","))
        .run()
        .context("Failed to merge documents")?;

    print(merged, format)
}

/// A bare scalar document merges as a one-item list
fn as_mergeable(node: Node) -> Node {
    match node {
        Node::Scalar(_) => Node::Sequence(vec![node]),
        other => other,
    }
}
