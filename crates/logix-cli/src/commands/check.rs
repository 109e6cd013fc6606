//! Check that every document under a path evaluates

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use logix_core::{LogixConfig, Node, evaluate_with};
use walkdir::WalkDir;

/// Run the check command
pub async fn run(config: &LogixConfig, path: &str) -> Result<()> {
    let root = Path::new(path);
    let files = collect_documents(root)?;
    tracing::info!("Checking {} documents in {}", files.len(), root.display());

    let mut failures = 0;
    for file in &files {
        let outcome = std::fs::read_to_string(file)
            .map_err(logix_core::Error::from)
            .and_then(|text| Node::from_yaml_str(&text))
            .and_then(|node| evaluate_with(&node, &config.eval));

        match outcome {
            Ok(_) => tracing::info!("✓ {}", file.display()),
            Err(e) => {
                failures += 1;
                tracing::error!("✗ {} [{}] {}", file.display(), e.kind(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} documents failed", failures, files.len());
    }
    tracing::info!("✓ All documents evaluate");
    Ok(())
}

/// YAML files under `root` in sorted order, or `root` itself if it is a file
fn collect_documents(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    anyhow::ensure!(root.is_dir(), "No such file or directory: {}", root.display());

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let is_yaml = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if entry.file_type().is_file() && is_yaml {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
