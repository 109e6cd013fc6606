//! CLI command implementations

pub mod check;
pub mod eval;
pub mod merge;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use logix_core::{LogixConfig, Node};

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML document
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// Load the project file named by `--config`, or discover one in the
/// working directory
pub fn load_config(path: Option<&str>) -> Result<LogixConfig> {
    match path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path);
            LogixConfig::load(path).with_context(|| format!("Failed to load configuration: {}", path))
        }
        None => LogixConfig::discover(".").context("Failed to load configuration"),
    }
}

/// Read and parse one YAML document; `-` reads stdin
pub fn read_document(input: &str) -> Result<Node> {
    let text = if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        text
    } else {
        std::fs::read_to_string(Path::new(input))
            .with_context(|| format!("Failed to read {}", input))?
    };
    Node::from_yaml_str(&text).with_context(|| format!("Failed to parse {}", input))
}

/// Write a node to stdout in the requested format
pub fn print(node: Node, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&node).context("Failed to render YAML")?,
        OutputFormat::Json => {
            let value = serde_json::Value::from(node);
            let mut text = serde_json::to_string_pretty(&value).context("Failed to render JSON")?;
            text.push('\n');
            text
        }
    };
    print!("{}", rendered);
    Ok(())
}
