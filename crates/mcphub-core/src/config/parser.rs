//! TOML parser for the registry document with helpful error messages

use std::path::Path;

use anyhow::{Context, Result};

use super::schema::RegistryDocument;
use crate::registry::Registry;

/// Parse a registry document from disk
pub fn parse_registry_toml(path: &Path) -> Result<Registry> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_registry_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a registry document from a string.
///
/// Only the document shape is checked here; registry invariants are enforced
/// when the registry is mutated and saved.
pub fn parse_registry_str(content: &str) -> Result<Registry> {
    let document: RegistryDocument =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;
    document.into_registry()
}

/// Serialize a registry to a TOML string, servers in registry order
pub fn to_toml(registry: &Registry) -> Result<String> {
    toml::to_string_pretty(&RegistryDocument::from(registry))
        .with_context(|| "Failed to serialize registry to TOML")
}

/// Rebuild a TOML error so it quotes the lines around the failure.
///
/// The byte span from the parser is mapped to a 1-based line; errors
/// without a span keep the parser's own rendering.
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let Some(span) = error.span() else {
        return anyhow::anyhow!("TOML parsing error: {}", error);
    };

    let line_num = line_at_offset(content, span.start);
    anyhow::anyhow!(
        "TOML parsing error at line {}:\n{}\n\nError: {}",
        line_num,
        get_line_context(content, line_num),
        error.message().trim_end()
    )
}

fn line_at_offset(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

/// One line either side of `line_num`, the failing line marked with `>>>`
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    // span can point one past the last line on a truncated document
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
