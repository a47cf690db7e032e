//! Output formatting utilities
//!
//! Handles JSON, YAML, and table output formats.

use std::io::{IsTerminal, Read};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::OutputFormat;
use crate::config::RuntimeContext;

/// Format and print data according to the configured output format
pub fn print_output<T: Serialize>(ctx: &RuntimeContext, data: &T) -> Result<()> {
    let output = format_output(ctx, data)?;
    println!("{output}");
    Ok(())
}

/// Format data according to the configured output format
pub fn format_output<T: Serialize>(ctx: &RuntimeContext, data: &T) -> Result<String> {
    let format = ctx.output_format();
    let is_tty = std::io::stdout().is_terminal();

    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Auto if !is_tty => Ok(serde_json::to_string(data)?),
        _ if is_tty => Ok(serde_json::to_string_pretty(data)?),
        _ => Ok(serde_json::to_string(data)?),
    }
}

/// Print structured data, or run `human` when table output is wanted
pub fn output_for_format<T, F>(ctx: &RuntimeContext, data: &T, human: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> Result<()>,
{
    if ctx.is_table_output() {
        human()
    } else {
        print_output(ctx, data)
    }
}

/// Print a table from items that implement Tabled
pub fn print_table<T: Tabled>(ctx: &RuntimeContext, items: &[T]) -> Result<()> {
    let table = build_table(ctx, items);
    println!("{table}");
    Ok(())
}

fn build_table<T: Tabled>(ctx: &RuntimeContext, items: &[T]) -> Table {
    let mut table = Table::new(items);
    table.with(Style::sharp());

    if ctx.global.no_headers || ctx.config.output.no_headers {
        table.with(tabled::settings::Remove::row(
            tabled::settings::object::Rows::first(),
        ));
    }

    table
}

/// Parse JSON input from various sources (inline, file, stdin)
pub fn parse_json_input(input: &str) -> Result<serde_json::Value> {
    let input = input.trim();

    // Check for stdin indicator
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading JSON from stdin")?;
        return serde_json::from_str(&buffer).context("parsing JSON from stdin");
    }

    // Check for file path indicator
    if let Some(path) = input.strip_prefix('@') {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading JSON from {path}"))?;
        return serde_json::from_str(&content).with_context(|| format!("parsing JSON in {path}"));
    }

    // Parse as inline JSON
    serde_json::from_str(input).map_err(|err| anyhow!("invalid JSON input: {err}"))
}

/// Render an optional number for a table cell
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(n) if n.fract() == 0.0 => format!("{n:.0}"),
        Some(n) => format!("{n:.2}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_input_inline() {
        let json = r#"{"name": "Reclaimed Oak", "category": "wood"}"#;
        let result = parse_json_input(json).unwrap();
        assert_eq!(result["name"], "Reclaimed Oak");
    }

    #[test]
    fn test_parse_json_input_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("candidate.json");
        std::fs::write(&path, r#"{"name": "Cork", "category": "cork"}"#).unwrap();

        let result = parse_json_input(&format!("@{}", path.display())).unwrap();
        assert_eq!(result["category"], "cork");
    }

    #[test]
    fn test_parse_json_input_invalid() {
        let err = parse_json_input("{name:").unwrap_err();
        assert!(err.to_string().contains("invalid JSON input"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(Some(12.0)), "12");
        assert_eq!(format_number(Some(3.456)), "3.46");
        assert_eq!(format_number(None), "");
    }
}
