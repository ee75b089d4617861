//! Shared output formatting utilities for CLI commands
//!
//! Status lines go to stderr; stdout carries only machine-readable output
//! (credential JSON, listed values, configuration dumps).

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => anyhow::bail!("Unsupported output format: '{}'. Use 'json' or 'yaml'.", s),
        }
    }
}

/// Print data in the specified OutputFormat
pub fn print_output_format<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(data),
        OutputFormat::Yaml => print_yaml(data),
    }
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize>(data: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;
    print!("{}", yaml);
    Ok(())
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", "SUCCESS:".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "WARNING:".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", "INFO:".cyan().bold(), message);
}
