//! CLI module for the PR risk retrieval core
//!
//! - `index`: embed business rules into the vector store
//! - `query`: rank indexed rules against a free-text query

pub mod index;
pub mod query;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::rule::RuleDocument;
use crate::infrastructure::logging;

/// PR risk retrieval - semantic business rule search
#[derive(Parser)]
#[command(name = "pr-risk-retrieval")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Embed business rules and store their vectors
    Index(index::IndexArgs),

    /// Search indexed business rules
    Query(query::QueryArgs),
}

/// Loads `.env` and configuration, then installs logging
pub(crate) fn init() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}

/// Reads a JSON array of rules
pub(crate) async fn load_rules(path: &Path) -> anyhow::Result<Vec<RuleDocument>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;

    parse_rules(&raw).with_context(|| format!("Invalid rules file {}", path.display()))
}

fn parse_rules(raw: &str) -> Result<Vec<RuleDocument>, serde_json::Error> {
    serde_json::from_str(raw)
}
