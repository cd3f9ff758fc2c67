//! Query command - ranks indexed rules against free text

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::domain::query_cache::QueryCacheStats;
use crate::domain::vector::SimilarityMatch;
use crate::engine::RetrievalEngine;

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Query text
    pub text: String,

    /// Maximum number of matches (defaults to rag.search.default_top_k)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Index these rules before searching
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

#[derive(Serialize)]
struct QueryOutput {
    query: String,
    matches: Vec<SimilarityMatch>,
    cache: QueryCacheStats,
}

/// Run the query command
pub async fn run(args: QueryArgs) -> anyhow::Result<()> {
    let config = super::init()?;
    let engine = RetrievalEngine::bootstrap(&config.rag).await?;

    if let Some(path) = &args.rules {
        let rules = super::load_rules(path).await?;
        engine.indexer.index_all(&rules).await;
    }

    let matches = engine.search.search(&args.text, args.top_k).await?;

    let output = QueryOutput {
        query: args.text,
        matches,
        cache: engine.query_cache.stats(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
