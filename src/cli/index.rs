//! Index command - embeds business rules into the vector store

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::domain::vector::HydrationReport;
use crate::engine::RetrievalEngine;
use crate::infrastructure::services::IndexReport;

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// JSON file holding an array of rules
    #[arg(long)]
    pub rules: PathBuf,

    /// Re-embed every rule, even those already indexed
    #[arg(long)]
    pub reindex: bool,
}

#[derive(Serialize)]
struct IndexOutput {
    hydration: HydrationReport,
    report: IndexReport,
    store_size: usize,
    persisted: usize,
}

/// Run the index command
pub async fn run(args: IndexArgs) -> anyhow::Result<()> {
    let config = super::init()?;
    let rules = super::load_rules(&args.rules).await?;

    info!(rules = rules.len(), reindex = args.reindex, "Indexing business rules");

    let engine = RetrievalEngine::bootstrap(&config.rag).await?;

    let report = if args.reindex {
        engine.indexer.reindex_all(&rules).await
    } else {
        engine.indexer.index_all(&rules).await
    };

    let output = IndexOutput {
        hydration: engine.hydration,
        report,
        store_size: engine.vector_store.size(),
        persisted: engine.vector_store.persisted_count().await,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
