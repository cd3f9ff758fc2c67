use clap::Parser;
use pr_risk_retrieval::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Index(args) => cli::index::run(args).await,
        Command::Query(args) => cli::query::run(args).await,
    }
}
