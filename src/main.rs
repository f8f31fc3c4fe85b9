//! Travel article headings: reads every article of a directory, enriches
//! its photos and prints suggested headlines.
//!
//! Usage: `travel-article-headings [DIRECTORY]`

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use travel_article_headings::article::CsvDirectory;
use travel_article_headings::config::Setup;
use travel_article_headings::enrich::Enrichers;
use travel_article_headings::present::ConsolePresenter;
use travel_article_headings::{ArticleOrchestrator, PipelineError};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("travel_article_headings=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn run() -> Result<()> {
    let mut setup = Setup::load().context("loading configuration")?;
    if let Some(dir) = std::env::args().nth(1) {
        setup.directory = PathBuf::from(dir);
    }
    tracing::info!(directory = %setup.directory.display(), "starting");

    let enrichers = Enrichers::from_setup(&setup).context("building enrichment clients")?;
    let orchestrator = ArticleOrchestrator::new(
        Arc::new(CsvDirectory::new(setup.directory.clone())),
        enrichers,
        Arc::new(ConsolePresenter),
        setup.pipeline_config(),
    );

    let report = orchestrator.run().await?;
    for a in &report.articles {
        tracing::debug!(article = %a.article, outcome = ?a.outcome, "article finished");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env when present; plain environment otherwise.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(PipelineError::Cancelled { article }) = e.downcast_ref::<PipelineError>() {
                tracing::error!(%article, "run aborted by cancellation");
            } else {
                tracing::error!(error = %format!("{e:#}"), "run failed");
            }
            ExitCode::FAILURE
        }
    }
}
