// src/pipeline/mod.rs
//! Per-article enrichment pipeline.
//!
//! Idle -> Dispatching -> Draining -> Ranking -> Synthesizing -> Presented -> Done,
//! or Draining -> SkippedEmpty -> Done when a source produced nothing.

pub mod aggregate;
pub mod channels;
pub mod fanout;
pub mod orchestrator;
pub mod tracker;

use metrics::describe_counter;
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::{Arc, Mutex};

pub use aggregate::{gather, Aggregated};
pub use channels::{BundleReceivers, ChannelBundle, CHANNEL_CAPACITY};
pub use fanout::{DispatchDelay, EnrichmentFanOut};
pub use orchestrator::{spawn_closers, ArticleOrchestrator, ArticleOutcome, ArticleReport, RunReport};
pub use tracker::{CompletionGroup, CompletionGuard, CompletionTracker};

/// One generator per run, shared by the location dispatchers and headline synthesis.
pub type SharedRng = Arc<Mutex<StdRng>>;

pub fn shared_rng(seed: Option<u64>) -> SharedRng {
    let rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    Arc::new(Mutex::new(rng))
}

/// Runtime knobs handed to the orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub location_delay: DispatchDelay,
    pub rng_seed: Option<u64>,
}

impl PipelineConfig {
    /// No dispatch delay and a fixed seed.
    pub fn immediate(seed: u64) -> Self {
        Self {
            location_delay: DispatchDelay::NONE,
            rng_seed: Some(seed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Dispatching,
    Draining,
    Ranking,
    Synthesizing,
    Presented,
    SkippedEmpty,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Dispatching => "dispatching",
            PipelineState::Draining => "draining",
            PipelineState::Ranking => "ranking",
            PipelineState::Synthesizing => "synthesizing",
            PipelineState::Presented => "presented",
            PipelineState::SkippedEmpty => "skipped_empty",
            PipelineState::Done => "done",
        };
        f.write_str(s)
    }
}

/// One-time metrics registration.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "enrichment_jobs_total",
            "Enrichment jobs spawned, labelled by source."
        );
        describe_counter!(
            "enrichment_errors_total",
            "Per-photo errors drained from article error channels."
        );
        describe_counter!(
            "articles_presented_total",
            "Articles whose headlines were handed to the presenter."
        );
        describe_counter!(
            "articles_skipped_total",
            "Articles skipped because a source returned no results."
        );
    });
}
