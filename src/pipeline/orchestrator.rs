// src/pipeline/orchestrator.rs
//! ArticleOrchestrator: runs one pipeline per article and supervises them.

use anyhow::{Context, Result};
use metrics::counter;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::aggregate::{gather, Aggregated};
use super::channels::{BundleReceivers, ChannelBundle};
use super::fanout::EnrichmentFanOut;
use super::tracker::CompletionTracker;
use super::{ensure_metrics_described, shared_rng, PipelineConfig, PipelineState, SharedRng};
use crate::article::ArticleSource;
use crate::enrich::Enrichers;
use crate::error::PipelineError;
use crate::headline::{synthesize, HeadlineSet};
use crate::photo::{PhotoRecord, SourceKind};
use crate::present::Present;
use crate::ranking::RankedAttributeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleOutcome {
    Presented,
    /// At least one source produced no results.
    SkippedEmpty {
        locations: usize,
        weather: usize,
        pois: usize,
    },
    /// Photo rows could not be read. The run continues.
    Unreadable(String),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ArticleReport {
    pub article: String,
    pub outcome: ArticleOutcome,
    /// States visited, in order.
    pub states: Vec<PipelineState>,
    pub headlines: Option<HeadlineSet>,
    /// Per-photo messages drained from the error channel.
    pub errors: Vec<String>,
}

impl ArticleReport {
    fn new(article: &str) -> Self {
        Self {
            article: article.to_string(),
            outcome: ArticleOutcome::Cancelled,
            states: vec![PipelineState::Idle],
            headlines: None,
            errors: Vec::new(),
        }
    }

    fn enter(&mut self, state: PipelineState) {
        tracing::debug!(article = %self.article, %state, "state transition");
        self.states.push(state);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Sorted by article locator.
    pub articles: Vec<ArticleReport>,
}

impl RunReport {
    pub fn get(&self, article: &str) -> Option<&ArticleReport> {
        self.articles.iter().find(|a| a.article == article)
    }

    pub fn presented(&self) -> usize {
        self.count(|o| matches!(o, ArticleOutcome::Presented))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ArticleOutcome::SkippedEmpty { .. }))
    }

    fn count(&self, f: impl Fn(&ArticleOutcome) -> bool) -> usize {
        self.articles.iter().filter(|a| f(&a.outcome)).count()
    }
}

#[derive(Clone)]
pub struct ArticleOrchestrator {
    articles: Arc<dyn ArticleSource>,
    enrichers: Enrichers,
    presenter: Arc<dyn Present>,
    config: PipelineConfig,
    rng: SharedRng,
}

impl ArticleOrchestrator {
    pub fn new(
        articles: Arc<dyn ArticleSource>,
        enrichers: Enrichers,
        presenter: Arc<dyn Present>,
        config: PipelineConfig,
    ) -> Self {
        let rng = shared_rng(config.rng_seed);
        Self {
            articles,
            enrichers,
            presenter,
            config,
            rng,
        }
    }

    /// Process every article concurrently. Returns once every pipeline and
    /// every enrichment job has finished, including when a pipeline panics.
    ///
    /// An article raising its cancellation signal shuts the whole run down
    /// and the run fails with `PipelineError::Cancelled`. A panicking article
    /// task also shuts the run down, and the run fails with its `JoinError`.
    pub async fn run(&self) -> Result<RunReport> {
        ensure_metrics_described();
        let articles = self
            .articles
            .list_articles()
            .await
            .context("listing articles")?;
        tracing::info!(count = articles.len(), "articles found");

        let run_token = CancellationToken::new();
        let mut trackers = Vec::with_capacity(articles.len());
        let mut set = JoinSet::new();
        for article in articles {
            let this = self.clone();
            let token = run_token.clone();
            let tracker = CompletionTracker::new();
            trackers.push(tracker.clone());
            set.spawn(async move { this.run_article(&article, &tracker, &token).await });
        }

        let mut report = RunReport::default();
        let mut cancelled_by = None;
        let mut failed = None;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((article, cancel)) => {
                    if let Err(PipelineError::Cancelled { article: origin }) = cancel {
                        cancelled_by.get_or_insert(origin);
                    }
                    report.articles.push(article);
                }
                Err(e) => {
                    tracing::error!(error = %e, "article pipeline task failed, shutting the run down");
                    run_token.cancel();
                    failed.get_or_insert(e);
                }
            }
        }

        // Jobs of a failed pipeline are detached. They unwind through shutdown.
        for tracker in &trackers {
            tracker.wait_all().await;
        }
        report.articles.sort_by(|a, b| a.article.cmp(&b.article));

        if let Some(e) = failed {
            return Err(e).context("article pipeline task failed");
        }
        if let Some(article) = cancelled_by {
            tracing::error!(%article, "run cancelled");
            return Err(PipelineError::Cancelled { article }.into());
        }
        tracing::info!(
            presented = report.presented(),
            skipped = report.skipped(),
            "run finished"
        );
        Ok(report)
    }

    /// One article end to end, counted on `tracker`. The caller waits on the
    /// tracker for detached jobs. The second element is `Err` only when this
    /// article raised the run-wide cancellation.
    pub async fn run_article(
        &self,
        article: &str,
        tracker: &CompletionTracker,
        run_token: &CancellationToken,
    ) -> (ArticleReport, Result<(), PipelineError>) {
        let mut report = ArticleReport::new(article);
        let headline_guard = tracker.headline.register();

        let photos: Arc<[PhotoRecord]> = match self.articles.read_photo_records(article).await {
            Ok(p) => p.into(),
            Err(e) => {
                tracing::warn!(%article, error = %format!("{e:#}"), "article unreadable, skipped");
                report.outcome = ArticleOutcome::Unreadable(format!("{e:#}"));
                report.enter(PipelineState::Done);
                return (report, Ok(()));
            }
        };

        let (bundle, receivers) = ChannelBundle::for_article(article, run_token);
        let BundleReceivers {
            mut location,
            mut weather,
            mut poi,
            errors,
        } = receivers;

        report.enter(PipelineState::Dispatching);
        let fanout = EnrichmentFanOut::new(
            self.enrichers.clone(),
            self.config.location_delay,
            self.rng.clone(),
        );
        fanout.dispatch(photos, &bundle, tracker);
        spawn_closers(&bundle, tracker);

        report.enter(PipelineState::Draining);
        let (supervised, aggregated) = tokio::join!(
            supervise(&bundle, errors, run_token),
            gather(&mut location, &mut weather, &mut poi),
        );
        let (errors, cancel) = supervised;
        report.errors = errors;

        if bundle.shutdown().is_cancelled() {
            tracing::warn!(%article, "pipeline stopped by run cancellation");
            report.outcome = ArticleOutcome::Cancelled;
        } else {
            self.conclude(&mut report, &aggregated);
        }
        report.enter(PipelineState::Done);

        drop(headline_guard);
        (report, cancel)
    }

    fn conclude(&self, report: &mut ArticleReport, aggregated: &Aggregated) {
        if aggregated.any_empty() {
            tracing::warn!(
                article = %report.article,
                locations = aggregated.locations.len(),
                weather = aggregated.weather.len(),
                pois = aggregated.pois.len(),
                "not enough data retrieved, article skipped"
            );
            counter!("articles_skipped_total").increment(1);
            report.outcome = ArticleOutcome::SkippedEmpty {
                locations: aggregated.locations.len(),
                weather: aggregated.weather.len(),
                pois: aggregated.pois.len(),
            };
            report.enter(PipelineState::SkippedEmpty);
            return;
        }

        report.enter(PipelineState::Ranking);
        let ranked =
            RankedAttributeSet::rank(&aggregated.locations, &aggregated.weather, &aggregated.pois);
        tracing::debug!(article = %report.article, ?ranked, "attributes ranked");

        report.enter(PipelineState::Synthesizing);
        let headlines = {
            let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
            synthesize(&ranked, &mut *rng)
        };

        self.presenter.present(&report.article, &headlines);
        counter!("articles_presented_total").increment(1);
        report.headlines = Some(headlines);
        report.outcome = ArticleOutcome::Presented;
        report.enter(PipelineState::Presented);
    }
}

/// One closer per source: waits for the source group to drain, then closes
/// its channel. The error channel closes after all three.
pub fn spawn_closers(bundle: &Arc<ChannelBundle>, tracker: &CompletionTracker) {
    for kind in SourceKind::ALL {
        let group = tracker.group(kind).clone();
        let bundle = bundle.clone();
        tokio::spawn(async move {
            group.wait_idle().await;
            if bundle.close(kind) {
                tracing::debug!(article = %bundle.article(), group = group.name(), "source drained, channel closed");
            }
        });
    }

    let tracker = tracker.clone();
    let bundle = bundle.clone();
    tokio::spawn(async move {
        tokio::join!(
            tracker.location.wait_idle(),
            tracker.weather.wait_idle(),
            tracker.poi.wait_idle(),
        );
        bundle.close_errors();
    });
}

/// Drains the error channel until it closes. A raised cancellation signal
/// cancels the run and ends supervision with `PipelineError::Cancelled`.
async fn supervise(
    bundle: &ChannelBundle,
    mut errors: mpsc::Receiver<String>,
    run_token: &CancellationToken,
) -> (Vec<String>, Result<(), PipelineError>) {
    let mut seen = Vec::new();
    let cancelled = || -> Result<(), PipelineError> {
        tracing::error!(article = %bundle.article(), "cancellation signal raised, shutting the run down");
        run_token.cancel();
        Err(PipelineError::Cancelled {
            article: bundle.article().to_string(),
        })
    };

    loop {
        tokio::select! {
            biased;
            _ = bundle.cancel_signal().cancelled() => return (seen, cancelled()),
            _ = bundle.shutdown().cancelled() => return (seen, Ok(())),
            msg = errors.recv() => match msg {
                Some(msg) => {
                    tracing::warn!(article = %bundle.article(), error = %msg, "enrichment error");
                    counter!("enrichment_errors_total").increment(1);
                    seen.push(msg);
                }
                None => break,
            },
        }
    }

    // The signal is raised before the raising job deregisters.
    if bundle.cancel_signal().is_cancelled() {
        return (seen, cancelled());
    }
    (seen, Ok(()))
}
