// src/pipeline/channels.rs
//! Per-article channel bundle: three result channels, an error channel and
//! the article's cancellation signal.
//!
//! Invariants:
//! - every channel is closed exactly once, by `close`/`close_errors`
//! - a send after close is rejected with `PipelineError::ChannelClosed`, never written
//! - workers share the bundle through `Arc`, the receivers stay with the pipeline

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::photo::{LocationResult, PoiResult, SourceKind, WeatherResult};

/// One slot per result. A sender blocks until the aggregator takes the value.
pub const CHANNEL_CAPACITY: usize = 1;

/// Sending half that can be closed from one place while workers hold the bundle.
struct Gate<T> {
    tx: Mutex<Option<mpsc::Sender<T>>>,
}

impl<T> Gate<T> {
    fn new(tx: mpsc::Sender<T>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn sender(&self) -> Option<mpsc::Sender<T>> {
        self.tx.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    async fn send(&self, value: T) -> bool {
        match self.sender() {
            Some(tx) => tx.send(value).await.is_ok(),
            None => false,
        }
    }

    /// Drops the held sender. Returns `false` if it was already closed.
    fn close(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
            .is_some()
    }

    fn is_closed(&self) -> bool {
        self.tx.lock().unwrap_or_else(|p| p.into_inner()).is_none()
    }
}

pub struct ChannelBundle {
    article: String,
    location: Gate<LocationResult>,
    weather: Gate<WeatherResult>,
    poi: Gate<PoiResult>,
    errors: Gate<String>,
    /// Raised by a collaborator on an unrecoverable failure.
    cancel: CancellationToken,
    /// Observed by workers; cancelled when the run shuts down.
    shutdown: CancellationToken,
}

/// Receiving halves, owned by the article pipeline and its supervisor.
pub struct BundleReceivers {
    pub location: mpsc::Receiver<LocationResult>,
    pub weather: mpsc::Receiver<WeatherResult>,
    pub poi: mpsc::Receiver<PoiResult>,
    pub errors: mpsc::Receiver<String>,
}

impl ChannelBundle {
    /// ChannelBundleFactory: fresh channels for one article.
    /// `run` is the run-wide token; the bundle's shutdown token is its child.
    pub fn for_article(article: &str, run: &CancellationToken) -> (Arc<Self>, BundleReceivers) {
        let (loc_tx, loc_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (wea_tx, wea_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (poi_tx, poi_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (err_tx, err_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let bundle = Arc::new(Self {
            article: article.to_string(),
            location: Gate::new(loc_tx),
            weather: Gate::new(wea_tx),
            poi: Gate::new(poi_tx),
            errors: Gate::new(err_tx),
            cancel: CancellationToken::new(),
            shutdown: run.child_token(),
        });
        let receivers = BundleReceivers {
            location: loc_rx,
            weather: wea_rx,
            poi: poi_rx,
            errors: err_rx,
        };
        (bundle, receivers)
    }

    pub fn article(&self) -> &str {
        &self.article
    }

    pub async fn send_location(&self, v: LocationResult) -> Result<(), PipelineError> {
        self.location
            .send(v)
            .await
            .then_some(())
            .ok_or_else(|| self.closed(SourceKind::Location))
    }

    pub async fn send_weather(&self, v: WeatherResult) -> Result<(), PipelineError> {
        self.weather
            .send(v)
            .await
            .then_some(())
            .ok_or_else(|| self.closed(SourceKind::Weather))
    }

    pub async fn send_poi(&self, v: PoiResult) -> Result<(), PipelineError> {
        self.poi
            .send(v)
            .await
            .then_some(())
            .ok_or_else(|| self.closed(SourceKind::Poi))
    }

    /// Per-photo, recoverable failure. Dropped with a log line if the
    /// error channel is already closed.
    pub async fn report_error(&self, msg: impl Into<String>) {
        let msg = msg.into();
        if !self.errors.send(msg.clone()).await {
            tracing::warn!(article = %self.article, error = %msg, "error channel closed, message dropped");
        }
    }

    /// Raise the article's cancellation signal.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_signal(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Close one source channel. Returns `false` if it was already closed.
    pub fn close(&self, kind: SourceKind) -> bool {
        let closed = match kind {
            SourceKind::Location => self.location.close(),
            SourceKind::Weather => self.weather.close(),
            SourceKind::Poi => self.poi.close(),
        };
        if !closed {
            tracing::warn!(article = %self.article, source = %kind, "channel closed twice");
        }
        closed
    }

    pub fn close_errors(&self) -> bool {
        self.errors.close()
    }

    pub fn is_closed(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Location => self.location.is_closed(),
            SourceKind::Weather => self.weather.is_closed(),
            SourceKind::Poi => self.poi.is_closed(),
        }
    }

    fn closed(&self, kind: SourceKind) -> PipelineError {
        PipelineError::ChannelClosed {
            article: self.article.clone(),
            kind,
        }
    }
}
