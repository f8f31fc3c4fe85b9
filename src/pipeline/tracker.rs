// src/pipeline/tracker.rs
//! Completion tracking: one counting group per source plus one for the
//! headline task of an article.
//!
//! Registration hands out a guard; dropping it deregisters. A guard is
//! dropped exactly once, also when its task panics or is cancelled, so a
//! counter never goes below the number of registrations.

use std::sync::Arc;
use tokio::sync::watch;

use crate::photo::SourceKind;

#[derive(Clone)]
pub struct CompletionGroup {
    inner: Arc<GroupInner>,
}

struct GroupInner {
    name: &'static str,
    pending: watch::Sender<usize>,
}

#[must_use = "dropping the guard immediately marks the work as finished"]
pub struct CompletionGuard {
    inner: Arc<GroupInner>,
}

impl CompletionGroup {
    pub fn new(name: &'static str) -> Self {
        let (pending, _) = watch::channel(0usize);
        Self {
            inner: Arc::new(GroupInner { name, pending }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Register one unit of work. Call before the work is started.
    pub fn register(&self) -> CompletionGuard {
        self.inner.pending.send_modify(|n| *n += 1);
        CompletionGuard {
            inner: self.inner.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        *self.inner.pending.borrow()
    }

    /// Resolves once the counter is zero. Resolves immediately if it already is.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.pending.subscribe();
        // The sender lives in `inner`, so the channel cannot close under us.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.inner.pending.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Counting groups of one article.
#[derive(Clone)]
pub struct CompletionTracker {
    pub location: CompletionGroup,
    pub weather: CompletionGroup,
    pub poi: CompletionGroup,
    pub headline: CompletionGroup,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self {
            location: CompletionGroup::new("location"),
            weather: CompletionGroup::new("weather"),
            poi: CompletionGroup::new("poi"),
            headline: CompletionGroup::new("headline"),
        }
    }

    pub fn group(&self, kind: SourceKind) -> &CompletionGroup {
        match kind {
            SourceKind::Location => &self.location,
            SourceKind::Weather => &self.weather,
            SourceKind::Poi => &self.poi,
        }
    }

    /// All four counters at zero.
    pub async fn wait_all(&self) {
        tokio::join!(
            self.location.wait_idle(),
            self.weather.wait_idle(),
            self.poi.wait_idle(),
            self.headline.wait_idle(),
        );
    }

    pub fn is_idle(&self) -> bool {
        [&self.location, &self.weather, &self.poi, &self.headline]
            .iter()
            .all(|g| g.pending() == 0)
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}
