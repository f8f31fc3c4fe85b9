// src/error.rs
use crate::photo::SourceKind;

/// Pipeline-level failures. Per-photo problems are never raised as errors;
/// they travel as messages on the article's error channel.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An article raised its cancellation signal. Terminal for the whole run.
    #[error("run cancelled by article {article}")]
    Cancelled { article: String },

    /// A collaborator tried to send after the source channel was closed.
    #[error("{kind} channel for article {article} is already closed")]
    ChannelClosed { article: String, kind: SourceKind },
}
