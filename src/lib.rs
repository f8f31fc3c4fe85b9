// src/lib.rs
// Library surface shared by the binary and the integration tests.

pub mod article;
pub mod config;
pub mod enrich;
pub mod error;
pub mod headline;
pub mod photo;
pub mod pipeline;
pub mod present;
pub mod ranking;

pub use crate::error::PipelineError;
pub use crate::pipeline::{ArticleOrchestrator, PipelineConfig, RunReport};
