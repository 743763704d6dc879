// src/lib.rs
// Public library surface for the demo binary and integration tests.

pub mod analyze;
pub mod assets;
pub mod config;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod pipeline;
pub mod quota;
pub mod similarity;
pub mod store;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::error::{ErrorCode, FailureExtra, GenerationFailure};
pub use crate::pipeline::{
    GenerateRequest, GenerationPipeline, GenerationResult, ProgressEvent, Stage,
};
pub use crate::types::{CandidateTopic, Category, ContentItem};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "pipeline=info,quota=info,dedup=info,generator=info,store=info,warn";

/// Install a compact fmt subscriber. Safe to call more than once (later calls are no-ops).
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
