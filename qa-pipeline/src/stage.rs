//! Per-stage instrumentation.

use std::time::Duration;

use tracing::debug;

/// The observable stages of one `answer` call.
///
/// An explicit enum keeps stage reporting type-checked; there is no
/// name-string dispatch anywhere in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CacheLookup,
    Retrieve,
    Generate,
    CacheStore,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::CacheLookup => "cache_lookup",
            Stage::Retrieve => "retrieve",
            Stage::Generate => "generate",
            Stage::CacheStore => "cache_store",
        }
    }
}

/// Emits one structured event for a completed stage.
pub fn observe(stage: Stage, outcome: &str, elapsed: Duration) {
    debug!(
        stage = stage.as_str(),
        outcome,
        elapsed_ms = elapsed.as_millis() as u64,
        "pipeline stage finished"
    );
}
