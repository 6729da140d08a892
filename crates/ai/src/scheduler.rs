use std::time::Instant;

use tracing::{debug, warn};

use crate::job::AiJob;
use crate::result::AiError;

/// Scheduler/executor for AI jobs.
///
/// This is intentionally minimal and storage/runtime agnostic.
pub trait AiScheduler: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn run<J: AiJob>(&self, job: J) -> Result<J::Output, AiError> {
        let started = Instant::now();
        let result = job.run();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(scheduler = self.name(), job = job.kind(), elapsed_ms, "ai job finished"),
            Err(e) => warn!(scheduler = self.name(), job = job.kind(), elapsed_ms, error = %e, "ai job failed"),
        }
        result
    }
}

/// Simple synchronous scheduler that runs jobs immediately on the calling thread.
#[derive(Debug, Clone)]
pub struct LocalAiScheduler {
    name: String,
}

impl LocalAiScheduler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LocalAiScheduler {
    fn default() -> Self {
        Self::new("local")
    }
}

impl AiScheduler for LocalAiScheduler {
    fn name(&self) -> &str {
        &self.name
    }
}
