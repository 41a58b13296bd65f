//! End-to-end ingest run: resolve a range of people, then persist them

use anyhow::Result;
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::IngestConfig;
use crate::fetch::RemoteFetcher;
use crate::orchestrator::BatchOrchestrator;
use crate::resolver::EntityResolver;
use crate::sink::PeopleSink;

/// Counts reported at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub requested: usize,
    pub resolved: usize,
    pub persisted: usize,
    pub duration: Duration,
}

impl IngestSummary {
    /// Ids whose person document could not be fetched
    pub fn missing(&self) -> usize {
        self.requested - self.resolved
    }
}

/// Orchestrator plus sink for one run
pub struct IngestPipeline<S> {
    orchestrator: BatchOrchestrator,
    sink: S,
    ids: Range<i32>,
}

impl<S: PeopleSink> IngestPipeline<S> {
    pub fn new(orchestrator: BatchOrchestrator, sink: S, ids: Range<i32>) -> Self {
        Self {
            orchestrator,
            sink,
            ids,
        }
    }

    /// Wire a pipeline from configuration and an already built HTTP client
    pub fn from_config(config: &IngestConfig, client: reqwest::Client, sink: S) -> Result<Self> {
        let resolver = EntityResolver::new(RemoteFetcher::new(client), config.base_url.clone());
        let orchestrator = BatchOrchestrator::new(resolver, config.chunk_size)?;
        Ok(Self::new(orchestrator, sink, config.ids.clone()))
    }

    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        self.orchestrator = self.orchestrator.with_progress_bar(enabled);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Resolve every id, then write the batch
    ///
    /// Persistence errors abort the run; missing people do not.
    pub async fn run(&self) -> Result<IngestSummary> {
        let start = Instant::now();

        info!(
            "Starting ingest of people {}..{} (chunk_size={})",
            self.ids.start,
            self.ids.end,
            self.orchestrator.chunk_size()
        );

        let records = self.orchestrator.run(self.ids.clone()).await;
        let resolved = records.iter().filter(|r| r.is_some()).count();
        let persisted = self.sink.persist(&records).await?;

        let summary = IngestSummary {
            requested: records.len(),
            resolved,
            persisted,
            duration: start.elapsed(),
        };

        info!(
            "Ingest complete: {} requested, {} resolved, {} missing, {} stored in {:.2}s",
            summary.requested,
            summary.resolved,
            summary.missing(),
            summary.persisted,
            summary.duration.as_secs_f64()
        );

        Ok(summary)
    }
}
