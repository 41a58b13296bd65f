//! Batch orchestrator
//!
//! Drives the [`EntityResolver`] over an id range in fixed-size waves:
//!
//! 1. Split the ids into consecutive chunks of at most `chunk_size`
//! 2. Resolve every id of a chunk concurrently and wait for all of them
//! 3. Only then start the next chunk
//!
//! At most `chunk_size` person documents are in flight at once. Reference
//! lookups made on behalf of those people are not counted against the cap.

use anyhow::Result;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::{debug, info};

use crate::model::FlatRecord;
use crate::resolver::EntityResolver;

/// Maximum number of people resolved concurrently
pub const DEFAULT_CHUNK_SIZE: usize = 5;

pub struct BatchOrchestrator {
    resolver: EntityResolver,
    chunk_size: usize,
    show_progress: bool,
}

impl BatchOrchestrator {
    pub fn new(resolver: EntityResolver, chunk_size: usize) -> Result<Self> {
        anyhow::ensure!(chunk_size > 0, "Chunk size must be greater than 0");

        Ok(Self {
            resolver,
            chunk_size,
            show_progress: false,
        })
    }

    /// Draw an `indicatif` progress bar while running
    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Resolve every id, one chunk at a time
    ///
    /// The result has one slot per input id, in input order. People whose
    /// document could not be fetched are `None`.
    pub async fn run<I>(&self, ids: I) -> Vec<Option<FlatRecord>>
    where
        I: IntoIterator<Item = i32>,
    {
        let ids: Vec<i32> = ids.into_iter().collect();
        let chunks = plan_chunks(&ids, self.chunk_size);
        let progress = self.progress_bar(ids.len() as u64);
        let start = Instant::now();

        info!(
            "Resolving {} people in {} chunks (chunk_size={})",
            ids.len(),
            chunks.len(),
            self.chunk_size
        );

        let mut results = Vec::with_capacity(ids.len());
        for (chunk_idx, chunk) in chunks.iter().enumerate() {
            debug!(chunk = chunk_idx + 1, ids = ?chunk, "Starting chunk");

            // join_all yields in input order regardless of completion order
            let resolved = join_all(chunk.iter().map(|&id| self.resolver.resolve(id))).await;
            let found = resolved.iter().filter(|r| r.is_some()).count();
            results.extend(resolved);

            progress.inc(chunk.len() as u64);
            info!(
                "Chunk {} / {} complete: {} / {} found, {} / {} processed",
                chunk_idx + 1,
                chunks.len(),
                found,
                chunk.len(),
                results.len(),
                ids.len()
            );
        }

        progress.finish_and_clear();

        let resolved = results.iter().filter(|r| r.is_some()).count();
        info!(
            "Resolved {} / {} people in {:.2}s",
            resolved,
            ids.len(),
            start.elapsed().as_secs_f64()
        );

        results
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} people",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar
    }
}

/// Split `ids` into consecutive waves of at most `chunk_size`
///
/// A zero `chunk_size` yields an empty plan.
pub fn plan_chunks(ids: &[i32], chunk_size: usize) -> Vec<&[i32]> {
    if chunk_size == 0 {
        return Vec::new();
    }
    ids.chunks(chunk_size).collect()
}
