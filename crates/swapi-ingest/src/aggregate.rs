//! Field aggregator: resolve a list of references into one joined column

use futures::future::join_all;

use crate::fetch::RemoteFetcher;
use crate::model::{DisplayField, Lookup, LIST_SEPARATOR};

/// Resolves reference lists concurrently through a shared [`RemoteFetcher`]
#[derive(Debug, Clone)]
pub struct FieldAggregator {
    fetcher: RemoteFetcher,
}

impl FieldAggregator {
    pub fn new(fetcher: RemoteFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch every URL at once and join the non-empty results in input order
    ///
    /// Fan-out is not capped here; the batch orchestrator only limits how
    /// many people are in flight. All lookups run to completion even when
    /// some of them fail.
    pub async fn aggregate<S>(&self, urls: &[S], field: DisplayField) -> Lookup
    where
        S: AsRef<str>,
    {
        if urls.is_empty() {
            return Lookup::Missing;
        }

        let lookups = join_all(
            urls.iter()
                .map(|url| self.fetcher.fetch_field(url.as_ref(), field)),
        )
        .await;

        join_present(lookups)
    }
}

/// Join the present lookups with [`LIST_SEPARATOR`]; `Missing` when none are
fn join_present(lookups: Vec<Lookup>) -> Lookup {
    let parts: Vec<String> = lookups
        .into_iter()
        .filter(Lookup::is_present)
        .map(Lookup::into_string)
        .collect();

    if parts.is_empty() {
        Lookup::Missing
    } else {
        Lookup::Found(parts.join(LIST_SEPARATOR))
    }
}
