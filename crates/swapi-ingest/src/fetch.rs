//! Remote fetcher
//!
//! One GET per call through a shared [`reqwest::Client`]. There is no retry,
//! backoff or timeout override: a request either succeeds on the first attempt
//! or its caller gets a [`FetchError`] / [`Lookup::Missing`].

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{DisplayField, Lookup};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("swapi-ingest/", env!("CARGO_PKG_VERSION"));

/// Why a document could not be fetched
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with anything other than 200 OK
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned invalid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// True for the "not found / unavailable" signal, as opposed to a failure
    pub fn is_status(&self) -> bool {
        matches!(self, FetchError::Status { .. })
    }
}

/// Thin wrapper over the run's HTTP connection pool
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
}

impl RemoteFetcher {
    /// Wrap an existing client; clones share its connection pool
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the client used for a run
    pub fn build_client() -> Result<Client, reqwest::Error> {
        Client::builder().user_agent(USER_AGENT).build()
    }

    /// GET `url` and decode the body as JSON
    ///
    /// Only an exact 200 counts as success.
    pub async fn fetch_document(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// GET a referenced resource and read its `name` or `title`
    ///
    /// Never fails: non-200 responses are silent, transport and decode errors
    /// are logged, and both come back as [`Lookup::Missing`].
    pub async fn fetch_field(&self, url: &str, field: DisplayField) -> Lookup {
        match self.fetch_document(url).await {
            Ok(document) => Lookup::display(&document, field),
            Err(err) if err.is_status() => {
                debug!(url, error = %err, "Reference not available");
                Lookup::Missing
            },
            Err(err) => {
                warn!(url, error = %err, "Reference lookup failed");
                Lookup::Missing
            },
        }
    }
}
