//! Shared fixtures for the ingest integration tests
//!
//! - `StubApi`: a wiremock server that serves SWAPI-shaped documents
//! - `ArrivalLog`: records when each request reached the stub server
//! - `MemorySink`: an in-process [`PeopleSink`] for pipeline tests
//! - `TestPostgres`: a throwaway PostgreSQL container (Docker required)

#![allow(dead_code)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use swapi_ingest::config::DatabaseConfig;
use swapi_ingest::fetch::RemoteFetcher;
use swapi_ingest::resolver::EntityResolver;
use swapi_ingest::sink::PeopleSink;
use swapi_ingest::FlatRecord;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

// ============================================================================
// Stub SWAPI
// ============================================================================

pub struct StubApi {
    pub server: MockServer,
}

impl StubApi {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Absolute URL for a resource path such as `/films/1/`
    pub fn url(&self, resource_path: &str) -> String {
        format!("{}{}", self.server.uri(), resource_path)
    }

    pub async fn serve_json(&self, resource_path: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(resource_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn serve_json_delayed(&self, resource_path: &str, body: Value, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(resource_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve `body` after `delay`, recording each arrival in `log`
    pub async fn serve_json_logged(
        &self,
        resource_path: &str,
        body: Value,
        delay: Duration,
        log: &ArrivalLog,
    ) {
        let responder = LoggedResponder {
            log: log.clone(),
            template: ResponseTemplate::new(200)
                .set_body_json(body)
                .set_delay(delay),
        };
        Mock::given(method("GET"))
            .and(path(resource_path))
            .respond_with(responder)
            .mount(&self.server)
            .await;
    }

    pub async fn serve_status(&self, resource_path: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(resource_path))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn serve_raw(&self, resource_path: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(resource_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Paths of every request received so far, in arrival order
    pub async fn request_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| request.url.path().to_string())
            .collect()
    }

    pub fn fetcher(&self) -> RemoteFetcher {
        RemoteFetcher::new(reqwest::Client::new())
    }

    pub fn resolver(&self) -> EntityResolver {
        EntityResolver::new(self.fetcher(), self.base_url())
    }
}

// ============================================================================
// Request arrival log
// ============================================================================

/// Arrival instants of requests served through [`StubApi::serve_json_logged`]
///
/// Every logged mock answers after the same fixed delay, so a request that
/// arrived at `t` is in flight until at least `t + delay`.
#[derive(Clone, Default)]
pub struct ArrivalLog {
    arrivals: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl ArrivalLog {
    pub fn arrivals(&self) -> Vec<(String, Instant)> {
        self.arrivals
            .lock()
            .map(|arrivals| arrivals.clone())
            .unwrap_or_default()
    }

    pub fn arrival_of(&self, resource_path: &str) -> Option<Instant> {
        self.arrivals()
            .into_iter()
            .find(|(path, _)| path == resource_path)
            .map(|(_, at)| at)
    }

    /// Largest number of requests whose arrivals fall within one `delay`
    /// window, i.e. the peak number of requests in flight at the server
    pub fn max_in_flight(&self, delay: Duration) -> usize {
        let mut instants: Vec<Instant> = self.arrivals().into_iter().map(|(_, at)| at).collect();
        instants.sort();

        instants
            .iter()
            .enumerate()
            .map(|(idx, &start)| {
                instants[idx..]
                    .iter()
                    .take_while(|&&at| at.duration_since(start) < delay)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }
}

struct LoggedResponder {
    log: ArrivalLog,
    template: ResponseTemplate,
}

impl Respond for LoggedResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if let Ok(mut arrivals) = self.log.arrivals.lock() {
            arrivals.push((request.url.path().to_string(), Instant::now()));
        }
        self.template.clone()
    }
}

/// A person document with no references at all
pub fn bare_person(name: &str) -> Value {
    json!({
        "name": name,
        "height": "96",
        "mass": "32",
        "hair_color": "n/a",
        "skin_color": "white, blue",
        "eye_color": "red",
        "birth_year": "33BBY",
        "gender": "n/a",
        "films": [],
        "species": [],
        "starships": [],
        "vehicles": [],
    })
}

// ============================================================================
// In-memory sink
// ============================================================================

#[derive(Default)]
pub struct MemorySink {
    pub rows: Mutex<Vec<FlatRecord>>,
    pub fail: bool,
}

impl MemorySink {
    pub fn failing() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn stored_ids(&self) -> Vec<i32> {
        self.rows
            .lock()
            .map(|rows| rows.iter().map(|r| r.id).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PeopleSink for MemorySink {
    async fn persist(&self, records: &[Option<FlatRecord>]) -> Result<usize> {
        if self.fail {
            anyhow::bail!("Failed to commit transaction");
        }

        let present: Vec<FlatRecord> = records.iter().flatten().cloned().collect();
        let count = present.len();
        self.rows
            .lock()
            .map_err(|_| anyhow::anyhow!("sink mutex poisoned"))?
            .extend(present);
        Ok(count)
    }
}

// ============================================================================
// PostgreSQL Test Container
// ============================================================================

pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    pub database: DatabaseConfig,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        let container = Postgres::default()
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let database = DatabaseConfig {
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            host: host.to_string(),
            port,
            name: "postgres".to_string(),
            url_override: None,
            max_connections: 1,
        };

        Ok(Self {
            _container: container,
            database,
        })
    }
}
