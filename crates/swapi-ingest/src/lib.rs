//! SWAPI Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Fetches people from the Star Wars API, resolves the resources they link to
//! (homeworld, films, species, starships, vehicles) and stores one flattened
//! row per person in PostgreSQL.
//!
//! # Pipeline
//!
//! - [`fetch`]: single GET, extract `name` / `title`
//! - [`aggregate`]: resolve a list of links concurrently and join the names
//! - [`resolver`]: person document to [`model::FlatRecord`]
//! - [`orchestrator`]: id range in chunks with bounded concurrency
//! - [`sink`]: transactional bulk insert
//! - [`pipeline`]: the above glued together for one run
//!
//! # Example
//!
//! ```no_run
//! use swapi_ingest::config::Config;
//! use swapi_ingest::fetch::RemoteFetcher;
//! use swapi_ingest::pipeline::IngestPipeline;
//! use swapi_ingest::sink::PgPeopleSink;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let sink = PgPeopleSink::connect(&config.database).await?;
//!     sink.ensure_schema().await?;
//!
//!     let client = RemoteFetcher::build_client()?;
//!     let pipeline = IngestPipeline::from_config(&config.ingest, client, sink)?;
//!     pipeline.run().await?;
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod fetch;
pub mod model;
pub mod orchestrator;
pub mod pipeline;
pub mod resolver;
pub mod sink;

pub use model::{DisplayField, FlatRecord, Lookup};
