//! SWAPI Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the SWAPI ingest workspace.
//!
//! - **Error Handling**: [`SwapiError`] and the crate [`Result`] alias
//! - **Environment**: typed readers for process environment variables
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//!
//! # Example
//!
//! ```no_run
//! use swapi_common::env;
//!
//! fn db_name() -> swapi_common::Result<String> {
//!     env::required("DB_NAME")
//! }
//! ```

pub mod env;
pub mod error;
pub mod logging;

pub use error::{Result, SwapiError};
