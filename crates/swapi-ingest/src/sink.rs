//! Persistence sink for flattened people
//!
//! Rows are written with multi-row `INSERT`s inside one transaction, so a run
//! either stores every resolved person or none of them. Statements are split
//! at [`ROWS_PER_STATEMENT`] rows to stay far below PostgreSQL's 65,535 bind
//! parameter limit (14 binds per row).

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::model::FlatRecord;

pub const TABLE_NAME: &str = "swapi_people";

/// Column order shared by the schema and the insert statement
pub const COLUMNS: [&str; 14] = [
    "id",
    "birth_year",
    "eye_color",
    "gender",
    "hair_color",
    "height",
    "homeworld",
    "mass",
    "name",
    "skin_color",
    "films",
    "species",
    "starships",
    "vehicles",
];

pub const ROWS_PER_STATEMENT: usize = 500;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS swapi_people (
    id          INTEGER PRIMARY KEY,
    birth_year  VARCHAR(50) NOT NULL,
    eye_color   VARCHAR(50) NOT NULL,
    gender      VARCHAR(50) NOT NULL,
    hair_color  VARCHAR(50) NOT NULL,
    height      VARCHAR(50) NOT NULL,
    homeworld   VARCHAR(50) NOT NULL,
    mass        VARCHAR(50) NOT NULL,
    name        VARCHAR(50) NOT NULL,
    skin_color  VARCHAR(50) NOT NULL,
    films       TEXT NOT NULL,
    species     TEXT NOT NULL,
    starships   TEXT NOT NULL,
    vehicles    TEXT NOT NULL
)
"#;

/// Destination for a finished batch
#[async_trait]
pub trait PeopleSink: Send + Sync {
    /// Write every present record; absent slots are skipped
    ///
    /// Returns the number of rows written.
    async fn persist(&self, records: &[Option<FlatRecord>]) -> Result<usize>;
}

/// The records that will actually be written, in input order
pub fn persistable(records: &[Option<FlatRecord>]) -> Vec<&FlatRecord> {
    records.iter().flatten().collect()
}

/// `swapi_people` table in PostgreSQL
#[derive(Debug, Clone)]
pub struct PgPeopleSink {
    pool: PgPool,
}

impl PgPeopleSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the run's connection pool
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_url())
            .await
            .with_context(|| format!("Failed to connect to database at {}", config.target()))?;

        info!("Connected to database at {}", config.target());
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .context("Failed to create swapi_people table")?;

        debug!("Schema ready");
        Ok(())
    }

    /// Close the pool, waiting for the connection to be released
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn insert_chunk(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        chunk: &[&FlatRecord],
    ) -> Result<()> {
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} ({}) ", TABLE_NAME, COLUMNS.join(", ")));

        query_builder.push_values(chunk.iter().copied(), |mut b, record| {
            b.push_bind(record.id);
            for (_, value) in record.text_columns() {
                b.push_bind(value);
            }
        });

        query_builder.push(" ON CONFLICT (id) DO UPDATE SET ");
        query_builder.push(upsert_assignments());

        query_builder
            .build()
            .execute(&mut **tx)
            .await
            .context("Failed to insert people batch")?;

        Ok(())
    }
}

#[async_trait]
impl PeopleSink for PgPeopleSink {
    async fn persist(&self, records: &[Option<FlatRecord>]) -> Result<usize> {
        let rows = persistable(records);
        if rows.is_empty() {
            info!("No people to store");
            return Ok(0);
        }

        info!(
            "Storing {} people ({} absent skipped)",
            rows.len(),
            records.len() - rows.len()
        );

        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        for chunk in rows.chunks(ROWS_PER_STATEMENT) {
            self.insert_chunk(&mut tx, chunk).await?;
        }

        tx.commit().await.context("Failed to commit transaction")?;

        info!("Stored {} people", rows.len());
        Ok(rows.len())
    }
}

/// `birth_year = EXCLUDED.birth_year, ...` for every non-key column
fn upsert_assignments() -> String {
    COLUMNS[1..]
        .iter()
        .map(|column| format!("{column} = EXCLUDED.{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}
