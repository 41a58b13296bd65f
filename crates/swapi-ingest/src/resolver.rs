//! Entity resolver: one person document in, one [`FlatRecord`] out

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::aggregate::FieldAggregator;
use crate::fetch::RemoteFetcher;
use crate::model::{DisplayField, FlatRecord, Lookup};

/// Resolves people and their nested references against one API base URL
#[derive(Debug, Clone)]
pub struct EntityResolver {
    fetcher: RemoteFetcher,
    aggregator: FieldAggregator,
    base_url: String,
}

impl EntityResolver {
    pub fn new(fetcher: RemoteFetcher, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            aggregator: FieldAggregator::new(fetcher.clone()),
            fetcher,
            base_url,
        }
    }

    /// `<base>/people/{id}/`
    pub fn person_url(&self, id: i32) -> String {
        format!("{}/people/{}/", self.base_url, id)
    }

    /// Fetch person `id` and flatten it
    ///
    /// Returns `None` only when the person document itself cannot be fetched.
    /// Reference lookups that fail leave their column empty.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, id: i32) -> Option<FlatRecord> {
        let url = self.person_url(id);
        let person = match self.fetcher.fetch_document(&url).await {
            Ok(document) => document,
            Err(err) => {
                warn!(person_id = id, error = %err, "Failed to fetch person");
                return None;
            },
        };

        // All reference columns for this person resolve concurrently.
        let (homeworld, films, species, starships, vehicles) = tokio::join!(
            self.resolve_single(&person, "homeworld"),
            self.resolve_list(&person, "films", DisplayField::Title),
            self.resolve_list(&person, "species", DisplayField::Name),
            self.resolve_list(&person, "starships", DisplayField::Name),
            self.resolve_list(&person, "vehicles", DisplayField::Name),
        );

        let scalar = |key: &str| Lookup::scalar(&person, key).into_string();
        let record = FlatRecord {
            id,
            birth_year: scalar("birth_year"),
            eye_color: scalar("eye_color"),
            gender: scalar("gender"),
            hair_color: scalar("hair_color"),
            height: scalar("height"),
            homeworld: homeworld.into_string(),
            mass: scalar("mass"),
            name: scalar("name"),
            skin_color: scalar("skin_color"),
            films: films.into_string(),
            species: species.into_string(),
            starships: starships.into_string(),
            vehicles: vehicles.into_string(),
        };

        debug!(person_id = id, name = %record.name, "Resolved person");
        Some(record)
    }

    async fn resolve_single(&self, person: &Value, key: &str) -> Lookup {
        match reference(person, key) {
            Some(url) => self.fetcher.fetch_field(url, DisplayField::Name).await,
            None => Lookup::Missing,
        }
    }

    async fn resolve_list(&self, person: &Value, key: &str, field: DisplayField) -> Lookup {
        let urls = references(person, key);
        if urls.is_empty() {
            return Lookup::Missing;
        }
        self.aggregator.aggregate(&urls, field).await
    }
}

/// A single URL-valued field; blank strings count as absent
fn reference<'a>(document: &'a Value, key: &str) -> Option<&'a str> {
    document
        .get(key)
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}

/// A list of URLs; non-string members are skipped
fn references<'a>(document: &'a Value, key: &str) -> Vec<&'a str> {
    document
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
