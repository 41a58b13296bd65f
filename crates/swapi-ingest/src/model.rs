//! Records produced by the ingest pipeline

use serde_json::Value;

/// Separator used when a list of references is flattened into one column
pub const LIST_SEPARATOR: &str = ", ";

/// Which display attribute a referenced resource is read by
///
/// Films carry a `title`; every other SWAPI resource carries a `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayField {
    Name,
    Title,
}

impl DisplayField {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayField::Name => "name",
            DisplayField::Title => "title",
        }
    }
}

impl std::fmt::Display for DisplayField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reading one value out of a remote document
///
/// `Missing` covers every way a lookup can come up empty (absent key, non-200
/// response, transport or decode failure). The distinction only collapses to
/// an empty string once a [`FlatRecord`] is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Lookup {
    Found(String),
    #[default]
    Missing,
}

impl Lookup {
    /// Read `key` from a JSON object as a scalar string
    ///
    /// Strings are taken verbatim, numbers and booleans by their JSON text.
    /// Null, arrays, objects and absent keys are `Missing`.
    pub fn scalar(document: &Value, key: &str) -> Self {
        match document.get(key) {
            Some(Value::String(s)) => Lookup::Found(s.clone()),
            Some(value @ (Value::Number(_) | Value::Bool(_))) => Lookup::Found(value.to_string()),
            _ => Lookup::Missing,
        }
    }

    /// Read a referenced resource's display attribute
    pub fn display(document: &Value, field: DisplayField) -> Self {
        match document.get(field.as_str()) {
            Some(Value::String(s)) => Lookup::Found(s.clone()),
            _ => Lookup::Missing,
        }
    }

    /// True when the lookup produced a non-empty value
    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Found(s) if !s.is_empty())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Lookup::Found(s) => s,
            Lookup::Missing => "",
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Lookup::Found(s) => s,
            Lookup::Missing => String::new(),
        }
    }
}

impl From<Option<String>> for Lookup {
    fn from(value: Option<String>) -> Self {
        value.map_or(Lookup::Missing, Lookup::Found)
    }
}

/// One fully denormalized person, ready to be written as a `swapi_people` row
///
/// Every attribute except `id` is a plain string. Failed lookups are empty
/// strings and list-valued references are joined with [`LIST_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    pub id: i32,
    pub birth_year: String,
    pub eye_color: String,
    pub gender: String,
    pub hair_color: String,
    pub height: String,
    pub homeworld: String,
    pub mass: String,
    pub name: String,
    pub skin_color: String,
    pub films: String,
    pub species: String,
    pub starships: String,
    pub vehicles: String,
}

impl FlatRecord {
    /// The 13 string attributes paired with their column names, in table order
    pub fn text_columns(&self) -> [(&'static str, &str); 13] {
        [
            ("birth_year", self.birth_year.as_str()),
            ("eye_color", self.eye_color.as_str()),
            ("gender", self.gender.as_str()),
            ("hair_color", self.hair_color.as_str()),
            ("height", self.height.as_str()),
            ("homeworld", self.homeworld.as_str()),
            ("mass", self.mass.as_str()),
            ("name", self.name.as_str()),
            ("skin_color", self.skin_color.as_str()),
            ("films", self.films.as_str()),
            ("species", self.species.as_str()),
            ("starships", self.starships.as_str()),
            ("vehicles", self.vehicles.as_str()),
        ]
    }
}
