//! Typed access to process environment variables
//!
//! Blank values are treated the same as unset ones, so a `.env` file with
//! `DB_HOST=` falls back to the default instead of producing an empty host.

use crate::error::{Result, SwapiError};
use std::fmt::Display;
use std::str::FromStr;

/// Read an optional variable, ignoring blank values
pub fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a variable that must be present
pub fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| SwapiError::MissingVar(name.to_string()))
}

/// Parse a variable, falling back to `default` when it is unset
///
/// A present but unparsable value is an error rather than a silent default.
pub fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match optional(name) {
        Some(raw) => raw.parse().map_err(|err: T::Err| SwapiError::InvalidVar {
            name: name.to_string(),
            value: raw.clone(),
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}
