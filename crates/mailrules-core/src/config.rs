//! Run configuration.

use std::path::PathBuf;

use crate::{Error, Result};

/// Environment variable names and their defaults.
pub mod env {
    /// Database URL.
    pub const DATABASE_URL: &str = "MAILRULES_DATABASE_URL";
    /// Rule file path.
    pub const RULES_PATH: &str = "MAILRULES_RULES_PATH";
    /// Destination label for `move_message`.
    pub const LABEL: &str = "MAILRULES_LABEL";
    /// OAuth client secrets file.
    pub const CREDENTIALS_PATH: &str = "MAILRULES_CREDENTIALS_PATH";
    /// Stored token file.
    pub const TOKEN_PATH: &str = "MAILRULES_TOKEN_PATH";
    /// Whether to fetch new mail before applying rules.
    pub const FETCH: &str = "MAILRULES_FETCH";
    /// How many recent messages to fetch.
    pub const MAX_RESULTS: &str = "MAILRULES_MAX_RESULTS";
}

/// Everything a run needs, passed explicitly to each routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `SQLite` URL of the email store.
    pub database_url: String,
    /// Path of the JSON rule file.
    pub rules_path: PathBuf,
    /// Name of the label `move_message` adds.
    pub label_name: String,
    /// Path of Google's client secrets file.
    pub credentials_path: PathBuf,
    /// Path of the stored OAuth token.
    pub token_path: PathBuf,
    /// Fetch recent mail before applying rules.
    pub fetch_before_apply: bool,
    /// Number of recent messages to list when fetching.
    pub max_results: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:mailrules.db?mode=rwc".to_string(),
            rules_path: PathBuf::from("rules.json"),
            label_name: "Jobs".to_string(),
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            fetch_before_apply: false,
            max_results: 100,
        }
    }
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup, falling back to defaults.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let fetch_before_apply = match get(env::FETCH) {
            Some(v) => parse_bool(env::FETCH, &v)?,
            None => defaults.fetch_before_apply,
        };

        let max_results = match get(env::MAX_RESULTS) {
            Some(v) => v.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a positive integer, got {v:?}", env::MAX_RESULTS))
            })?,
            None => defaults.max_results,
        };
        if max_results == 0 {
            return Err(Error::Config(format!("{} must be at least 1", env::MAX_RESULTS)));
        }

        Ok(Self {
            database_url: get(env::DATABASE_URL).unwrap_or(defaults.database_url),
            rules_path: get(env::RULES_PATH).map_or(defaults.rules_path, PathBuf::from),
            label_name: get(env::LABEL).unwrap_or(defaults.label_name),
            credentials_path: get(env::CREDENTIALS_PATH)
                .map_or(defaults.credentials_path, PathBuf::from),
            token_path: get(env::TOKEN_PATH).map_or(defaults.token_path, PathBuf::from),
            fetch_before_apply,
            max_results,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!(
            "{key} must be a boolean, got {value:?}"
        ))),
    }
}
