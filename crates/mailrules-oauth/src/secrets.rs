//! Client secrets as downloaded from the Google Cloud console.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// OAuth client identity read from `credentials.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    /// Client ID.
    pub client_id: String,
    /// Client secret (absent for public clients).
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Token endpoint advertised in the file.
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// The console wraps the secrets in an `installed` or `web` object.
#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parses the JSON contents of a client secrets file.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has no client section.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(json)?;
        file.installed.or(file.web).ok_or_else(|| {
            Error::InvalidSecrets("expected an \"installed\" or \"web\" section".into())
        })
    }

    /// Reads and parses a client secrets file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&raw)
    }
}
