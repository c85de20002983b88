//! Mail provider interface.
//!
//! The engine only needs five operations from the provider: list and
//! create labels, list message ids, fetch a message, and change a
//! message's label set. [`GmailClient`] implements them against the Gmail
//! REST API.

mod gmail;

use serde::{Deserialize, Serialize};

pub use gmail::GmailClient;

/// System label marking a message as unread.
pub const UNREAD_LABEL: &str = "UNREAD";

/// Errors returned by provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A message is missing data needed to store it.
    #[error("Malformed message {id}: {reason}")]
    Malformed {
        /// Message id.
        id: String,
        /// What was wrong.
        reason: String,
    },
}

/// A provider-side label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label id used in mutations.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Reference to a message returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageRef {
    /// Message id.
    pub id: String,
}

/// A full message as returned by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Message id.
    pub id: String,
    /// Labels currently on the message.
    #[serde(default)]
    pub label_ids: Vec<String>,
    /// Receipt time in milliseconds since the epoch, as a decimal string.
    pub internal_date: Option<String>,
    /// MIME tree.
    #[serde(default)]
    pub payload: Payload,
}

/// A node of the message's MIME tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// Content type of this part.
    pub mime_type: Option<String>,
    /// Headers of this part.
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Inline body of this part.
    pub body: Option<Body>,
    /// Child parts.
    #[serde(default)]
    pub parts: Vec<Payload>,
}

/// A message header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Body of a MIME part.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Body {
    /// URL-safe base64 encoded content.
    pub data: Option<String>,
}

/// A change to a message's label set.
///
/// Adding a label already present, or removing one that is absent, leaves
/// the message unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    /// Labels to add.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_label_ids: Vec<String>,
    /// Labels to remove.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_label_ids: Vec<String>,
}

impl Mutation {
    /// Add a single label.
    #[must_use]
    pub fn add(label_id: impl Into<String>) -> Self {
        Self {
            add_label_ids: vec![label_id.into()],
            remove_label_ids: Vec::new(),
        }
    }

    /// Remove a single label.
    #[must_use]
    pub fn remove(label_id: impl Into<String>) -> Self {
        Self {
            add_label_ids: Vec::new(),
            remove_label_ids: vec![label_id.into()],
        }
    }
}

/// Operations the engine consumes from a mail provider.
///
/// Calls are made one at a time; implementations need not be `Sync`.
#[allow(async_fn_in_trait)]
pub trait MailProvider {
    /// List all label definitions.
    async fn list_labels(&self) -> Result<Vec<Label>, ProviderError>;

    /// Create a label with the given name.
    async fn create_label(&self, name: &str) -> Result<Label, ProviderError>;

    /// List up to `max_results` of the most recent message ids.
    async fn list_message_ids(&self, max_results: u32) -> Result<Vec<MessageRef>, ProviderError>;

    /// Fetch a full message.
    async fn get_message(&self, id: &str) -> Result<RawMessage, ProviderError>;

    /// Apply a label mutation to a message.
    async fn modify_labels(&self, id: &str, mutation: &Mutation) -> Result<(), ProviderError>;
}
