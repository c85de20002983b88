//! Stored email model.

use chrono::{DateTime, Utc};

/// An email as persisted locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Provider message id.
    pub id: String,
    /// Raw `From` header.
    pub sender: String,
    /// Raw `Subject` header.
    pub subject: String,
    /// Decoded body text.
    pub message: String,
    /// When the provider received the message.
    pub received: DateTime<Utc>,
    /// Whether the message was read at fetch time.
    pub read: bool,
}
