//! Gmail REST API client.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{Label, MailProvider, MessageRef, Mutation, ProviderError, RawMessage};

/// Base URL of the Gmail API, ending in a slash so relative paths join onto it.
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/";

/// Response bodies in errors are cut to this many characters.
const MAX_ERROR_BODY: usize = 200;

/// Authenticated client for the signed-in user's mailbox (`users/me`).
#[derive(Debug, Clone)]
pub struct GmailClient {
    http: Client,
    base_url: Url,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct LabelList {
    #[serde(default)]
    labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

impl GmailClient {
    /// Create a client using a bearer access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the default base URL fails to parse.
    pub fn new(access_token: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self::with_base_url(
            access_token,
            Url::parse(GMAIL_API_BASE)?,
        ))
    }

    /// Create a client talking to a different API root.
    #[must_use]
    pub fn with_base_url(access_token: impl Into<String>, base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            access_token: access_token.into(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Malformed {
                id: path.to_string(),
                reason: e.to_string(),
            })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request
            .bearer_auth(&self.access_token)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl MailProvider for GmailClient {
    async fn list_labels(&self) -> Result<Vec<Label>, ProviderError> {
        let url = self.endpoint("users/me/labels")?;
        let list: LabelList = self.send(self.http.get(url)).await?;
        debug!(count = list.labels.len(), "listed labels");
        Ok(list.labels)
    }

    async fn create_label(&self, name: &str) -> Result<Label, ProviderError> {
        let url = self.endpoint("users/me/labels")?;
        let body = serde_json::json!({ "name": name });
        self.send(self.http.post(url).json(&body)).await
    }

    async fn list_message_ids(&self, max_results: u32) -> Result<Vec<MessageRef>, ProviderError> {
        let mut url = self.endpoint("users/me/messages")?;
        url.query_pairs_mut()
            .append_pair("maxResults", &max_results.to_string());

        let list: MessageList = self.send(self.http.get(url)).await?;
        Ok(list.messages)
    }

    async fn get_message(&self, id: &str) -> Result<RawMessage, ProviderError> {
        let mut url = self.endpoint(&format!("users/me/messages/{id}"))?;
        url.query_pairs_mut().append_pair("format", "full");
        self.send(self.http.get(url)).await
    }

    async fn modify_labels(&self, id: &str, mutation: &Mutation) -> Result<(), ProviderError> {
        let url = self.endpoint(&format!("users/me/messages/{id}/modify"))?;
        let _: serde_json::Value = self.send(self.http.post(url).json(mutation)).await?;
        Ok(())
    }
}
