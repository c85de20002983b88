//! Fetching messages from the provider into the local store.

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::DateTime;
use tracing::{debug, info, warn};

use crate::Result;
use crate::provider::{MailProvider, Payload, ProviderError, RawMessage, UNREAD_LABEL};
use crate::store::{Email, EmailRepository};

/// URL-safe base64 that accepts bodies with or without padding.
const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Counters for one fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Message ids returned by the listing.
    pub listed: usize,
    /// Newly stored emails.
    pub inserted: usize,
    /// Emails that were already stored.
    pub existing: usize,
    /// Messages that could not be fetched or decoded.
    pub failed: usize,
}

/// Fetch up to `max_results` recent messages and store the ones not yet seen.
///
/// A message that fails to fetch or decode is logged and skipped.
///
/// # Errors
///
/// Returns an error if listing messages or writing to the store fails.
pub async fn fetch_into<P: MailProvider>(
    provider: &P,
    repo: &EmailRepository,
    max_results: u32,
) -> Result<SyncReport> {
    let refs = provider.list_message_ids(max_results).await?;
    let mut report = SyncReport {
        listed: refs.len(),
        ..SyncReport::default()
    };

    for message_ref in refs {
        let email = match fetch_email(provider, &message_ref.id).await {
            Ok(email) => email,
            Err(e) => {
                report.failed += 1;
                warn!(email_id = %message_ref.id, error = %e, "failed to fetch message");
                continue;
            }
        };

        if repo.insert_if_absent(&email).await? {
            report.inserted += 1;
            debug!(email_id = %email.id, subject = %email.subject, "stored email");
        } else {
            report.existing += 1;
        }
    }

    info!(
        listed = report.listed,
        inserted = report.inserted,
        existing = report.existing,
        failed = report.failed,
        "fetch complete"
    );
    Ok(report)
}

async fn fetch_email<P: MailProvider>(provider: &P, id: &str) -> std::result::Result<Email, ProviderError> {
    let message = provider.get_message(id).await?;
    to_email(&message)
}

/// Convert a provider message to a storable email.
///
/// # Errors
///
/// Returns an error if the receipt time is missing or not a millisecond timestamp.
pub fn to_email(message: &RawMessage) -> std::result::Result<Email, ProviderError> {
    let malformed = |reason: &str| ProviderError::Malformed {
        id: message.id.clone(),
        reason: reason.to_string(),
    };

    let millis: i64 = message
        .internal_date
        .as_deref()
        .ok_or_else(|| malformed("missing internalDate"))?
        .parse()
        .map_err(|_| malformed("internalDate is not a number"))?;
    let received = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| malformed("internalDate out of range"))?;

    Ok(Email {
        id: message.id.clone(),
        sender: header(&message.payload, "From").unwrap_or_default().to_string(),
        subject: header(&message.payload, "Subject").unwrap_or_default().to_string(),
        message: body_text(&message.id, &message.payload),
        received,
        read: !message.label_ids.iter().any(|l| l == UNREAD_LABEL),
    })
}

/// Value of the named header; the last occurrence wins.
fn header<'a>(payload: &'a Payload, name: &str) -> Option<&'a str> {
    payload
        .headers
        .iter()
        .rev()
        .find(|h| h.name == name)
        .map(|h| h.value.as_str())
}

/// Decoded body: the top-level body if present, else the first `text/plain`
/// part found depth-first, else empty.
fn body_text(id: &str, payload: &Payload) -> String {
    let data = payload
        .body
        .as_ref()
        .and_then(|b| b.data.as_deref())
        .or_else(|| first_plain_part(payload));

    let Some(data) = data else {
        return String::new();
    };

    match BODY_ENGINE.decode(data) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|e| {
            warn!(email_id = id, "body is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }),
        Err(e) => {
            warn!(email_id = id, error = %e, "body is not valid base64");
            String::new()
        }
    }
}

fn first_plain_part(payload: &Payload) -> Option<&str> {
    payload.parts.iter().find_map(|part| {
        let is_plain = part
            .mime_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("text/plain"));

        part.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|_| is_plain)
            .or_else(|| first_plain_part(part))
    })
}
