//! Top-level routines.
//!
//! Each routine opens the email store itself and closes it before
//! returning, on success and on error.

use mailrules_oauth::{ClientSecrets, OAuthClient, Provider, Token, TokenStore};
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::{RuleEngine, RunReport};
use crate::fetch::{SyncReport, fetch_into};
use crate::provider::{GmailClient, MailProvider};
use crate::rules::RuleSet;
use crate::store::{Email, EmailRepository};
use crate::{Error, Result};

/// Load the stored token, refreshing and re-saving it if it has expired.
///
/// # Errors
///
/// Returns an error if no token is stored, or the refresh fails.
pub async fn authorize(config: &Config) -> Result<Token> {
    let store = TokenStore::new(&config.token_path);
    let token = store.load()?.ok_or(mailrules_oauth::Error::NoToken)?;
    if token.is_valid() {
        return Ok(token);
    }

    let secrets = ClientSecrets::load(&config.credentials_path)?;
    let mut provider = Provider::google()?;
    if let Some(token_uri) = &secrets.token_uri {
        provider = provider.with_token_url(token_uri)?;
    }

    let refreshed = OAuthClient::from_secrets(&secrets, provider)
        .refresh_token(&token)
        .await?;
    store.save(&refreshed)?;
    info!(path = %config.token_path.display(), "refreshed access token");
    Ok(refreshed)
}

/// Build an authenticated Gmail client.
///
/// # Errors
///
/// Returns an error if authorization fails.
pub async fn connect_gmail(config: &Config) -> Result<GmailClient> {
    let token = authorize(config).await?;
    GmailClient::new(token.access_token).map_err(|e| Error::Config(e.to_string()))
}

/// Fetch recent Gmail messages into the store.
///
/// # Errors
///
/// Returns an error if authorization, listing, or storage fails.
pub async fn fetch_emails(config: &Config) -> Result<SyncReport> {
    let client = connect_gmail(config).await?;
    fetch_emails_with(&client, config).await
}

/// Fetch recent messages from `provider` into the store.
///
/// # Errors
///
/// Returns an error if listing or storage fails.
pub async fn fetch_emails_with<P: MailProvider>(provider: &P, config: &Config) -> Result<SyncReport> {
    let repo = EmailRepository::connect(&config.database_url).await?;
    let result = fetch_into(provider, &repo, config.max_results).await;
    repo.close().await;
    result
}

/// Apply the rule file to every stored email through Gmail.
///
/// # Errors
///
/// Returns an error if the rule file, the store, authorization, or label
/// resolution fails. Individual action failures are only logged.
pub async fn apply_rules(config: &Config) -> Result<RunReport> {
    let (rules, emails) = load_inputs(config).await?;
    let client = connect_gmail(config).await?;
    run_engine(&client, config, &rules, &emails).await
}

/// Apply the rule file to every stored email through `provider`.
///
/// # Errors
///
/// Returns an error if the rule file, the store, or label resolution fails.
pub async fn apply_rules_with<P: MailProvider>(provider: &P, config: &Config) -> Result<RunReport> {
    let (rules, emails) = load_inputs(config).await?;
    run_engine(provider, config, &rules, &emails).await
}

async fn load_inputs(config: &Config) -> Result<(RuleSet, Vec<Email>)> {
    let rules = RuleSet::load(&config.rules_path)?;
    for diagnostic in rules.diagnostics() {
        warn!("{diagnostic}");
    }

    let repo = EmailRepository::connect(&config.database_url).await?;
    let emails = repo.all().await;
    repo.close().await;

    Ok((rules, emails?))
}

async fn run_engine<P: MailProvider>(
    provider: &P,
    config: &Config,
    rules: &RuleSet,
    emails: &[Email],
) -> Result<RunReport> {
    let report = RuleEngine::new(provider, &config.label_name)
        .run(rules, emails)
        .await?;

    info!(
        rules = report.rules,
        emails = report.emails,
        matched = report.matched,
        applied = report.applied,
        failed = report.failed,
        skipped = report.skipped,
        "rule run complete"
    );
    Ok(report)
}
