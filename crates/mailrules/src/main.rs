//! `mailrules` - apply JSON mail rules to a Gmail mailbox.
//!
//! Takes no arguments. Configuration comes from `MAILRULES_*` environment
//! variables; logging is controlled with `RUST_LOG`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use anyhow::Context;
use mailrules_core::{Config, service};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailrules=info,mailrules_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(rules = %config.rules_path.display(), label = %config.label_name, "Starting mailrules");

    if config.fetch_before_apply {
        service::fetch_emails(&config)
            .await
            .context("failed to fetch emails")?;
    }

    let report = service::apply_rules(&config)
        .await
        .context("failed to apply rules")?;

    if report.failed > 0 {
        info!(failed = report.failed, "some actions failed; see warnings above");
    }

    Ok(())
}
