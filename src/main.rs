//! Trek Watch: one pass over the configured Trek pre-owned listings, emailing
//! any newly listed bikes. Run it from cron or a systemd timer.
//!
//! `SMTP_USER`, `SMTP_PASS`, `MAIL_FROM` and `MAIL_TO` must be set on every
//! run, including runs that end up with nothing to send. A relative
//! `state_path` (default `trek_seen.json`) lives next to the executable.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use trek_watch::config::{Config, MailSettings};
use trek_watch::monitor::run_once;
use trek_watch::notify::EmailNotifier;
use trek_watch::scrapers::build_scrapers;
use trek_watch::storage::JsonFileStore;
use trek_watch::utils;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trek_watch=info".parse()?),
        )
        .init();

    info!("Starting Trek Watch");

    // Load configuration and mail credentials before touching the network
    let config = Config::load().context("Failed to load configuration")?;
    let mail = MailSettings::from_env().context("Failed to load mail settings")?;

    let client = utils::http::create_client(&config)?;
    let scrapers = build_scrapers(&config)?;
    let store = JsonFileStore::new(config.resolved_state_path()?);
    let notifier = EmailNotifier::new(&config, &mail)?;

    let report = run_once(&config, &client, &scrapers, &store, &notifier, Utc::now())
        .await
        .context("Trek Watch run failed")?;

    if report.notified {
        info!("Run complete: emailed {} new bike(s)", report.new_ids.len());
    } else {
        info!("Run complete: nothing new among {} candidates", report.candidates.len());
    }

    Ok(())
}
