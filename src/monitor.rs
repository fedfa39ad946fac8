use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::diff::new_ids;
use crate::error::Result;
use crate::models::{candidate_ids, Candidate, SeenSet};
use crate::notify::{Digest, Notifier};
use crate::scrapers::ListingScraper;
use crate::storage::SeenStore;

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub candidates: Vec<Candidate>,
    pub new_ids: SeenSet,
    pub notified: bool,
}

/// One pass: scrape every listing in order, diff against the stored ids,
/// email anything new, then replace the stored ids with this run's set.
///
/// A fetch or parse failure returns before the store is touched. A delivery
/// failure still saves state when `persist_on_delivery_failure` is set, and
/// the delivery error is returned either way.
pub async fn run_once(
    config: &Config,
    client: &Client,
    scrapers: &[Box<dyn ListingScraper>],
    store: &dyn SeenStore,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<RunReport> {
    let previous = store.load().await?;
    info!("Loaded {} previously seen ids", previous.len());

    let mut candidates = Vec::new();
    for scraper in scrapers {
        candidates.extend(scraper.scrape(client).await?);
    }

    let current = candidate_ids(&candidates);
    let fresh = new_ids(&current, &previous);
    info!("{} candidates, {} new", current.len(), fresh.len());

    let sources: Vec<String> = scrapers.iter().map(|s| s.listing().url.clone()).collect();
    let delivery = match Digest::build(&candidates, &fresh, &sources, now) {
        Some(digest) => notifier.send(&digest).await.map(|_| true),
        None => {
            info!("No new bikes, skipping notification");
            Ok(false)
        }
    };

    let notified = match delivery {
        Ok(notified) => notified,
        Err(e) => {
            if config.persist_on_delivery_failure {
                warn!("Notification failed, saving state anyway: {}", e);
                store.save(&current).await?;
            } else {
                error!("Notification failed, keeping previous state: {}", e);
            }
            return Err(e);
        }
    };

    store.save(&current).await?;

    Ok(RunReport {
        candidates,
        new_ids: fresh,
        notified,
    })
}
