use async_trait::async_trait;
use reqwest::Client;

use crate::config::{Config, ListingConfig};
use crate::error::Result;
use crate::models::Candidate;
use crate::parsers::extractor_for;

mod trek;

pub use trek::TrekScraper;

#[async_trait]
pub trait ListingScraper: Send + Sync {
    async fn scrape(&self, client: &Client) -> Result<Vec<Candidate>>;
    fn listing(&self) -> &ListingConfig;
}

/// One scraper per configured listing, in configuration order.
pub fn build_scrapers(config: &Config) -> Result<Vec<Box<dyn ListingScraper>>> {
    config
        .listings
        .iter()
        .map(|listing| -> Result<Box<dyn ListingScraper>> {
            let scraper = TrekScraper::new(listing.clone(), extractor_for(config.extraction))?;
            Ok(Box::new(scraper))
        })
        .collect()
}
