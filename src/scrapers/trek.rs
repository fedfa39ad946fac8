use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::config::ListingConfig;
use crate::error::Result;
use crate::models::Candidate;
use crate::parsers::{ItemExtractor, ListingFilter};
use crate::scrapers::ListingScraper;
use crate::utils::http::fetch_page;

pub struct TrekScraper {
    listing: ListingConfig,
    filter: ListingFilter,
    extractor: Box<dyn ItemExtractor>,
}

impl TrekScraper {
    pub fn new(listing: ListingConfig, extractor: Box<dyn ItemExtractor>) -> Result<Self> {
        let filter = ListingFilter::from_listing(&listing)?;
        Ok(Self {
            listing,
            filter,
            extractor,
        })
    }
}

#[async_trait]
impl ListingScraper for TrekScraper {
    async fn scrape(&self, client: &Client) -> Result<Vec<Candidate>> {
        info!("Scraping {} listing...", self.listing.name);

        let html = fetch_page(client, &self.listing.url).await?;
        let records = self.extractor.extract(&html)?;
        let total = records.len();
        let candidates = self.filter.apply(records);

        info!(
            "{}: {} items on page, {} match size/price filters",
            self.listing.name,
            total,
            candidates.len()
        );

        Ok(candidates)
    }

    fn listing(&self) -> &ListingConfig {
        &self.listing
    }
}
