use regex::{Regex, RegexBuilder};

use crate::config::ListingConfig;
use crate::error::{Result, WatchError};
use crate::models::{Candidate, ItemRecord};

/// Size, exclusion and price predicates for one listing.
#[derive(Debug, Clone)]
pub struct ListingFilter {
    include: Regex,
    exclude: Regex,
    price_cap: f64,
    category: String,
}

impl ListingFilter {
    pub fn from_listing(listing: &ListingConfig) -> Result<Self> {
        Ok(Self {
            include: compile(&listing.include_pattern, &listing.name)?,
            exclude: compile(&listing.exclude_pattern, &listing.name)?,
            price_cap: listing.price_cap,
            category: listing.name.clone(),
        })
    }

    pub fn size_matches(&self, name: &str) -> bool {
        self.include.is_match(name)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.is_match(name)
    }

    /// Absent prices never pass.
    pub fn under_cap(&self, price: Option<f64>) -> bool {
        matches!(price, Some(p) if p < self.price_cap)
    }

    pub fn accepts(&self, record: &ItemRecord) -> bool {
        self.size_matches(&record.name) && !self.is_excluded(&record.name) && self.under_cap(record.price)
    }

    pub fn apply(&self, records: Vec<ItemRecord>) -> Vec<Candidate> {
        records
            .into_iter()
            .filter(|r| self.accepts(r))
            .filter_map(|r| {
                let price = r.price?;
                Some(Candidate {
                    id: r.id,
                    name: r.name,
                    price,
                    category: self.category.clone(),
                })
            })
            .collect()
    }
}

fn compile(pattern: &str, listing: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| WatchError::Config(format!("listing {} has invalid pattern {:?}: {}", listing, pattern, e)))
}
