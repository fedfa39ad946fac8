use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// NewType pattern for type safety
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifiers persisted between runs. Ordered so the state file is stable.
pub type SeenSet = BTreeSet<ItemId>;

/// One entry of the page's embedded impressions array.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    /// `None` when the source value was missing or not numeric.
    pub price: Option<f64>,
}

/// A record that passed a listing's filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub category: String,
}

pub fn candidate_ids(candidates: &[Candidate]) -> SeenSet {
    candidates.iter().map(|c| c.id.clone()).collect()
}
