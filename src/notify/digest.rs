use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::models::{Candidate, ItemId, SeenSet};
use crate::parsers::format_usd;

/// The plain-text email for one run's new items.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub subject: String,
    pub body: String,
    pub items: Vec<Candidate>,
}

impl Digest {
    /// `None` when nothing is new.
    pub fn build(
        candidates: &[Candidate],
        new_ids: &SeenSet,
        sources: &[String],
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if new_ids.is_empty() {
            return None;
        }

        // Same id listed under two categories is reported once
        let mut listed: HashSet<&ItemId> = HashSet::new();
        let items: Vec<Candidate> = candidates
            .iter()
            .filter(|c| new_ids.contains(&c.id) && listed.insert(&c.id))
            .cloned()
            .collect();

        let subject = format!("[Trek Watch] {} new bike(s)", new_ids.len());

        let mut lines = vec![format!("New Trek listings – {} UTC", now.format("%Y-%m-%d %H:%M"))];
        lines.extend(items.iter().map(bullet));
        lines.push(String::new());
        lines.push("Sources:".to_string());
        lines.extend(sources.iter().map(|url| format!("- {}", url)));

        Some(Self {
            subject,
            body: lines.join("\n"),
            items,
        })
    }
}

fn bullet(item: &Candidate) -> String {
    format!(
        "• {} — {} ({}, SKU {})",
        item.name,
        format_usd(item.price),
        item.category,
        item.id
    )
}
