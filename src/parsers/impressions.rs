use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ExtractionStrategy;
use crate::error::{Result, WatchError};
use crate::models::{ItemId, ItemRecord};
use crate::parsers::{clean_text, coerce_price};

static IMPRESSIONS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""impressions"\s*:\s*(\[[^\]]+\])"#).expect("Invalid impressions regex")
});

/// Pulls item records out of a listing page.
pub trait ItemExtractor: Send + Sync {
    fn extract(&self, page: &str) -> Result<Vec<ItemRecord>>;
}

pub fn extractor_for(strategy: ExtractionStrategy) -> Box<dyn ItemExtractor> {
    match strategy {
        ExtractionStrategy::Page => Box::new(PageExtractor),
        ExtractionStrategy::Script => Box::new(ScriptExtractor),
    }
}

/// Matches the impressions array anywhere in the page text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageExtractor;

impl ItemExtractor for PageExtractor {
    fn extract(&self, page: &str) -> Result<Vec<ItemRecord>> {
        let json = find_impressions(page)
            .ok_or_else(|| WatchError::Parse("impressions block not found in page".to_string()))?;
        parse_impressions(json)
    }
}

/// Matches the impressions array only inside `<script>` elements, first hit wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptExtractor;

impl ItemExtractor for ScriptExtractor {
    fn extract(&self, page: &str) -> Result<Vec<ItemRecord>> {
        let document = Html::parse_document(page);
        let script_selector = Selector::parse("script")
            .map_err(|_| WatchError::Parse("Failed to parse script selector".to_string()))?;

        for script in document.select(&script_selector) {
            let body = script.text().collect::<String>();
            if let Some(json) = find_impressions(&body) {
                return parse_impressions(json);
            }
        }

        Err(WatchError::Parse("impressions block not found in any script element".to_string()))
    }
}

fn find_impressions(text: &str) -> Option<&str> {
    IMPRESSIONS_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse the captured `[...]` array into records.
pub fn parse_impressions(json: &str) -> Result<Vec<ItemRecord>> {
    let entries: Vec<Map<String, Value>> = serde_json::from_str(json)
        .map_err(|e| WatchError::Parse(format!("impressions block is not a JSON array of objects: {}", e)))?;
    if entries.is_empty() {
        return Err(WatchError::Parse("impressions block is empty".to_string()));
    }

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = match entry.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            other => {
                warn!("Skipping impression without usable id: {:?}", other);
                continue;
            }
        };

        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .map(clean_text)
            .unwrap_or_default();

        records.push(ItemRecord {
            id: ItemId(id),
            name,
            price: coerce_price(entry.get("price")),
        });
    }

    debug!("Parsed {} impression records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><head>
<script>
window.dataLayer = window.dataLayer || [];
dataLayer.push({"ecommerce": {"currencyCode": "USD", "impressions": [
  {"name": "Domane SL 6 Gen 4 - 58cm", "id": "5255432-58", "price": "2199.99", "brand": "Trek"},
  {"name": "Fuel EX 8 Gen 6 - Large", "id": 5301122, "price": 1850},
  {"name": "Checkpoint ALR 5 - 56cm", "id": "5260001", "price": "N/A"}
]}});
</script></head><body><h1>Pre-owned road bikes</h1></body></html>"#;

    #[test]
    fn page_extractor_parses_records() {
        let records = PageExtractor.extract(PAGE).unwrap();
        assert_eq!(
            records,
            vec![
                ItemRecord {
                    id: ItemId::new("5255432-58"),
                    name: "Domane SL 6 Gen 4 - 58cm".to_string(),
                    price: Some(2199.99),
                },
                ItemRecord {
                    id: ItemId::new("5301122"),
                    name: "Fuel EX 8 Gen 6 - Large".to_string(),
                    price: Some(1850.0),
                },
                ItemRecord {
                    id: ItemId::new("5260001"),
                    name: "Checkpoint ALR 5 - 56cm".to_string(),
                    price: None,
                },
            ]
        );
    }

    #[test]
    fn script_extractor_agrees_with_page_extractor() {
        assert_eq!(ScriptExtractor.extract(PAGE).unwrap(), PageExtractor.extract(PAGE).unwrap());
    }

    #[test]
    fn script_extractor_ignores_visible_text() {
        let page = r#"<html><body><pre>"impressions": [{"id": "x", "name": "58cm", "price": 1}]</pre>
<script>var nothing = 1;</script></body></html>"#;
        assert!(PageExtractor.extract(page).is_ok());
        assert!(matches!(ScriptExtractor.extract(page), Err(WatchError::Parse(_))));
    }

    #[test]
    fn missing_block_is_a_parse_error() {
        let err = PageExtractor.extract("<html><body>Maintenance</body></html>").unwrap_err();
        assert!(matches!(err, WatchError::Parse(_)));
    }

    #[test]
    fn malformed_block_is_a_parse_error() {
        let page = r#"<script>{"impressions": [{"id": "1", "name": "Large",}]}</script>"#;
        assert!(matches!(PageExtractor.extract(page), Err(WatchError::Parse(_))));
    }

    #[test]
    fn empty_block_is_a_parse_error() {
        let page = r#"<script>{"impressions": []}</script>"#;
        assert!(matches!(PageExtractor.extract(page), Err(WatchError::Parse(_))));
        assert!(matches!(ScriptExtractor.extract(page), Err(WatchError::Parse(_))));

        let spaced = r#"<script>{"impressions": [ ]}</script>"#;
        assert!(matches!(PageExtractor.extract(spaced), Err(WatchError::Parse(_))));
    }

    #[test]
    fn records_without_id_are_skipped() {
        let records = parse_impressions(r#"[{"name": "Large", "price": 10}, {"id": "7", "price": 5}]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, ItemId::new("7"));
        assert_eq!(records[0].name, "");
    }
}
