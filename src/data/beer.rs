use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::parse::{parse_id, parse_number, StockStatus};
use crate::data::record::{BeerRecord, BeerTable};
use crate::data::yomi::SortKey;

/// Columns matched by the free-text keyword search.
const SEARCH_COLUMNS: &[&str] = &[
    "id",
    "name_local",
    "name_jp",
    "brewery_local",
    "brewery_jp",
    "style_main_jp",
    "style_sub_jp",
    "comment",
    "detailed_comment",
    "untappd_url",
    "jan",
];

/// A source row plus every derived column. Derived values are a pure function of `record`.
#[derive(Debug, Clone, Serialize)]
pub struct Beer {
    pub record: BeerRecord,
    pub id: Option<i64>,
    pub abv: Option<f64>,
    pub volume_ml: Option<f64>,
    pub price_yen: Option<f64>,
    pub stock: StockStatus,
    #[serde(skip)]
    pub name_key: Option<SortKey>,
    #[serde(skip)]
    pub brewery_key: Option<SortKey>,
    #[serde(skip)]
    pub style_key: Option<SortKey>,
    #[serde(skip)]
    pub search_text: String,
}

impl Beer {
    pub fn from_record(record: BeerRecord) -> Self {
        let search_text = SEARCH_COLUMNS
            .iter()
            .filter_map(|c| record.get(c))
            .collect::<Vec<_>>()
            .join("\n")
            .to_lowercase();
        Self {
            id: parse_id(&record.id),
            abv: parse_number(&record.abv),
            volume_ml: parse_number(&record.volume),
            price_yen: parse_number(&record.price),
            stock: StockStatus::classify(&record.in_stock),
            name_key: SortKey::from_reading(&record.yomi),
            brewery_key: SortKey::from_reading(&record.brewery_jp),
            style_key: SortKey::from_reading(&record.style_main_jp),
            search_text,
            record,
        }
    }

    /// Price 0 means "ask the shop".
    pub fn is_ask_price(&self) -> bool {
        self.price_yen == Some(0.0)
    }
}

/// In-memory, rebuildable view of one source.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub beers: Vec<Beer>,
}

impl Catalog {
    pub fn from_table(source: impl Into<String>, table: &BeerTable) -> Self {
        Self {
            source: source.into(),
            loaded_at: Utc::now(),
            beers: table
                .records
                .iter()
                .filter(|r| !r.is_blank())
                .cloned()
                .map(Beer::from_record)
                .collect(),
        }
    }

    pub fn find(&self, id: i64) -> Option<&Beer> {
        self.beers.iter().find(|b| b.id == Some(id))
    }

    /// In-stock beers of one brewery, in source order. Shown in the brewery detail panel.
    pub fn brewery_lineup(&self, brewery_jp: &str) -> Vec<&Beer> {
        self.beers
            .iter()
            .filter(|b| b.record.brewery_jp == brewery_jp && b.stock == StockStatus::InStock)
            .collect()
    }

    /// Next identifier for an appended row: max existing + 1, or 1 when there is none.
    /// `None` when the max id is already `i64::MAX`.
    pub fn next_id(&self) -> Option<i64> {
        next_id(self.beers.iter().map(|b| b.id))
    }
}

pub fn next_id(ids: impl Iterator<Item = Option<i64>>) -> Option<i64> {
    ids.flatten().max().map_or(Some(1), |max| max.checked_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, brewery: &str, stock: &str) -> BeerRecord {
        BeerRecord {
            id: id.to_string(),
            brewery_jp: brewery.to_string(),
            in_stock: stock.to_string(),
            name_local: "Saison Dupont".to_string(),
            price: "¥1,200".to_string(),
            ..BeerRecord::default()
        }
    }

    #[test]
    fn derived_fields_come_from_the_record() {
        let beer = Beer::from_record(record("3", "デュポン", "○"));
        assert_eq!(beer.id, Some(3));
        assert_eq!(beer.price_yen, Some(1200.0));
        assert_eq!(beer.abv, None);
        assert_eq!(beer.stock, StockStatus::InStock);
        assert!(beer.search_text.contains("saison dupont"));
        assert!(beer.name_key.is_none());
        assert!(beer.brewery_key.is_some());
    }

    #[test]
    fn blank_rows_are_dropped_and_next_id_follows_max() {
        let table = BeerTable::new(vec![
            record("3", "デュポン", "○"),
            BeerRecord::default(),
            record("x", "デュポン", "△"),
            record("10", "カンティヨン", "○"),
        ]);
        let catalog = Catalog::from_table("memory", &table);
        assert_eq!(catalog.beers.len(), 3);
        assert_eq!(catalog.next_id(), Some(11));
        assert_eq!(catalog.brewery_lineup("デュポン").len(), 1);
        assert_eq!(next_id(std::iter::empty()), Some(1));
    }

    #[test]
    fn next_id_after_max_is_none() {
        assert_eq!(next_id([Some(i64::MAX), Some(3)].into_iter()), None);
        assert_eq!(next_id([Some(i64::MAX - 1)].into_iter()), Some(i64::MAX));
    }
}
