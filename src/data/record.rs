//! Raw spreadsheet row. One `BeerRecord` per data line; every known column is kept as text
//! exactly as the source had it, unknown columns ride along in `extra` so a write-back
//! never drops them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Known source columns, in header order.
pub const COLUMNS: &[&str] = &[
    "id",
    "name_jp",
    "name_local",
    "yomi",
    "brewery_local",
    "brewery_jp",
    "country",
    "city",
    "brewery_description",
    "brewery_image_url",
    "style_main",
    "style_main_jp",
    "style_sub",
    "style_sub_jp",
    "abv",
    "volume",
    "vintage",
    "price",
    "comment",
    "detailed_comment",
    "in_stock",
    "untappd_url",
    "jan",
    "beer_image_url",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeerRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name_jp: String,
    #[serde(default)]
    pub name_local: String,
    #[serde(default)]
    pub yomi: String,
    #[serde(default)]
    pub brewery_local: String,
    #[serde(default)]
    pub brewery_jp: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub brewery_description: String,
    #[serde(default)]
    pub brewery_image_url: String,
    #[serde(default)]
    pub style_main: String,
    #[serde(default)]
    pub style_main_jp: String,
    #[serde(default)]
    pub style_sub: String,
    #[serde(default)]
    pub style_sub_jp: String,
    #[serde(default)]
    pub abv: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub vintage: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub detailed_comment: String,
    #[serde(default)]
    pub in_stock: String,
    #[serde(default)]
    pub untappd_url: String,
    #[serde(default)]
    pub jan: String,
    #[serde(default)]
    pub beer_image_url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl BeerRecord {
    /// Value of a column by header name; `None` only for unknown columns not present in `extra`.
    pub fn get(&self, column: &str) -> Option<&str> {
        let value = match column {
            "id" => &self.id,
            "name_jp" => &self.name_jp,
            "name_local" => &self.name_local,
            "yomi" => &self.yomi,
            "brewery_local" => &self.brewery_local,
            "brewery_jp" => &self.brewery_jp,
            "country" => &self.country,
            "city" => &self.city,
            "brewery_description" => &self.brewery_description,
            "brewery_image_url" => &self.brewery_image_url,
            "style_main" => &self.style_main,
            "style_main_jp" => &self.style_main_jp,
            "style_sub" => &self.style_sub,
            "style_sub_jp" => &self.style_sub_jp,
            "abv" => &self.abv,
            "volume" => &self.volume,
            "vintage" => &self.vintage,
            "price" => &self.price,
            "comment" => &self.comment,
            "detailed_comment" => &self.detailed_comment,
            "in_stock" => &self.in_stock,
            "untappd_url" => &self.untappd_url,
            "jan" => &self.jan,
            "beer_image_url" => &self.beer_image_url,
            other => return self.extra.get(other).map(String::as_str),
        };
        Some(value.as_str())
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        let slot = match column {
            "id" => &mut self.id,
            "name_jp" => &mut self.name_jp,
            "name_local" => &mut self.name_local,
            "yomi" => &mut self.yomi,
            "brewery_local" => &mut self.brewery_local,
            "brewery_jp" => &mut self.brewery_jp,
            "country" => &mut self.country,
            "city" => &mut self.city,
            "brewery_description" => &mut self.brewery_description,
            "brewery_image_url" => &mut self.brewery_image_url,
            "style_main" => &mut self.style_main,
            "style_main_jp" => &mut self.style_main_jp,
            "style_sub" => &mut self.style_sub,
            "style_sub_jp" => &mut self.style_sub_jp,
            "abv" => &mut self.abv,
            "volume" => &mut self.volume,
            "vintage" => &mut self.vintage,
            "price" => &mut self.price,
            "comment" => &mut self.comment,
            "detailed_comment" => &mut self.detailed_comment,
            "in_stock" => &mut self.in_stock,
            "untappd_url" => &mut self.untappd_url,
            "jan" => &mut self.jan,
            "beer_image_url" => &mut self.beer_image_url,
            other => {
                self.extra.insert(other.to_string(), value);
                return;
            }
        };
        *slot = value;
    }

    /// Build a record from a header row and one line of cells. Cells past the header and
    /// blank header names are ignored; surrounding whitespace is trimmed.
    pub fn from_cells<S: AsRef<str>>(headers: &[String], cells: &[S]) -> Self {
        let mut record = Self::default();
        for (header, cell) in headers.iter().zip(cells) {
            let header = header.trim();
            if header.is_empty() {
                continue;
            }
            record.set(header, cell.as_ref().trim());
        }
        record
    }

    pub fn to_cells(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|h| self.get(h).unwrap_or("").to_string())
            .collect()
    }

    pub fn is_blank(&self) -> bool {
        COLUMNS.iter().all(|c| self.get(c).map_or(true, str::is_empty))
            && self.extra.values().all(String::is_empty)
    }
}

/// Whole source table: header order as read plus every data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeerTable {
    pub headers: Vec<String>,
    pub records: Vec<BeerRecord>,
}

impl BeerTable {
    pub fn new(records: Vec<BeerRecord>) -> Self {
        Self {
            headers: COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
        }
    }

    /// Header row used for write-back: every known column first, then the extra columns
    /// seen on read (in read order), then extras only present on records.
    pub fn output_headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        for h in &self.headers {
            let h = h.trim();
            if !h.is_empty() && !headers.iter().any(|known| known == h) {
                headers.push(h.to_string());
            }
        }
        for record in &self.records {
            for key in record.extra.keys() {
                if !headers.iter().any(|known| known == key) {
                    headers.push(key.clone());
                }
            }
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_default_to_empty_and_extras_survive() {
        let headers = vec!["id".to_string(), "name_jp".to_string(), "shelf".to_string()];
        let record = BeerRecord::from_cells(&headers, &[" 7 ", "セゾン", "B2"]);
        assert_eq!(record.id, "7");
        assert_eq!(record.name_jp, "セゾン");
        assert_eq!(record.price, "");
        assert_eq!(record.extra.get("shelf").map(String::as_str), Some("B2"));

        let table = BeerTable {
            headers: headers.clone(),
            records: vec![record.clone()],
        };
        let out = table.output_headers();
        assert_eq!(out.len(), COLUMNS.len() + 1);
        assert_eq!(out.last().map(String::as_str), Some("shelf"));
        assert_eq!(record.to_cells(&out).last().map(String::as_str), Some("B2"));
    }

    #[test]
    fn blank_rows_are_detected() {
        assert!(BeerRecord::default().is_blank());
        let mut r = BeerRecord::default();
        r.set("comment", "x");
        assert!(!r.is_blank());
    }
}
