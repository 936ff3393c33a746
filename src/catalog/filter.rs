use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::sort::SortMode;
use crate::data::beer::Beer;
use crate::data::parse::StockStatus;
use crate::data::yomi::{cmp_nulls_last, SortKey};

/// Volume boundary between small and large bottles, in ml. Both buckets include it.
pub const SIZE_BOUNDARY_ML: f64 = 500.0;

/// Slider bounds. A side set at (or past) its bound does not filter.
pub const ABV_BOUNDS: (f64, f64) = (0.0, 20.0);
pub const PRICE_BOUNDS: (f64, f64) = (0.0, 20000.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeFilter {
    #[default]
    All,
    Small,
    Large,
}

/// Inclusive range. A side left as `None` is open; with both open the range is inactive.
/// An active range never matches a missing value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Drop sides that sit on the slider bounds, so a full-width range becomes inactive.
    pub fn within(self, bounds: (f64, f64)) -> Self {
        Self {
            min: self.min.filter(|m| *m > bounds.0),
            max: self.max.filter(|m| *m < bounds.1),
        }
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn accepts(&self, value: Option<f64>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(v) = value else {
            return false;
        };
        self.min.map_or(true, |min| v >= min) && self.max.map_or(true, |max| v <= max)
    }
}

/// Everything a visitor can set that narrows or orders the list. Serializable so the
/// client can hold it between interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub search_text: String,
    pub sort: SortMode,
    pub size: SizeFilter,
    pub abv: RangeFilter,
    pub price: RangeFilter,
    /// Source (English) country name; `None` shows every country.
    pub country: Option<String>,
    /// Selected `style_main_jp` values; empty selects all.
    pub styles: BTreeSet<String>,
    pub show_back_order: bool,
    pub show_unavailable: bool,
}

impl FilterState {
    pub fn keyword(&self) -> Option<String> {
        let kw = self.search_text.trim();
        (!kw.is_empty()).then(|| kw.to_lowercase())
    }
}

/// Stock visibility: in-stock always, the other two only when their flag is set.
pub fn stock_visible(stock: StockStatus, filters: &FilterState) -> bool {
    match stock {
        StockStatus::InStock => true,
        StockStatus::BackOrder => filters.show_back_order,
        StockStatus::Unavailable => filters.show_unavailable,
    }
}

fn size_matches(size: SizeFilter, volume_ml: Option<f64>) -> bool {
    match size {
        SizeFilter::All => true,
        SizeFilter::Small => volume_ml.is_some_and(|v| v <= SIZE_BOUNDARY_ML),
        SizeFilter::Large => volume_ml.is_some_and(|v| v >= SIZE_BOUNDARY_ML),
    }
}

/// Every predicate except the style selection.
pub fn matches_base(
    beer: &Beer,
    filters: &FilterState,
    keyword: Option<&str>,
    removed_ids: &BTreeSet<i64>,
) -> bool {
    stock_visible(beer.stock, filters)
        && keyword.map_or(true, |kw| beer.search_text.contains(kw))
        && size_matches(filters.size, beer.volume_ml)
        && filters.abv.within(ABV_BOUNDS).accepts(beer.abv)
        && filters.price.within(PRICE_BOUNDS).accepts(beer.price_yen)
        && filters
            .country
            .as_deref()
            .map_or(true, |c| beer.record.country == c)
        && beer.id.map_or(true, |id| !removed_ids.contains(&id))
}

pub fn matches_style(beer: &Beer, filters: &FilterState) -> bool {
    filters.styles.is_empty() || filters.styles.contains(&beer.record.style_main_jp)
}

/// Rows passing every predicate except style selection, in source order.
pub fn filter_base<'a>(
    beers: &'a [Beer],
    filters: &FilterState,
    removed_ids: &BTreeSet<i64>,
) -> Vec<&'a Beer> {
    let keyword = filters.keyword();
    beers
        .iter()
        .filter(|b| matches_base(b, filters, keyword.as_deref(), removed_ids))
        .collect()
}

/// Rows passing every predicate, in source order.
pub fn filter_beers<'a>(
    beers: &'a [Beer],
    filters: &FilterState,
    removed_ids: &BTreeSet<i64>,
) -> Vec<&'a Beer> {
    filter_base(beers, filters, removed_ids)
        .into_iter()
        .filter(|b| matches_style(b, filters))
        .collect()
}

/// Countries with at least one beer visible under the stock flags, sorted by name.
pub fn available_countries(beers: &[Beer], filters: &FilterState) -> Vec<String> {
    let set: BTreeSet<&str> = beers
        .iter()
        .filter(|b| stock_visible(b.stock, filters))
        .map(|b| b.record.country.as_str())
        .filter(|c| !c.trim().is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// Distinct main styles of the given rows, in kana dictionary order.
pub fn available_styles(rows: &[&Beer]) -> Vec<String> {
    let mut styles: Vec<(&str, Option<&SortKey>)> = Vec::new();
    for beer in rows {
        let style = beer.record.style_main_jp.as_str();
        if style.trim().is_empty() || styles.iter().any(|(s, _)| *s == style) {
            continue;
        }
        styles.push((style, beer.style_key.as_ref()));
    }
    styles.sort_by(|a, b| cmp_nulls_last(a.1, b.1).then_with(|| a.0.cmp(b.0)));
    styles.into_iter().map(|(s, _)| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::BeerRecord;

    fn beer(id: &str, country: &str, abv: &str, volume: &str, price: &str, stock: &str) -> Beer {
        Beer::from_record(BeerRecord {
            id: id.to_string(),
            country: country.to_string(),
            abv: abv.to_string(),
            volume: volume.to_string(),
            price: price.to_string(),
            in_stock: stock.to_string(),
            name_local: format!("Beer {id}"),
            ..BeerRecord::default()
        })
    }

    fn ids(rows: &[&Beer]) -> Vec<i64> {
        rows.iter().filter_map(|b| b.id).collect()
    }

    #[test]
    fn stock_flags_are_disjunctive() {
        let beers = vec![
            beer("1", "Japan", "5", "330ml", "600", "○"),
            beer("2", "Japan", "5", "330ml", "600", "△"),
            beer("3", "Japan", "5", "330ml", "600", "×"),
        ];
        let none = BTreeSet::new();
        let mut f = FilterState::default();
        assert_eq!(ids(&filter_beers(&beers, &f, &none)), vec![1]);
        f.show_unavailable = true;
        assert_eq!(ids(&filter_beers(&beers, &f, &none)), vec![1, 3]);
        f.show_back_order = true;
        assert_eq!(ids(&filter_beers(&beers, &f, &none)), vec![1, 2, 3]);
    }

    #[test]
    fn size_buckets_share_the_boundary() {
        let beers = vec![
            beer("1", "", "", "330ml", "", "○"),
            beer("2", "", "", "500ml", "", "○"),
            beer("3", "", "", "750ml", "", "○"),
            beer("4", "", "", "", "", "○"),
        ];
        let none = BTreeSet::new();
        let small = FilterState {
            size: SizeFilter::Small,
            ..FilterState::default()
        };
        let large = FilterState {
            size: SizeFilter::Large,
            ..FilterState::default()
        };
        assert_eq!(ids(&filter_beers(&beers, &small, &none)), vec![1, 2]);
        assert_eq!(ids(&filter_beers(&beers, &large, &none)), vec![2, 3]);
        assert_eq!(ids(&filter_beers(&beers, &FilterState::default(), &none)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn active_ranges_reject_missing_values() {
        let beers = vec![
            beer("1", "", "4.5", "", "0", "○"),
            beer("2", "", "", "", "", "○"),
            beer("3", "", "11", "", "3000", "○"),
        ];
        let none = BTreeSet::new();
        let f = FilterState {
            abv: RangeFilter::between(0.0, 10.0),
            ..FilterState::default()
        };
        assert_eq!(ids(&filter_beers(&beers, &f, &none)), vec![1]);
        let f = FilterState {
            price: RangeFilter {
                min: None,
                max: Some(1000.0),
            },
            ..FilterState::default()
        };
        assert_eq!(ids(&filter_beers(&beers, &f, &none)), vec![1], "ask price 0 is a value");
        let f = FilterState {
            abv: RangeFilter::between(0.0, 20.0),
            price: RangeFilter::between(0.0, 20000.0),
            ..FilterState::default()
        };
        assert_eq!(ids(&filter_beers(&beers, &f, &none)), vec![1, 2, 3], "full bounds do not filter");
    }

    #[test]
    fn keyword_is_case_insensitive_and_removed_ids_are_hidden() {
        let beers = vec![
            beer("1", "Belgium", "", "", "", "○"),
            beer("2", "Belgium", "", "", "", "○"),
        ];
        let f = FilterState {
            search_text: "  BEER 2 ".to_string(),
            ..FilterState::default()
        };
        assert_eq!(ids(&filter_beers(&beers, &f, &BTreeSet::new())), vec![2]);
        let removed: BTreeSet<i64> = [2].into_iter().collect();
        assert!(filter_beers(&beers, &f, &removed).is_empty());
    }

    #[test]
    fn style_selection_is_applied_after_base() {
        let styled = |id: &str, style: &str| {
            Beer::from_record(BeerRecord {
                style_main_jp: style.to_string(),
                ..beer(id, "", "", "", "", "○").record
            })
        };
        let a = styled("1", "セゾン");
        let b = styled("2", "エール");
        let beers = vec![a, b];
        let f = FilterState {
            styles: ["セゾン".to_string()].into_iter().collect(),
            ..FilterState::default()
        };
        let none = BTreeSet::new();
        assert_eq!(ids(&filter_beers(&beers, &f, &none)), vec![1]);
        let base = filter_base(&beers, &f, &none);
        assert_eq!(available_styles(&base), vec!["エール", "セゾン"]);
    }

    #[test]
    fn countries_follow_stock_flags_only() {
        let beers = vec![
            beer("1", "Japan", "", "", "", "○"),
            beer("2", "Belgium", "", "", "", "×"),
            beer("3", "", "", "", "", "○"),
        ];
        let mut f = FilterState {
            country: Some("Japan".to_string()),
            ..FilterState::default()
        };
        assert_eq!(available_countries(&beers, &f), vec!["Japan"]);
        f.show_unavailable = true;
        assert_eq!(available_countries(&beers, &f), vec!["Belgium", "Japan"]);
    }
}
