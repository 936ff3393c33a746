use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::catalog::rng::Rng;
use crate::data::beer::Beer;
use crate::data::yomi::cmp_nulls_last;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Reading (yomi) in dictionary order.
    #[default]
    Name,
    AbvAsc,
    AbvDesc,
    /// Cheapest first; "ask" (0) after every real price, missing prices last.
    PriceAsc,
    Brewery,
    Style,
    Random,
}

impl SortMode {
    /// Flat modes list rows in sort order instead of grouping them by brewery.
    pub fn is_flat(&self) -> bool {
        matches!(
            self,
            Self::AbvAsc | Self::AbvDesc | Self::PriceAsc | Self::Random
        )
    }
}

fn cmp_optional_f64(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rank for price order: real prices by value, then ask, then missing.
fn price_rank(beer: &Beer) -> (u8, f64) {
    match beer.price_yen {
        Some(p) if p > 0.0 => (0, p),
        Some(_) => (1, 0.0),
        None => (2, 0.0),
    }
}

/// Reorder rows in place. Every mode but `Random` is stable; `Random` needs the session's
/// seed and is a pure function of it.
pub fn sort_beers(rows: &mut [&Beer], mode: SortMode, seed: u64) {
    match mode {
        SortMode::Name => {
            rows.sort_by(|a, b| cmp_nulls_last(a.name_key.as_ref(), b.name_key.as_ref()))
        }
        SortMode::AbvAsc => rows.sort_by(|a, b| cmp_optional_f64(a.abv, b.abv, false)),
        SortMode::AbvDesc => rows.sort_by(|a, b| cmp_optional_f64(a.abv, b.abv, true)),
        SortMode::PriceAsc => rows.sort_by(|a, b| {
            let (ra, pa) = price_rank(a);
            let (rb, pb) = price_rank(b);
            ra.cmp(&rb).then_with(|| pa.total_cmp(&pb))
        }),
        SortMode::Brewery => rows.sort_by(|a, b| {
            cmp_nulls_last(a.brewery_key.as_ref(), b.brewery_key.as_ref())
        }),
        SortMode::Style => {
            rows.sort_by(|a, b| cmp_nulls_last(a.style_key.as_ref(), b.style_key.as_ref()))
        }
        SortMode::Random => Rng::new(seed).shuffle(rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::BeerRecord;

    fn beer(id: &str, yomi: &str, abv: &str, price: &str) -> Beer {
        Beer::from_record(BeerRecord {
            id: id.to_string(),
            yomi: yomi.to_string(),
            abv: abv.to_string(),
            price: price.to_string(),
            ..BeerRecord::default()
        })
    }

    fn order(beers: &[Beer], mode: SortMode, seed: u64) -> Vec<i64> {
        let mut rows: Vec<&Beer> = beers.iter().collect();
        sort_beers(&mut rows, mode, seed);
        rows.iter().filter_map(|b| b.id).collect()
    }

    #[test]
    fn ask_prices_sort_after_real_prices() {
        let beers = vec![
            beer("1", "", "", "0"),
            beer("2", "", "", "1200"),
            beer("3", "", "", ""),
            beer("4", "", "", "600"),
        ];
        assert_eq!(order(&beers, SortMode::PriceAsc, 0), vec![4, 2, 1, 3]);
    }

    #[test]
    fn missing_abv_sorts_last_both_ways() {
        let beers = vec![
            beer("1", "", "", ""),
            beer("2", "", "8.5", ""),
            beer("3", "", "5", ""),
        ];
        assert_eq!(order(&beers, SortMode::AbvAsc, 0), vec![3, 2, 1]);
        assert_eq!(order(&beers, SortMode::AbvDesc, 0), vec![2, 3, 1]);
    }

    #[test]
    fn name_order_uses_readings_with_blanks_last() {
        let beers = vec![
            beer("1", "", "", ""),
            beer("2", "ヒューガルデン", "", ""),
            beer("3", "あさひ", "", ""),
            beer("4", "ギネス", "", ""),
        ];
        assert_eq!(order(&beers, SortMode::Name, 0), vec![3, 4, 2, 1]);
    }

    #[test]
    fn random_order_depends_only_on_seed() {
        let beers: Vec<Beer> = (1..=20).map(|i| beer(&i.to_string(), "", "", "")).collect();
        let a = order(&beers, SortMode::Random, 11);
        let b = order(&beers, SortMode::Random, 11);
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
    }
}
