use std::collections::BTreeSet;

use beerlist::catalog::filter::{filter_beers, FilterState, RangeFilter, SizeFilter};
use beerlist::catalog::session::{reduce_with_seed, Action, Paging, SessionState};
use beerlist::catalog::sort::{sort_beers, SortMode};
use beerlist::catalog::view::{render, ViewConfig};
use beerlist::data::beer::{Beer, Catalog};
use beerlist::data::parse::{display_number, parse_number, StockStatus};
use beerlist::data::record::{BeerRecord, BeerTable};

fn row(id: &str, country: &str, abv: &str, price: &str, stock: &str) -> BeerRecord {
    BeerRecord {
        id: id.to_string(),
        name_local: format!("Beer {id}"),
        brewery_jp: format!("醸造所{id}"),
        country: country.to_string(),
        abv: abv.to_string(),
        price: price.to_string(),
        in_stock: stock.to_string(),
        ..BeerRecord::default()
    }
}

fn two_row_catalog() -> Catalog {
    Catalog::from_table(
        "memory:example",
        &BeerTable::new(vec![
            row("1", "Japan", "5.0", "600", "○"),
            row("2", "Belgium", "8.5", "0", "△"),
        ]),
    )
}

fn ids(rows: &[&Beer]) -> Vec<i64> {
    rows.iter().filter_map(|b| b.id).collect()
}

#[test]
fn two_row_example_country_filter_and_price_sort() {
    let catalog = two_row_catalog();
    let none = BTreeSet::new();

    let japan = FilterState {
        country: Some("Japan".to_string()),
        ..FilterState::default()
    };
    assert_eq!(ids(&filter_beers(&catalog.beers, &japan, &none)), vec![1]);

    let mut all: Vec<&Beer> = catalog.beers.iter().collect();
    sort_beers(&mut all, SortMode::PriceAsc, 0);
    assert_eq!(ids(&all), vec![1, 2]);

    let mut session = SessionState::default();
    session.filters.sort = SortMode::PriceAsc;
    session.filters.show_back_order = true;
    let view = render(&catalog, &session, &ViewConfig::default());
    let rendered: Vec<i64> = view.rows.iter().map(|c| c.id).collect();
    assert_eq!(rendered, vec![1, 2]);
    assert_eq!(view.rows[1].spec_line, "ABV 8.5% | ASK");
}

#[test]
fn stock_classification_is_total() {
    assert_eq!(StockStatus::classify(""), StockStatus::Unavailable);
    assert_eq!(StockStatus::classify("○"), StockStatus::InStock);
    assert_eq!(StockStatus::classify("△"), StockStatus::BackOrder);
    assert_eq!(StockStatus::classify("banana"), StockStatus::Unavailable);
}

#[test]
fn numeric_parse_is_idempotent_over_display() {
    for text in ["5.5%", "1,200円", "¥600", "abc", "", "330ml", "0", "12.", "007"] {
        let once = parse_number(text);
        assert_eq!(parse_number(&display_number(once)), once, "input {text:?}");
    }
    assert_eq!(parse_number("no digits"), None);
}

#[test]
fn filter_result_is_the_conjunction_of_predicates() {
    let mut records = Vec::new();
    let countries = ["Japan", "Belgium", ""];
    let abvs = ["4", "7.5", "", "12"];
    let prices = ["500", "0", "", "2500"];
    let volumes = ["330ml", "500", "750ml", ""];
    let stocks = ["○", "△", "×"];
    let mut id = 0;
    for c in countries {
        for a in abvs {
            for p in prices {
                for v in volumes {
                    for s in stocks {
                        id += 1;
                        let mut r = row(&id.to_string(), c, a, p, s);
                        r.volume = v.to_string();
                        records.push(r);
                    }
                }
            }
        }
    }
    let catalog = Catalog::from_table("memory:grid", &BeerTable::new(records));
    let filters = FilterState {
        size: SizeFilter::Small,
        abv: RangeFilter::between(0.0, 10.0),
        price: RangeFilter {
            min: None,
            max: Some(1000.0),
        },
        country: Some("Japan".to_string()),
        show_back_order: true,
        ..FilterState::default()
    };
    let got: BTreeSet<i64> = ids(&filter_beers(&catalog.beers, &filters, &BTreeSet::new()))
        .into_iter()
        .collect();

    let expected: BTreeSet<i64> = catalog
        .beers
        .iter()
        .filter(|b| {
            let stock_ok = b.stock == StockStatus::InStock || b.stock == StockStatus::BackOrder;
            let size_ok = b.volume_ml.is_some_and(|v| v <= 500.0);
            let abv_ok = b.abv.is_some_and(|a| a <= 10.0);
            let price_ok = b.price_yen.is_some_and(|p| p <= 1000.0);
            let country_ok = b.record.country == "Japan";
            stock_ok && size_ok && abv_ok && price_ok && country_ok
        })
        .filter_map(|b| b.id)
        .collect();

    assert!(!expected.is_empty());
    assert_eq!(got, expected);
}

#[test]
fn ask_and_missing_values_sort_last() {
    let catalog = Catalog::from_table(
        "memory:sort",
        &BeerTable::new(vec![
            row("1", "", "", "0", "○"),
            row("2", "", "6", "300", "○"),
            row("3", "", "", "", "○"),
            row("4", "", "3", "0", "○"),
            row("5", "", "9", "1500", "○"),
        ]),
    );
    let mut rows: Vec<&Beer> = catalog.beers.iter().collect();
    sort_beers(&mut rows, SortMode::PriceAsc, 0);
    assert_eq!(ids(&rows), vec![2, 5, 1, 4, 3]);

    let mut rows: Vec<&Beer> = catalog.beers.iter().collect();
    sort_beers(&mut rows, SortMode::AbvDesc, 0);
    assert_eq!(ids(&rows), vec![5, 2, 4, 1, 3]);
}

#[test]
fn pagination_grows_only_on_show_more_and_resets_on_filter_change() {
    let records: Vec<BeerRecord> = (1..=35)
        .map(|i| row(&i.to_string(), "Japan", "5", "500", "○"))
        .collect();
    let catalog = Catalog::from_table("memory:pages", &BeerTable::new(records));
    let paging = Paging::default();
    let mut seed = || 1_u64;
    let step = |s: SessionState, a: Action, seed: &mut dyn FnMut() -> u64| {
        reduce_with_seed(s, &a, &paging, seed)
    };

    let mut session = SessionState::default();
    session.filters.sort = SortMode::PriceAsc;
    let view = render(&catalog, &session, &ViewConfig::default());
    assert_eq!((view.shown, view.total, view.has_more), (10, 35, true));

    session = step(session, Action::ToggleComment { id: 3 }, &mut seed);
    session = step(session, Action::Remove { id: 4 }, &mut seed);
    assert_eq!(session.display_limit, 10);

    session = step(session, Action::ShowMore, &mut seed);
    session = step(session, Action::ShowMore, &mut seed);
    session = step(session, Action::ShowMore, &mut seed);
    let view = render(&catalog, &session, &ViewConfig::default());
    assert_eq!((view.shown, view.total, view.has_more), (34, 34, false));

    let mut narrowed = session.filters.clone();
    narrowed.search_text = "beer 1".to_string();
    session = step(session, Action::SetFilters { filters: narrowed }, &mut seed);
    assert_eq!(session.display_limit, 10);
    assert!(session.removed_ids.contains(&4), "removal survives filter changes");
}
