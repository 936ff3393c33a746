//! What a client needs to draw one page of the catalog: cards (flat or grouped by
//! brewery), facet choices, and the session to send back with the next action.

use serde::{Deserialize, Serialize};

use crate::catalog::filter::{available_countries, available_styles, filter_base, matches_style};
use crate::catalog::session::{Paging, SessionState};
use crate::catalog::sort::sort_beers;
use crate::data::beer::{Beer, Catalog};
use crate::data::country::CountryDirectory;
use crate::data::parse::StockStatus;

pub const DEFAULT_BEER_IMAGE: &str =
    "https://assets.untappd.com/site/assets/images/temp/badge-beer-default.png";
pub const DEFAULT_BREWERY_IMAGE: &str =
    "https://assets.untappd.com/site/assets/images/temp/badge-brewery-default.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub paging: Paging,
    pub countries: CountryDirectory,
    pub default_beer_image: String,
    pub default_brewery_image: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            paging: Paging::default(),
            countries: CountryDirectory::default(),
            default_beer_image: DEFAULT_BEER_IMAGE.to_string(),
            default_brewery_image: DEFAULT_BREWERY_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LineupItem {
    pub id: Option<i64>,
    pub name_local: String,
    pub name_jp: String,
    pub spec_line: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreweryPanel {
    pub brewery_jp: String,
    pub description: String,
    /// In-stock beers of the brewery; empty renders as "nothing to show".
    pub lineup: Vec<LineupItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BeerCard {
    pub id: i64,
    pub name_local: String,
    pub name_jp: String,
    pub brewery_local: String,
    pub brewery_jp: String,
    pub city: String,
    pub country: String,
    pub country_local: String,
    pub flag_url: Option<String>,
    pub style_line: String,
    pub spec_line: String,
    pub stock: StockStatus,
    pub stock_symbol: &'static str,
    pub comment: String,
    pub has_detailed_comment: bool,
    /// Present only while the comment panel is open.
    pub detailed_comment: Option<String>,
    pub comment_open: bool,
    pub beer_image_url: String,
    pub brewery_image_url: String,
    pub untappd_url: Option<String>,
    pub brewery_panel: Option<BreweryPanel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreweryGroup {
    pub brewery_jp: String,
    pub brewery_local: String,
    pub beers: Vec<BeerCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryOption {
    pub name: String,
    pub local_name: String,
    pub flag_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub source: String,
    pub loaded_at: String,
    /// Rows after every filter, before pagination.
    pub total: usize,
    /// Cards actually rendered (grouped modes may exceed `display_limit`).
    pub shown: usize,
    pub display_limit: usize,
    pub has_more: bool,
    pub grouped: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<BreweryGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<BeerCard>,
    pub countries: Vec<CountryOption>,
    pub styles: Vec<String>,
    pub session: SessionState,
}

fn format_abv(abv: f64) -> String {
    if abv.fract() == 0.0 {
        format!("{abv:.1}")
    } else {
        format!("{abv}")
    }
}

/// `ABV 5.0% | 330ml | 2019 | ¥600`, skipping missing parts; price 0 shows as `ASK`.
pub fn spec_line(beer: &Beer) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(abv) = beer.abv {
        parts.push(format!("ABV {}%", format_abv(abv)));
    }
    if let Some(volume) = beer.volume_ml {
        parts.push(format!("{}ml", volume.trunc() as i64));
    }
    let vintage = beer.record.vintage.trim();
    if !vintage.is_empty() {
        parts.push(vintage.to_string());
    }
    if let Some(price) = beer.price_yen {
        if beer.is_ask_price() {
            parts.push("ASK".to_string());
        } else {
            parts.push(format!("¥{}", price.trunc() as i64));
        }
    }
    parts.join(" | ")
}

fn style_line(beer: &Beer) -> String {
    [
        beer.record.style_main_jp.trim(),
        beer.record.style_sub_jp.trim(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" / ")
}

fn or_default(url: &str, fallback: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        fallback.to_string()
    } else {
        url.to_string()
    }
}

/// Lineup names keep only the part after the first `/` ("Brewery / Beer" → "Beer").
fn short_name(name: &str) -> String {
    name.split_once('/')
        .map_or(name, |(_, rest)| rest)
        .trim()
        .to_string()
}

fn brewery_panel(catalog: &Catalog, beer: &Beer, config: &ViewConfig) -> BreweryPanel {
    let lineup = catalog
        .brewery_lineup(&beer.record.brewery_jp)
        .into_iter()
        .map(|b| LineupItem {
            id: b.id,
            name_local: short_name(&b.record.name_local),
            name_jp: short_name(&b.record.name_jp),
            spec_line: spec_line(b),
            image_url: or_default(&b.record.beer_image_url, &config.default_beer_image),
        })
        .collect();
    BreweryPanel {
        brewery_jp: beer.record.brewery_jp.clone(),
        description: beer.record.brewery_description.clone(),
        lineup,
    }
}

/// Card for one beer. `None` when the row has no usable id.
pub fn beer_card(
    catalog: &Catalog,
    beer: &Beer,
    session: &SessionState,
    config: &ViewConfig,
) -> Option<BeerCard> {
    let id = beer.id?;
    let disclosure = session.disclosure(id);
    let record = &beer.record;
    let detailed = record.detailed_comment.trim();
    let untappd = record.untappd_url.trim();
    Some(BeerCard {
        id,
        name_local: record.name_local.clone(),
        name_jp: record.name_jp.clone(),
        brewery_local: record.brewery_local.clone(),
        brewery_jp: record.brewery_jp.clone(),
        city: record.city.clone(),
        country: record.country.clone(),
        country_local: config.countries.local_name(&record.country).to_string(),
        flag_url: config.countries.flag_url(&record.country).map(str::to_string),
        style_line: style_line(beer),
        spec_line: spec_line(beer),
        stock: beer.stock,
        stock_symbol: beer.stock.symbol(),
        comment: record.comment.clone(),
        has_detailed_comment: !detailed.is_empty(),
        detailed_comment: (disclosure.comment_open && !detailed.is_empty())
            .then(|| detailed.to_string()),
        comment_open: disclosure.comment_open,
        beer_image_url: or_default(&record.beer_image_url, &config.default_beer_image),
        brewery_image_url: or_default(&record.brewery_image_url, &config.default_brewery_image),
        untappd_url: (!untappd.is_empty()).then(|| untappd.to_string()),
        brewery_panel: disclosure
            .brewery_open
            .then(|| brewery_panel(catalog, beer, config)),
    })
}

/// Filtered and sorted rows with usable ids, before pagination.
pub fn visible_rows<'a>(catalog: &'a Catalog, session: &SessionState) -> Vec<&'a Beer> {
    let filters = &session.filters;
    let mut rows: Vec<&Beer> = filter_base(&catalog.beers, filters, &session.removed_ids)
        .into_iter()
        .filter(|b| matches_style(b, filters) && b.id.is_some())
        .collect();
    sort_beers(&mut rows, filters.sort, session.random_seed.unwrap_or_default());
    rows
}

pub fn render(catalog: &Catalog, session: &SessionState, config: &ViewConfig) -> CatalogView {
    let filters = &session.filters;
    let base = filter_base(&catalog.beers, filters, &session.removed_ids);
    let styles = available_styles(&base);
    let rows = visible_rows(catalog, session);
    let total = rows.len();
    let limit = session.display_limit;
    let grouped = !filters.sort.is_flat();

    let mut flat = Vec::new();
    let mut groups: Vec<BreweryGroup> = Vec::new();
    if grouped {
        for beer in rows.iter().take(limit) {
            if groups.iter().any(|g| g.brewery_jp == beer.record.brewery_jp) {
                continue;
            }
            groups.push(BreweryGroup {
                brewery_jp: beer.record.brewery_jp.clone(),
                brewery_local: beer.record.brewery_local.clone(),
                beers: Vec::new(),
            });
        }
        for beer in &rows {
            let Some(group) = groups
                .iter_mut()
                .find(|g| g.brewery_jp == beer.record.brewery_jp)
            else {
                continue;
            };
            if let Some(card) = beer_card(catalog, beer, session, config) {
                group.beers.push(card);
            }
        }
    } else {
        flat = rows
            .iter()
            .take(limit)
            .filter_map(|b| beer_card(catalog, b, session, config))
            .collect();
    }

    let shown = if grouped {
        groups.iter().map(|g| g.beers.len()).sum()
    } else {
        flat.len()
    };

    let countries = available_countries(&catalog.beers, filters)
        .into_iter()
        .map(|name| CountryOption {
            local_name: config.countries.local_name(&name).to_string(),
            flag_url: config.countries.flag_url(&name).map(str::to_string),
            name,
        })
        .collect();

    CatalogView {
        source: catalog.source.clone(),
        loaded_at: catalog.loaded_at.to_rfc3339(),
        total,
        shown,
        display_limit: limit,
        has_more: shown < total,
        grouped,
        groups,
        rows: flat,
        countries,
        styles,
        session: session.clone(),
    }
}
