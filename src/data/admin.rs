//! Admin writes: edit stock/price/comments of one beer, or append a new one. Each write is
//! load -> modify -> save of the whole table, then a cache invalidation. A failed save
//! leaves the cache (and any catalog a caller holds) untouched.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::data::beer::{next_id, Beer};
use crate::data::cache::CatalogCache;
use crate::data::parse::{display_number, parse_id, StockStatus};
use crate::data::record::BeerRecord;
use crate::data::source::{BeerSource, SourceError};

/// Serializes load-modify-save within this process. Writers in other processes still race
/// (last write wins at the source).
static WRITE_MTX: Mutex<()> = Mutex::new(());

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("beer {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("no id left after {0}")]
    IdExhausted(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeerUpdate {
    pub id: i64,
    pub stock: StockStatus,
    /// `Some(0.0)` is "ask"; `None` clears the cell.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub detailed_comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBeer {
    pub name_jp: String,
    pub name_local: String,
    pub yomi: String,
    pub brewery_local: String,
    pub brewery_jp: String,
    pub country: String,
    pub city: String,
    pub brewery_description: String,
    pub brewery_image_url: String,
    pub style_main: String,
    pub style_main_jp: String,
    pub style_sub: String,
    pub style_sub_jp: String,
    pub abv: String,
    pub volume: String,
    pub vintage: String,
    pub price: String,
    pub comment: String,
    pub detailed_comment: String,
    pub stock: Option<StockStatus>,
    pub untappd_url: String,
    pub jan: String,
    pub beer_image_url: String,
}

impl NewBeer {
    fn into_record(self, id: i64) -> BeerRecord {
        BeerRecord {
            id: id.to_string(),
            name_jp: self.name_jp,
            name_local: self.name_local,
            yomi: self.yomi,
            brewery_local: self.brewery_local,
            brewery_jp: self.brewery_jp,
            country: self.country,
            city: self.city,
            brewery_description: self.brewery_description,
            brewery_image_url: self.brewery_image_url,
            style_main: self.style_main,
            style_main_jp: self.style_main_jp,
            style_sub: self.style_sub,
            style_sub_jp: self.style_sub_jp,
            abv: self.abv,
            volume: self.volume,
            vintage: self.vintage,
            price: self.price,
            comment: self.comment,
            detailed_comment: self.detailed_comment,
            in_stock: self
                .stock
                .unwrap_or(StockStatus::InStock)
                .symbol()
                .to_string(),
            untappd_url: self.untappd_url,
            jan: self.jan,
            beer_image_url: self.beer_image_url,
            extra: Default::default(),
        }
    }
}

pub fn update_beer(
    source: &dyn BeerSource,
    cache: &CatalogCache,
    update: &BeerUpdate,
) -> Result<Beer, AdminError> {
    let _guard = WRITE_MTX.lock().unwrap_or_else(PoisonError::into_inner);

    let mut table = source.load()?;
    let record = table
        .records
        .iter_mut()
        .find(|r| parse_id(&r.id) == Some(update.id))
        .ok_or(AdminError::NotFound(update.id))?;

    record.in_stock = update.stock.symbol().to_string();
    record.price = display_number(update.price);
    record.comment = update.comment.clone();
    record.detailed_comment = update.detailed_comment.clone();
    let updated = Beer::from_record(record.clone());

    if let Err(err) = source.save(&table) {
        warn!(source = %source.identity(), id = update.id, error = %err, "beer update not saved");
        return Err(err.into());
    }
    cache.invalidate(&source.identity());
    info!(source = %source.identity(), id = update.id, stock = %update.stock, "beer updated");
    Ok(updated)
}

pub fn add_beer(
    source: &dyn BeerSource,
    cache: &CatalogCache,
    new_beer: NewBeer,
) -> Result<Beer, AdminError> {
    let _guard = WRITE_MTX.lock().unwrap_or_else(PoisonError::into_inner);

    let mut table = source.load()?;
    let id = next_id(table.records.iter().map(|r| parse_id(&r.id)))
        .ok_or(AdminError::IdExhausted(i64::MAX))?;
    let record = new_beer.into_record(id);
    table.records.push(record.clone());

    if let Err(err) = source.save(&table) {
        warn!(source = %source.identity(), id, error = %err, "new beer not saved");
        return Err(err.into());
    }
    cache.invalidate(&source.identity());
    info!(source = %source.identity(), id, "beer added");
    Ok(Beer::from_record(record))
}
