use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::catalog::rng::fresh_seed;
use crate::catalog::session::{reduce, Action, SessionState};
use crate::catalog::sort::SortMode;
use crate::catalog::view::{beer_card, render};
use crate::data::admin::{add_beer, update_beer, AdminError, BeerUpdate, NewBeer};
use crate::data::parse::{parse_id, StockStatus};
use crate::data::record::BeerRecord;
use crate::data::source::SourceError;
use crate::server::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("invalid or missing x-admin-token")]
    Unauthorized,
    #[error("admin API disabled: BEERLIST_ADMIN_TOKEN is not set")]
    Forbidden,
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            Self::Parse(_) | Self::Validation(_) => (400, "Bad Request"),
            Self::NotFound(_) | Self::Admin(AdminError::NotFound(_)) => (404, "Not Found"),
            Self::Unauthorized => (401, "Unauthorized"),
            Self::Forbidden => (403, "Forbidden"),
            Self::Admin(AdminError::IdExhausted(_)) => (409, "Conflict"),
            Self::Admin(_) | Self::Source(_) | Self::Encode(_) => (500, "Internal Server Error"),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(ApiError::Encode)
}

fn parse_body<T: DeserializeOwned + Default>(body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(ApiError::Parse)
}

/// Admin routes need a configured token and a matching header.
pub fn authorize(expected: Option<&str>, provided: Option<&str>) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Err(ApiError::Forbidden);
    };
    match provided.map(str::trim) {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

pub fn health_payload(state: &AppState) -> Result<String, ApiError> {
    let identity = state.source.identity();
    to_json(&serde_json::json!({
        "status": "ok",
        "service": "beerlist",
        "version": env!("CARGO_PKG_VERSION"),
        "source": identity,
        "cached": state.cache.is_cached(&identity),
        "admin_enabled": state.admin_token.is_some(),
    }))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogRequest {
    pub session: Option<SessionState>,
    pub action: Option<Action>,
}

/// One interaction: advance the client's session by `action`, then render the page.
pub fn catalog_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let request: CatalogRequest = parse_body(body)?;
    let paging = &state.view.paging;
    let mut session = request
        .session
        .unwrap_or_else(|| SessionState::with_paging(paging));
    session = match &request.action {
        Some(action) => reduce(session, action, paging),
        None => session,
    };
    if session.filters.sort == SortMode::Random && session.random_seed.is_none() {
        session.random_seed = Some(fresh_seed());
    }
    let catalog = state.cache.get_or_load(state.source.as_ref())?;
    to_json(&render(&catalog, &session, &state.view))
}

fn parse_path_id(raw: &str) -> Result<i64, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(format!("invalid beer id '{raw}'")));
    }
    parse_id(raw).ok_or_else(|| ApiError::Validation(format!("invalid beer id '{raw}'")))
}

pub fn beer_payload(state: &AppState, raw_id: &str) -> Result<String, ApiError> {
    let id = parse_path_id(raw_id)?;
    let catalog = state.cache.get_or_load(state.source.as_ref())?;
    let card = catalog
        .find(id)
        .and_then(|beer| beer_card(&catalog, beer, &SessionState::default(), &state.view))
        .ok_or_else(|| ApiError::NotFound(format!("beer {id} not found")))?;
    to_json(&card)
}

/// Body of `PUT /api/admin/beers/{id}`; the id comes from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub stock: StockStatus,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub detailed_comment: String,
}

#[derive(Debug, Serialize)]
struct AdminResponse<'a> {
    status: &'static str,
    action: &'static str,
    id: Option<i64>,
    record: &'a BeerRecord,
}

pub fn admin_update_payload(state: &AppState, raw_id: &str, body: &str) -> Result<String, ApiError> {
    let id = parse_path_id(raw_id)?;
    let request: UpdateRequest = serde_json::from_str(body).map_err(ApiError::Parse)?;
    if request.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(ApiError::Validation("price must be a non-negative number".to_string()));
    }
    let update = BeerUpdate {
        id,
        stock: request.stock,
        price: request.price,
        comment: request.comment,
        detailed_comment: request.detailed_comment,
    };
    let beer = update_beer(state.source.as_ref(), &state.cache, &update)?;
    info!(id, "admin update via api");
    to_json(&AdminResponse {
        status: "ok",
        action: "updated",
        id: beer.id,
        record: &beer.record,
    })
}

pub fn admin_add_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let new_beer: NewBeer = serde_json::from_str(body).map_err(ApiError::Parse)?;
    if new_beer.name_local.trim().is_empty() && new_beer.name_jp.trim().is_empty() {
        return Err(ApiError::Validation(
            "name_local or name_jp is required".to_string(),
        ));
    }
    let beer = add_beer(state.source.as_ref(), &state.cache, new_beer)?;
    info!(id = ?beer.id, "admin add via api");
    to_json(&AdminResponse {
        status: "ok",
        action: "added",
        id: beer.id,
        record: &beer.record,
    })
}

pub fn admin_reload_payload(state: &AppState) -> Result<String, ApiError> {
    let identity = state.source.identity();
    state.cache.invalidate(&identity);
    let catalog = state.cache.get_or_load(state.source.as_ref())?;
    to_json(&serde_json::json!({
        "status": "ok",
        "source": identity,
        "rows": catalog.beers.len(),
        "loaded_at": catalog.loaded_at.to_rfc3339(),
    }))
}
