use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::catalog::view::ViewConfig;
use crate::config::AppConfig;
use crate::data::cache::CatalogCache;
use crate::data::source::{source_from_location, BeerSource, SourceError};

pub mod api;
pub mod routes;

use routes::{HttpResponse, ADMIN_TOKEN_HEADER};

/// Shared by every request. Session state is not here: clients send it with each call.
pub struct AppState {
    pub source: Box<dyn BeerSource>,
    pub cache: CatalogCache,
    pub admin_token: Option<String>,
    pub view: ViewConfig,
}

impl AppState {
    pub fn new(source: Box<dyn BeerSource>, admin_token: Option<String>, view: ViewConfig) -> Self {
        Self {
            source,
            cache: CatalogCache::new(),
            admin_token,
            view,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let source = source_from_location(&config.source)?;
        Ok(Self::new(
            source,
            config.admin_token.clone(),
            config.view.clone(),
        ))
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let token = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let method = method.as_str().to_string();

    // Source I/O is blocking; keep it off the async workers.
    let handled = tokio::task::spawn_blocking(move || {
        routes::route_request(&state, &method, &path, &body, token.as_deref())
    })
    .await;

    match handled {
        Ok(response) => response.into_response(),
        Err(err) => {
            error!("request handler failed: {err}");
            routes::error_response(500, "Internal Server Error", "request handler failed")
                .into_response()
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(state: Arc<AppState>, bind_addr: &str) -> std::io::Result<()> {
    let identity = state.source.identity();
    match state.cache.get_or_load(state.source.as_ref()) {
        Ok(catalog) => info!(source = %identity, rows = catalog.beers.len(), "catalog loaded"),
        Err(err) => warn!(source = %identity, "initial load failed, will retry per request: {err}"),
    }
    if state.admin_token.is_none() {
        info!("BEERLIST_ADMIN_TOKEN not set; admin routes disabled");
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("beerlist server listening on http://{bind_addr}");
    axum::serve(listener, router(state)).await
}
