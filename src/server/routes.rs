use tracing::{error, warn};

use crate::server::api::{self, ApiError};
use crate::server::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

fn respond(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(err) => api_error_response(&err),
    }
}

/// Pure dispatch: everything the handler needs is passed in, so tests call this directly.
pub fn route_request(
    state: &AppState,
    method: &str,
    path: &str,
    body: &str,
    admin_token: Option<&str>,
) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => respond(api::health_payload(state)),
        ("POST", "/api/catalog") => respond(api::catalog_payload(state, body)),
        ("GET", path) if path.starts_with("/api/beers/") => {
            respond(api::beer_payload(state, path.trim_start_matches("/api/beers/")))
        }
        (method, path) if path.starts_with("/api/admin/") => {
            if let Err(err) = api::authorize(state.admin_token.as_deref(), admin_token) {
                return api_error_response(&err);
            }
            match (method, path) {
                ("POST", "/api/admin/beers") => respond(api::admin_add_payload(state, body)),
                ("PUT", path) if path.starts_with("/api/admin/beers/") => respond(
                    api::admin_update_payload(
                        state,
                        path.trim_start_matches("/api/admin/beers/"),
                        body,
                    ),
                ),
                ("POST", "/api/admin/reload") => respond(api::admin_reload_payload(state)),
                _ => error_response(404, "Not Found", "Route not found"),
            }
        }
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn api_error_response(err: &ApiError) -> HttpResponse {
    let (status_code, status_text) = err.status();
    if status_code >= 500 {
        error!(status = status_code, "{err}");
    } else {
        warn!(status = status_code, "{err}");
    }
    error_response(status_code, status_text, &err.to_string())
}

pub fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="ja">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Beerlist API Console</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    input, select { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 180px; }
  </style>
</head>
<body>
  <h1>Beerlist Local API</h1>

  <div class="card">
    <strong>Health</strong>
    <div><button id="health-btn">GET /api/health</button></div>
  </div>

  <div class="card">
    <strong>Catalog</strong>
    <label for="search">Search</label>
    <input id="search" placeholder="IPA, セゾン, ..." />
    <label for="sort">Sort</label>
    <select id="sort">
      <option value="name">name</option>
      <option value="abv_asc">abv_asc</option>
      <option value="abv_desc">abv_desc</option>
      <option value="price_asc">price_asc</option>
      <option value="brewery">brewery</option>
      <option value="style">style</option>
      <option value="random">random</option>
    </select>
    <div>
      <button id="apply-btn">Apply filters</button>
      <button id="more-btn">Show more</button>
      <button id="reset-btn">Reset</button>
    </div>
  </div>

  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');
    let session = null;

    async function request(path, options) {
      output.textContent = 'Loading…';
      const response = await fetch(path, options);
      const text = await response.text();
      try {
        const j = JSON.parse(text);
        if (j.session) session = j.session;
      } catch (e) {}
      output.textContent = 'HTTP ' + response.status + '\n' + text;
    }

    function act(action) {
      request('/api/catalog', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ session, action }),
      });
    }

    document.getElementById('health-btn').addEventListener('click', () => {
      request('/api/health', { method: 'GET' });
    });
    document.getElementById('apply-btn').addEventListener('click', () => {
      const filters = Object.assign({}, session ? session.filters : {}, {
        search_text: document.getElementById('search').value,
        sort: document.getElementById('sort').value,
      });
      act({ type: 'set_filters', filters });
    });
    document.getElementById('more-btn').addEventListener('click', () => act({ type: 'show_more' }));
    document.getElementById('reset-btn').addEventListener('click', () => act({ type: 'reset' }));
  </script>
</body>
</html>
"#
    .to_string()
}
