//! HTTP resolution service.
//!
//! Exposes the resolution engine to the host's routing and rendering
//! layers as a small JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/resolve?path=` | Friendly→canonical rewrite for the router |
//! | `GET`  | `/sef?path=` | Canonical→friendly URL for link rendering |
//! | `GET`  | `/meta?url=` | Page-head metadata for the renderer |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "no_rewrite", "message": "no rewrite for /x" } }
//! ```
//!
//! Error codes: `bad_request` (400), `no_rewrite` (404), `not_found` (404),
//! `store_error` (500). A miss is part of the contract: the router is
//! expected to treat 404 as "route the original path unchanged".
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the host can call
//! the service from wherever its routing and rendering run.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::medium;
use crate::models::{PageMetadata, RouteTarget};
use crate::resolve;
use crate::store::{MappingStore, StoreError};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    store: Arc<MappingStore>,
    base_url: String,
}

/// Starts the resolution service.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    let store = Arc::new(MappingStore::new(medium::from_config(config).await?));
    let state = AppState {
        store,
        base_url: config.site.base_url.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/resolve", get(handle_resolve))
        .route("/sef", get(handle_sef))
        .route("/meta", get(handle_meta))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("Resolution service listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g. `"no_rewrite"`, `"store_error"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 404 for an inbound path with no rewrite.
fn no_rewrite(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "no_rewrite".to_string(),
        message: message.into(),
    }
}

/// Constructs a 404 Not Found error.
fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Constructs a 500 for a persistence medium fault.
fn store_error(err: StoreError) -> AppError {
    tracing::error!(error = %err, "store fault");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "store_error".to_string(),
        message: err.to_string(),
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /resolve ============

#[derive(Deserialize)]
struct PathParams {
    path: String,
}

/// Handler for `GET /resolve?path=`.
///
/// Returns the canonical routing target for a friendly inbound path, or a
/// 404 `no_rewrite` body when the router should proceed with the original
/// path unchanged.
async fn handle_resolve(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> Result<Json<RouteTarget>, AppError> {
    let target = resolve::route_rewrite(&state.store, &state.base_url, &params.path)
        .await
        .map_err(store_error)?
        .ok_or_else(|| no_rewrite(format!("no rewrite for {}", params.path)))?;

    Ok(Json(target))
}

// ============ GET /sef ============

/// JSON response body for `GET /sef`.
#[derive(Serialize)]
struct SefResponse {
    /// The SEF equivalent, or the input unchanged when unmapped.
    sef_url: String,
}

/// Handler for `GET /sef?path=`.
async fn handle_sef(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> Result<Json<SefResponse>, AppError> {
    let sef_url = resolve::sef_url(&state.store, &state.base_url, &params.path)
        .await
        .map_err(store_error)?;

    Ok(Json(SefResponse { sef_url }))
}

// ============ GET /meta ============

#[derive(Deserialize)]
struct UrlParams {
    url: String,
}

/// Handler for `GET /meta?url=`.
async fn handle_meta(
    State(state): State<AppState>,
    Query(params): Query<UrlParams>,
) -> Result<Json<PageMetadata>, AppError> {
    let meta = resolve::page_metadata(&state.store, &state.base_url, &params.url)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found(format!("no metadata for {}", params.url)))?;

    Ok(Json(meta))
}
