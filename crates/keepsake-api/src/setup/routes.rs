//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use keepsake_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for multipart boundaries and text fields on top of the file ceiling.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
/// Ceiling for the JSON and bodiless routes.
const JSON_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Bodies past this limit fail while the multipart stream is read, which the
    // upload extractor turns into the JSON 413. Files between the ceiling and
    // the limit are caught by the validator with the same answer.
    let upload_routes = Router::new()
        .route(
            "/api/albums/{id}/photos",
            post(handlers::photos::upload_photo).get(handlers::photos::list_album_photos),
        )
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES,
        ));

    let api_routes = Router::new()
        .route(
            "/api/albums",
            post(handlers::albums::create_album).get(handlers::albums::list_albums),
        )
        .route(
            "/api/albums/{id}",
            get(handlers::albums::get_album)
                .put(handlers::albums::update_album)
                .delete(handlers::albums::delete_album),
        )
        .route(
            "/api/photos/{id}",
            get(handlers::photos::get_photo).delete(handlers::photos::delete_photo),
        )
        .route("/uploads/{filename}", get(handlers::uploads::serve_upload))
        .route("/health", get(handlers::health::health_check))
        .layer(RequestBodyLimitLayer::new(JSON_BODY_LIMIT_BYTES));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = api_routes
        .merge(upload_routes)
        .with_state(state)
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::ApiDoc::openapi()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
