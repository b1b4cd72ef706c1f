//! Foodgram API library.
//!
//! HTTP surface of the recipe-sharing backend: recipes, tags, the
//! ingredient catalog, favorites, the shopping cart and subscriptions.
//! Built as a library so the router can be driven directly in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

use std::time::Duration;

use axum::http::{Request, Response};
use axum::{Router, routing::get};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;
use crate::storage::MEDIA_URL_PREFIX;

/// Build the router with every route and layer except path normalization.
pub fn router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config().media_root);

    Router::new()
        .route("/health", get(routes::health))
        .route("/health/ready", get(routes::readiness))
        .nest("/api", routes::routes())
        .nest_service(MEDIA_URL_PREFIX, media)
        .fallback(routes::not_found)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// The complete application: [`router`] wrapped so that `/api/tags/` and
/// `/api/tags` reach the same handler.
pub fn app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
