use axum::{Router, http::StatusCode, routing::get};
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{handlers, health, state::AppState};

/// Builds the complete HTTP application: routes, fallback and middleware.
pub fn router(state: AppState) -> Router {
    let request_timeout = state.config().service.request_timeout();

    Router::new()
        .route("/", get(handlers::discovery))
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .route(
            "/api/resources",
            get(handlers::list_resources).post(handlers::create_resource),
        )
        .route(
            "/api/resources/{id}",
            get(handlers::get_resource)
                .put(handlers::replace_resource)
                .patch(handlers::update_resource)
                .delete(handlers::delete_resource),
        )
        .fallback(handlers::not_found)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
