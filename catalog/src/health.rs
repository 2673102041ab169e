//! Health check handlers

use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Dependency name of the document store in readiness reports.
const STORE_DEPENDENCY: &str = "store";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Readiness check response with dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub service: String,
    pub dependencies: HashMap<String, DependencyStatus>,
}

/// Individual dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Liveness probe. Always 200 while the process is serving.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config().service.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe.
///
/// 503 until the store connection is established, and whenever the store stops
/// answering pings after that.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let store = match state.handler() {
        Ok(handler) => match handler.collection().ping().await {
            Ok(()) => DependencyStatus { healthy: true, message: None },
            Err(err) => DependencyStatus { healthy: false, message: Some(err.to_string()) },
        },
        Err(err) => DependencyStatus { healthy: false, message: Some(err.to_string()) },
    };

    let ready = store.healthy;
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    if !ready {
        tracing::warn!(message = ?store.message, "readiness check failed");
    }

    let response = ReadinessResponse {
        ready,
        service: state.config().service.name.clone(),
        dependencies: HashMap::from([(STORE_DEPENDENCY.to_string(), store)]),
    };

    (status, Json(response))
}
