//! Resource endpoints.
//!
//! Each handler maps one method and path to a [`ResourceOperation`], runs it through
//! the [`ResourceHandler`](catalog_core::handler::ResourceHandler) and renders the
//! [`Outcome`].

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use catalog_core::{
    document::{document_from_json, document_to_json},
    handler::{Outcome, ResourceOperation},
    translate::QueryParams,
};

use crate::{
    error::{ApiError, ErrorResponse},
    state::AppState,
};

async fn run(state: &AppState, operation: ResourceOperation) -> Result<Response, ApiError> {
    let outcome = state.handler()?.execute(operation).await?;

    Ok(render(outcome))
}

fn render(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Listed(resources) => Json(json!({
            "count": resources.len(),
            "resources": resources.into_iter().map(document_to_json).collect::<Vec<_>>(),
        }))
        .into_response(),
        Outcome::Found(resource) => Json(document_to_json(resource)).into_response(),
        Outcome::Created(id) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Resource created", "id": id.to_hex() })),
        )
            .into_response(),
        Outcome::Updated(id) => Json(json!({ "message": "Resource updated", "id": id.to_hex() })).into_response(),
        Outcome::Deleted(_) => StatusCode::NO_CONTENT.into_response(),
    }
}

fn payload(body: Result<Json<Value>, JsonRejection>) -> Result<bson::Document, ApiError> {
    let Json(value) = body?;

    Ok(document_from_json(value)?)
}

/// `GET /api/resources`
pub async fn list_resources(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(pairs) = pairs?;

    run(&state, ResourceOperation::List(QueryParams::from_pairs(pairs))).await
}

/// `GET /api/resources/{id}`
pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    run(&state, ResourceOperation::Get { id }).await
}

/// `POST /api/resources`
pub async fn create_resource(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = payload(body)?;

    run(&state, ResourceOperation::Create { payload }).await
}

/// `PUT /api/resources/{id}`
pub async fn replace_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = payload(body)?;

    run(&state, ResourceOperation::FullUpdate { id, payload }).await
}

/// `PATCH /api/resources/{id}`
pub async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = payload(body)?;

    run(&state, ResourceOperation::PartialUpdate { id, payload }).await
}

/// `DELETE /api/resources/{id}`
pub async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    run(&state, ResourceOperation::Delete { id }).await
}

/// `GET /`: what this service is and where its endpoints live.
pub async fn discovery(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": state.config().service.name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "list": "GET /api/resources?category=&minPrice=&sort=price&fields=",
            "get": "GET /api/resources/{id}",
            "create": "POST /api/resources",
            "replace": "PUT /api/resources/{id}",
            "update": "PATCH /api/resources/{id}",
            "delete": "DELETE /api/resources/{id}",
            "health": "GET /health",
            "ready": "GET /ready",
        },
    }))
}

/// Any route not matched above.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "API endpoint not found".to_string(),
            code: None,
        }),
    )
}
