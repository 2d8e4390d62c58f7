//! HTTP handlers for the REST API.
//!
//! Extractors are taken as `Result<_, Rejection>` so malformed input turns into
//! a 422 [`AppError`] with the usual JSON error body instead of axum's plain
//! text rejection.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::dto::{CoilListQuery, CreateCoilRequest, HealthResponse, StatisticsQuery};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{Coil, CoilId};
use crate::services::CoilStats;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Coils
// =============================================================================

/// POST /coils/
pub async fn create_coil(
    State(state): State<AppState>,
    payload: Result<Json<CreateCoilRequest>, JsonRejection>,
) -> HandlerResult<Coil> {
    let Json(request) = payload?;
    let coil =
        db_services::create_coil(state.repository.as_ref(), request.length, request.weight)
            .await?;
    Ok(Json(coil))
}

/// DELETE /coils/{id}
///
/// 404 when the coil is unknown or was already removed.
pub async fn remove_coil(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> HandlerResult<Coil> {
    let Path(id) = id?;
    let id = CoilId::new(id);

    db_services::remove_coil(state.repository.as_ref(), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Coil {} not found or already removed", id)))
}

/// GET /coils/
pub async fn list_coils(
    State(state): State<AppState>,
    query: Result<Query<CoilListQuery>, QueryRejection>,
) -> HandlerResult<Vec<Coil>> {
    let Query(query) = query?;
    let filter = query.into_filter().map_err(AppError::Unprocessable)?;

    let coils = db_services::list_coils(state.repository.as_ref(), &filter).await?;
    Ok(Json(coils))
}

// =============================================================================
// Statistics
// =============================================================================

/// GET /statistics/?start_date=..&end_date=..
///
/// 422 for missing or unparseable dates, 400 when `start_date > end_date`.
pub async fn get_statistics(
    State(state): State<AppState>,
    query: Result<Query<StatisticsQuery>, QueryRejection>,
) -> HandlerResult<CoilStats> {
    let Query(query) = query?;
    let (start, end) = query.window().map_err(AppError::Unprocessable)?;

    let stats = db_services::get_statistics(state.repository.as_ref(), start, end).await?;
    Ok(Json(stats))
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("No such endpoint".to_string())
}
