//! Occupancy service routes
//!
//! `POST /scans` is the ingestion adapter entry point; everything else is a
//! read-only view of buildings and sessions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::error;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        ScanOutcome, ScanRequest,
        api::{BuildingResponse, ScanResponse, SessionQuery, SessionResponse},
    },
    state::AppState,
    store::OccupancyStore,
    validation::{validate_building_id, validate_tag_key},
};

/// Create the router for the occupancy service
pub fn create_router<S>(state: AppState<S>) -> Router
where
    S: OccupancyStore + Clone + 'static,
{
    Router::new()
        .route("/health", get(health_check::<S>))
        .route("/scans", post(record_scan::<S>))
        .route("/buildings", get(list_buildings::<S>))
        .route("/buildings/:id", get(get_building::<S>))
        .route("/buildings/:id/sessions", get(list_sessions::<S>))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check<S: OccupancyStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<impl IntoResponse> {
    let healthy = state.ledger.health_check().await.map_err(|e| {
        error!("Store health check failed: {}", e);
        ApiError::Unavailable
    })?;

    if !healthy {
        return Err(ApiError::Unavailable);
    }

    Ok(Json(json!({
        "status": "ok",
        "service": "occupancy-service"
    })))
}

/// Record a scan from the ingestion adapter
pub async fn record_scan<S: OccupancyStore>(
    State(state): State<AppState<S>>,
    Json(payload): Json<ScanRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_building_id(&payload.building_id).map_err(ApiError::BadRequest)?;
    if let Some(tag_key) = payload.tag_key.as_deref() {
        validate_tag_key(tag_key).map_err(ApiError::BadRequest)?;
    }

    let outcome = state.ledger.record_scan(payload).await.map_err(|e| {
        if !e.is_retryable() {
            error!("Failed to record scan: {}", e);
        }
        ApiError::from(e)
    })?;

    let status = match outcome {
        ScanOutcome::Opened { .. } => StatusCode::CREATED,
        ScanOutcome::Closed { .. } => StatusCode::OK,
        ScanOutcome::Dropped(_) => StatusCode::ACCEPTED,
    };

    Ok((status, Json(ScanResponse::from(&outcome))))
}

/// Get all buildings with their live occupancy
pub async fn list_buildings<S: OccupancyStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<impl IntoResponse> {
    let buildings = state.ledger.buildings().await?;

    let buildings: Vec<BuildingResponse> =
        buildings.into_iter().map(BuildingResponse::from).collect();

    Ok(Json(buildings))
}

/// Get a building by ID
pub async fn get_building<S: OccupancyStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let building = state
        .ledger
        .building(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Building {} not found", id)))?;

    Ok(Json(BuildingResponse::from(building)))
}

/// Get sessions recorded at a building, newest first
pub async fn list_sessions<S: OccupancyStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<impl IntoResponse> {
    let sessions = state.ledger.sessions(&id, query.open).await?;

    let sessions: Vec<SessionResponse> = sessions
        .into_iter()
        .map(|session| SessionResponse::render(session, &state.display_zone))
        .collect();

    Ok(Json(sessions))
}
