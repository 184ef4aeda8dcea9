//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::db;
use crate::errors::IndexerError;
use crate::events::EventRecord;
use crate::portfolio::{FundSnapshot, Position};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/pools", get(get_pools))
        .route("/participants/:address", get(get_participant))
        .route("/participants/:address/events", get(get_participant_events))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub participant: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct PoolsResponse {
    #[serde(flatten)]
    pub snapshot: FundSnapshot,
    pub participants: usize,
}

#[derive(Serialize)]
pub struct ParticipantResponse {
    pub participant: String,
    #[serde(flatten)]
    pub position: Position,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

impl IntoResponse for IndexerError {
    fn into_response(self) -> Response {
        warn!("API request failed: {self}");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
    }
}

async fn replay_all(pool: &SqlitePool) -> Result<FundSnapshot, IndexerError> {
    let events = db::get_all_events(pool).await?;
    FundSnapshot::replay(&events)
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
///
/// Every indexed event, oldest first.
pub async fn get_all_events(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<AllEventsResponse>, IndexerError> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /participants/:address/events`
pub async fn get_participant_events(
    State(state): State<Arc<ApiState>>,
    Path(participant): Path<String>,
) -> Result<Json<EventsResponse>, IndexerError> {
    let events = db::get_events_for_participant(&state.pool, &participant).await?;
    Ok(Json(EventsResponse {
        participant,
        count: events.len(),
        events,
    }))
}

/// `GET /participants/:address`
///
/// The participant's position replayed from indexed events; 404 when the
/// address never invested.
pub async fn get_participant(
    State(state): State<Arc<ApiState>>,
    Path(participant): Path<String>,
) -> Result<Response, IndexerError> {
    let snapshot = replay_all(&state.pool).await?;
    Ok(match snapshot.position(&participant) {
        Some(position) => Json(ParticipantResponse {
            participant,
            position: position.clone(),
        })
        .into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("no investment found for {participant}"),
        ),
    })
}

/// `GET /pools`
///
/// Stablecoin / growing-assets accumulators replayed from indexed events.
pub async fn get_pools(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<PoolsResponse>, IndexerError> {
    let snapshot = replay_all(&state.pool).await?;
    Ok(Json(PoolsResponse {
        participants: snapshot.participant_count(),
        snapshot,
    }))
}
