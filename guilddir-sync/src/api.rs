//! HTTP admin API
//!
//! Thin transport over the engine: health probe, manual refresh, direct
//! lookup, and a text endpoint a chat adapter can forward command lines to.
//! Lookup reads only from the published snapshot and never blocks on a
//! reconciliation in flight.

use crate::commands;
use crate::orchestrator::RefreshKind;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use guilddir_common::Error;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "guilddir-sync".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Summary of a manual refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub source: String,
    pub kept: usize,
    pub removed: usize,
}

/// POST /api/refresh
///
/// Runs one manual reconciliation cycle. 409 while another cycle is in
/// flight, 502 when no content source is available, 422 for malformed
/// content; the previous snapshot stays published in every failure case.
pub async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, (StatusCode, String)> {
    match state.reconciler.reconcile(RefreshKind::Manual).await {
        Ok(summary) => Ok(Json(RefreshResponse {
            source: summary.source.to_string(),
            kept: summary.kept,
            removed: summary.removed,
        })),
        Err(e) => Err((error_status(&e), e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    #[serde(default)]
    pub debug: bool,
}

/// GET /api/servers/:name
pub async fn lookup(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<LookupParams>,
) -> (StatusCode, String) {
    match state.store.lookup(&name) {
        Some(record) if params.debug => (StatusCode::OK, commands::format_record_debug(&record)),
        Some(record) => (StatusCode::OK, commands::format_record(&record)),
        None => (
            StatusCode::NOT_FOUND,
            format!("Server with keyword '{name}' not found."),
        ),
    }
}

/// POST /api/command
///
/// Routes one raw text line through the command table and returns the
/// reply. Non-command lines get an empty 204 so chat adapters can forward
/// traffic unfiltered.
pub async fn command(State(state): State<AppState>, body: String) -> (StatusCode, String) {
    let ctx = state.command_context();
    match state.commands.dispatch(&ctx, &body).await {
        Some(reply) => (StatusCode::OK, reply),
        None => (StatusCode::NO_CONTENT, String::new()),
    }
}

fn error_status(error: &Error) -> StatusCode {
    match error {
        Error::ReconciliationInProgress => StatusCode::CONFLICT,
        Error::SourceUnavailable { .. } => StatusCode::BAD_GATEWAY,
        Error::MalformedContent(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the admin API router
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/refresh", post(refresh))
        .route("/api/servers/:name", get(lookup))
        .route("/api/command", post(command))
}
