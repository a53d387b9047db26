use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use crate::error::ApiError;
use crate::metrics::{FETCH_LATENCY, REQUEST_TOTAL, UPSTREAM_FAILURES};
use crate::state::AppState;
use crate::validator::{Rejection, validate};

#[derive(Debug, Deserialize)]
pub struct PlayersQuery {
    pub server: Option<String>,
}

// GET /api/players?server=ip:port
pub async fn players_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PlayersQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    REQUEST_TOTAL.inc();

    // e.g. a repeated `server` key
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e, "Unparseable query string");
        Rejection::InvalidFormat
    })?;

    let raw = query.server.as_deref().unwrap_or_default();
    let addr = validate(raw).inspect_err(|reason| {
        tracing::debug!(server = %raw, reason = %reason, "Rejected server address");
    })?;

    let start_time = Instant::now();
    let result = state.fetcher.fetch(&addr).await;
    FETCH_LATENCY.observe(start_time.elapsed().as_secs_f64());

    let body = result.inspect_err(|e| {
        UPSTREAM_FAILURES.inc();
        tracing::warn!(server = %addr, status = e.status().as_u16(), error = %e, "Players fetch failed");
    })?;

    tracing::debug!(server = %addr, bytes = body.len(), "Relaying players.json");

    // forwarded byte for byte, never reshaped
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
