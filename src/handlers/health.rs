use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::db::{queries, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    ok: bool,
    db: &'static str,
}

/// Liveness probe: reports whether the store answers a trivial query.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_up = state
        .db
        .get()
        .map(|conn| queries::ping(&conn).is_ok())
        .unwrap_or(false);

    if db_up {
        (StatusCode::OK, Json(HealthResponse { ok: true, db: "up" }))
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse { ok: false, db: "down" }),
        )
    }
}
