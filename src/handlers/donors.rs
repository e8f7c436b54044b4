use axum::{extract::State, http::StatusCode, Json};

use crate::db::{queries, AppState};
use crate::error::{constraint_kind, AppError, ConstraintKind, Result};
use crate::models::{CreateDonor, Donor};

/// How many donors the public listing returns.
const RECENT_DONORS_LIMIT: i64 = 5;

/// List the most recently registered donors, newest first.
pub async fn list_donors(State(state): State<AppState>) -> Result<Json<Vec<Donor>>> {
    let conn = state.db.get()?;
    let donors = queries::list_recent_donors(&conn, RECENT_DONORS_LIMIT)?;
    Ok(Json(donors))
}

/// Register a donor directly (outside the payment flow). Email is optional;
/// when present it must not collide with an existing donor.
pub async fn create_donor(
    State(state): State<AppState>,
    Json(input): Json<CreateDonor>,
) -> Result<(StatusCode, Json<Donor>)> {
    if input.full_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        return Err(AppError::Validation("full_name is required".into()));
    }
    if let Some(ref email) = input.email {
        if email.trim().is_empty() {
            return Err(AppError::Validation("email must not be blank".into()));
        }
    }

    let conn = state.db.get()?;
    match queries::create_donor(&conn, &input) {
        Ok(donor) => Ok((StatusCode::CREATED, Json(donor))),
        Err(AppError::Database(ref e))
            if constraint_kind(e) == Some(ConstraintKind::Unique) =>
        {
            Err(AppError::Conflict(
                "a donor with this email already exists".into(),
            ))
        }
        Err(e) => Err(e),
    }
}
