use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A constraint failure that is not one of the expected races
    /// (e.g. a foreign-key violation on the trail append). Treated as a
    /// data defect, not a transient condition.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone())),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "Validation failed", Some(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            AppError::Integrity(msg) => {
                tracing::error!("Integrity violation: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON", Some(e.to_string()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Which database constraint a failed statement violated.
///
/// The dedup and lost-race-on-create recovery paths depend on telling a
/// uniqueness violation apart from everything else. Classifying the SQLite
/// extended error code keeps that logic structural instead of matching on
/// error message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    Other,
}

/// Classify a rusqlite error as a constraint violation, if it is one.
pub fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Some(match e.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => ConstraintKind::Unique,
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
                rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
                rusqlite::ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
                _ => ConstraintKind::Other,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parents (id TEXT PRIMARY KEY);
             CREATE TABLE children (
                 id TEXT PRIMARY KEY,
                 parent_id TEXT NOT NULL REFERENCES parents(id),
                 tag TEXT UNIQUE
             );",
        )
        .unwrap();
        conn
    }

    #[test]
    fn classifies_unique_violation() {
        let conn = test_conn();
        conn.execute("INSERT INTO parents (id) VALUES ('p1')", []).unwrap();
        conn.execute(
            "INSERT INTO children (id, parent_id, tag) VALUES ('c1', 'p1', 't')",
            [],
        )
        .unwrap();
        let err = conn
            .execute(
                "INSERT INTO children (id, parent_id, tag) VALUES ('c2', 'p1', 't')",
                [],
            )
            .unwrap_err();
        assert_eq!(constraint_kind(&err), Some(ConstraintKind::Unique));
    }

    #[test]
    fn classifies_foreign_key_violation() {
        let conn = test_conn();
        let err = conn
            .execute(
                "INSERT INTO children (id, parent_id, tag) VALUES ('c1', 'missing', 't')",
                [],
            )
            .unwrap_err();
        assert_eq!(constraint_kind(&err), Some(ConstraintKind::ForeignKey));
    }

    #[test]
    fn non_constraint_errors_are_not_classified() {
        let conn = test_conn();
        let err = conn
            .execute("INSERT INTO no_such_table (id) VALUES ('x')", [])
            .unwrap_err();
        assert_eq!(constraint_kind(&err), None);
    }
}
