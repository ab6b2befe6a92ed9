use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Generic message returned to callers for anything the server did not expect.
pub const INTERNAL_MESSAGE: &str = "Unexpected Error, check server logs";

/// AppError
///
/// The request-boundary error taxonomy. Every handler and service returns this
/// type; `IntoResponse` turns it into a JSON body of the form
/// `{ "statusCode": 404, "error": "Not Found", "message": "..." }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed input or a rejected business rule (400).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Missing, invalid or expired token, or an inactive account (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking a required role (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Unique-constraint violation. Reported as 400 with the store's detail.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A guarded route ran without an authenticated user attached to the
    /// request. This is a routing bug, not a caller mistake (502).
    #[error("bad gateway: {0}")]
    BadGateway(String),

    /// Anything unrecognised. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                INTERNAL_MESSAGE.to_string()
            }
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::BadGateway(msg) => msg,
        };

        let body = json!({
            "statusCode": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// StoreError
///
/// What the persistence layer reports. Services translate it into an
/// `AppError` at the boundary via `From`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the database detail,
    /// e.g. `Key (email)=(a@b.com) already exists.`
    #[error("unique violation: {0}")]
    UniqueViolation(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Postgres SQLSTATE for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                let detail = db_err
                    .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                    .and_then(|pg| pg.detail())
                    .map(str::to_string)
                    .unwrap_or_else(|| db_err.message().to_string());
                return StoreError::UniqueViolation(detail);
            }
        }
        StoreError::Backend(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(detail) => AppError::Conflict(detail),
            StoreError::Backend(detail) => AppError::Internal(detail),
        }
    }
}
