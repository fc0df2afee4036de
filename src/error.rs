use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    /// Missing, unknown or expired credentials.
    #[error("{0}")]
    Unauthenticated(String),
    /// Authenticated, but not allowed to act on this record.
    #[error("{0}")]
    Unauthorized(String),
    #[error("Doctor not found")]
    DoctorNotFound,
    #[error("Doctor not available")]
    DoctorUnavailable,
    #[error("Slot not available")]
    SlotUnavailable,
    #[error("Appointment not found")]
    AppointmentNotFound,
    #[error("storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthenticated("Invalid credentials".into())
    }

    pub fn session_expired() -> Self {
        ApiError::Unauthenticated("Session expired".into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::DoctorNotFound => "DOCTOR_NOT_FOUND",
            ApiError::DoctorUnavailable => "DOCTOR_UNAVAILABLE",
            ApiError::SlotUnavailable => "SLOT_UNAVAILABLE",
            ApiError::AppointmentNotFound => "APPOINTMENT_NOT_FOUND",
            ApiError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized(_) => StatusCode::FORBIDDEN,
            ApiError::DoctorNotFound | ApiError::AppointmentNotFound => StatusCode::NOT_FOUND,
            ApiError::DoctorUnavailable | ApiError::SlotUnavailable => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Map a driver error into `Storage`, turning unique-key violations into a validation failure.
pub fn db_error(e: sqlx::Error) -> ApiError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return ApiError::Validation("Email already registered".into());
        }
    }
    ApiError::Storage(format!("db error: {e}"))
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            // don't leak driver details to clients
            ApiError::Storage(detail) => {
                tracing::error!("{detail}");
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };

        (
            self.status(),
            Json(ErrorResponse {
                success: false,
                code: self.code(),
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn slot_conflict_renders_failure_envelope() {
        let resp = ApiError::SlotUnavailable.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "SLOT_UNAVAILABLE");
        assert_eq!(body["message"], "Slot not available");
    }

    #[tokio::test]
    async fn storage_error_hides_driver_detail() {
        let resp = ApiError::Storage("db error: connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(resp).await;
        assert_eq!(body["code"], "STORAGE_ERROR");
        assert_eq!(body["message"], "Internal storage error");
    }

    #[test]
    fn unauthorized_and_unauthenticated_use_distinct_statuses() {
        assert_eq!(ApiError::session_expired().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Unauthorized("Unauthorized action".into()).status(),
            StatusCode::FORBIDDEN
        );
    }
}
