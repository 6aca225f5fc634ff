use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use snapshot_core::SnapshotError;
use snapshot_types::api::ErrorResponse;
use tracing::{error, warn};

/// Maps the core error taxonomy onto HTTP statuses.
pub struct ApiError(pub SnapshotError);

impl From<SnapshotError> for ApiError {
    fn from(e: SnapshotError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SnapshotError::Validation(_) => StatusCode::BAD_REQUEST,
            SnapshotError::Timeout => StatusCode::REQUEST_TIMEOUT,
            SnapshotError::Store(e) => {
                error!("Store error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SnapshotError::Delivery(e) => {
                warn!("Delivery error: {}", e);
                StatusCode::BAD_GATEWAY
            }
        };

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}
