use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;

/// Request failure, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Unparsable request parameters.
    BadRequest(anyhow::Error),
    /// Warehouse unreachable on a health probe.
    Unavailable(anyhow::Error),
    /// Query failures and anything else.
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, err) = match self {
            ApiError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
            ApiError::Unavailable(e) => (StatusCode::SERVICE_UNAVAILABLE, e),
            ApiError::Internal(e) => {
                error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e)
            },
        };

        (status, Json(json!({ "error": format!("{:#}", err) }))).into_response()
    }
}
