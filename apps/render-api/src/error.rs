//! Error types for the Render API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_core::CoreError;
use folio_render::RenderError;
use tracing::error;

/// Render API errors. Bodies are plain text.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid line items: {0}")]
    Validation(#[from] CoreError),

    #[error("Error generating PDF: {0}")]
    Render(RenderError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Renderer busy: {0}")]
    Overloaded(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Render(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Overloaded(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(error: RenderError) -> Self {
        if error.is_client_error() {
            ApiError::BadRequest(error.to_string())
        } else {
            ApiError::Render(error)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
