use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use zenith_core::{ApiResponse, CoreError, ErrorExt, RedditApiError};

/// Handler error. Renders as the failure envelope with a status picked from the
/// underlying [`CoreError`].
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CoreError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            CoreError::RedditApi(RedditApiError::UpstreamStatus { .. }) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            self.0.log_error();
        } else {
            self.0.log_warn();
        }

        let body = ApiResponse::<()>::failure(self.0.user_friendly_message());
        (status, Json(body)).into_response()
    }
}
