use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::AccountNotFound { .. }
            | Self::TransferNotFound { .. }
            | Self::StaffMemberNotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyReversed { .. } => StatusCode::CONFLICT,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Conflict { .. } | Self::Busy { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, %status, "Request refused");
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
