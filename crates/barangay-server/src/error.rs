//! Translation of domain errors into HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use barangay_core::error::BarangayError;
use serde::Serialize;
use tracing::error;

const INVALID_INVITATION: &str = "Invalid or expired invitation code";

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    /// Id of the record that already exists, for `already_exists`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<String>,
}

#[derive(Debug)]
pub struct ApiError(pub BarangayError);

impl From<BarangayError> for ApiError {
    fn from(err: BarangayError) -> Self {
        Self(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            BarangayError::Validation { .. } => StatusCode::BAD_REQUEST,
            BarangayError::Unauthenticated => StatusCode::UNAUTHORIZED,
            BarangayError::Forbidden { .. } | BarangayError::AccountInactive => {
                StatusCode::FORBIDDEN
            }
            BarangayError::NotFound { .. }
            | BarangayError::Expired
            | BarangayError::InvalidInvitation => StatusCode::NOT_FOUND,
            BarangayError::PrerequisiteMissing { .. }
            | BarangayError::AlreadyConsumed
            | BarangayError::AlreadyExists { .. } => StatusCode::CONFLICT,
            BarangayError::AuthProvider(_) => StatusCode::BAD_GATEWAY,
            BarangayError::Database(_) | BarangayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn body(&self) -> ErrorBody {
        let (code, message) = match &self.0 {
            BarangayError::Forbidden { reason } => ("forbidden", reason.clone()),
            BarangayError::PrerequisiteMissing { reason } => {
                ("prerequisite_missing", reason.clone())
            }
            BarangayError::NotFound { entity, .. } if entity == "invitation" => {
                ("invalid_invitation", INVALID_INVITATION.into())
            }
            BarangayError::Expired | BarangayError::InvalidInvitation => {
                ("invalid_invitation", INVALID_INVITATION.into())
            }
            BarangayError::NotFound { entity, .. } => ("not_found", format!("{entity} not found")),
            BarangayError::AlreadyConsumed => (
                "invitation_used",
                "This invitation has already been used.".into(),
            ),
            BarangayError::AlreadyExists { entity, .. } => {
                ("already_exists", format!("This {entity} already exists."))
            }
            BarangayError::AccountInactive => (
                "account_inactive",
                "This account has been deactivated.".into(),
            ),
            BarangayError::Unauthenticated => {
                ("unauthenticated", "Authentication required.".into())
            }
            BarangayError::Validation { message } => ("validation", message.clone()),
            BarangayError::AuthProvider(_) => (
                "auth_provider",
                "The sign-in service is unavailable, please try again.".into(),
            ),
            BarangayError::Database(_) | BarangayError::Internal(_) => {
                ("internal", "Something went wrong, please try again.".into())
            }
        };
        let existing_id = match &self.0 {
            BarangayError::AlreadyExists { id, .. } => Some(id.clone()),
            _ => None,
        };
        ErrorBody {
            code,
            message,
            existing_id,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if !self.0.is_expected() {
            error!(error = %self.0, "Request failed");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}
