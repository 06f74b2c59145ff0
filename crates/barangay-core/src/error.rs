//! Error types for the barangay onboarding and access-control core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BarangayError {
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Prerequisite missing: {reason}")]
    PrerequisiteMissing { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invitation has expired")]
    Expired,

    /// Unknown, expired or revoked invitation code. Redemption surfaces
    /// every such case as this one variant so codes cannot be enumerated.
    #[error("Invalid or expired invitation code")]
    InvalidInvitation,

    #[error("Invitation has already been used")]
    AlreadyConsumed,

    #[error("Entity already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Identity provider error: {0}")]
    AuthProvider(String),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BarangayError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Returns `true` for outcomes the caller is expected to handle
    /// (permission, prerequisite and state checks), `false` for
    /// collaborator faults that warrant logging.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            Self::AuthProvider(_) | Self::Database(_) | Self::Internal(_)
        )
    }
}

pub type BarangayResult<T> = Result<T, BarangayError>;
