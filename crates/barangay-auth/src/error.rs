//! Authentication error types.

use barangay_core::error::BarangayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("password confirmation does not match")]
    PasswordMismatch,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for BarangayError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                BarangayError::Unauthenticated
            }
            AuthError::PasswordTooShort(_) | AuthError::PasswordMismatch => {
                BarangayError::Validation {
                    message: err.to_string(),
                }
            }
            AuthError::Crypto(msg) => BarangayError::AuthProvider(msg),
        }
    }
}
