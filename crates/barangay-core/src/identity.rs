//! Identity-provider collaborator interface.
//!
//! Primary authentication is delegated to an external provider. This
//! core only needs it to provision accounts, to turn request
//! credentials into a stable identity id, and to open a session for a
//! freshly provisioned account.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BarangayResult;

/// Opaque, stable identifier assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalIdentityId(pub String);

impl ExternalIdentityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalIdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Credentials extracted from an inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    pub bearer_token: Option<String>,
}

impl RequestCredentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }

    /// Parse an `Authorization` header value. Anything other than a
    /// non-empty `Bearer` token yields empty credentials.
    pub fn from_authorization_header(value: Option<&str>) -> Self {
        let bearer_token = value
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        Self { bearer_token }
    }

    pub fn is_empty(&self) -> bool {
        self.bearer_token.is_none()
    }
}

/// Session credentials handed back to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    pub expires_in: u64,
}

pub trait IdentityProvider: Send + Sync {
    /// Create an account. A taken email fails with `AlreadyExists`; any
    /// other failure surfaces as `AuthProvider`.
    fn provision_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> impl Future<Output = BarangayResult<ExternalIdentityId>> + Send;

    /// Check a password against the account registered for `email`.
    /// `Ok(None)` when there is no such account or the password is wrong.
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = BarangayResult<Option<ExternalIdentityId>>> + Send;

    /// Resolve request credentials to an identity. `Ok(None)` means the
    /// credentials are missing, malformed or expired.
    fn verify_credentials(
        &self,
        credentials: &RequestCredentials,
    ) -> impl Future<Output = BarangayResult<Option<ExternalIdentityId>>> + Send;

    /// Issue session credentials for an identity.
    fn issue_session(
        &self,
        identity: &ExternalIdentityId,
    ) -> impl Future<Output = BarangayResult<SessionToken>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_is_parsed() {
        let creds = RequestCredentials::from_authorization_header(Some("Bearer abc.def"));
        assert_eq!(creds.bearer_token.as_deref(), Some("abc.def"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        assert!(RequestCredentials::from_authorization_header(Some("Basic Zm9v")).is_empty());
        assert!(RequestCredentials::from_authorization_header(Some("Bearer   ")).is_empty());
        assert!(RequestCredentials::from_authorization_header(None).is_empty());
    }
}
