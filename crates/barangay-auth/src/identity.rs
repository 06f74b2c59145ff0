//! Local identity provider: credential storage through an
//! [`AccountRepository`] and EdDSA bearer tokens.

use barangay_core::error::{BarangayError, BarangayResult};
use barangay_core::identity::{
    ExternalIdentityId, IdentityProvider, RequestCredentials, SessionToken,
};
use barangay_core::models::account::CreateAccount;
use barangay_core::repository::AccountRepository;
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Identity provider backed by the application's own account store.
///
/// Generic over the repository so that the auth layer has no
/// dependency on the database crate.
#[derive(Clone)]
pub struct LocalIdentityProvider<A: AccountRepository> {
    accounts: A,
    config: AuthConfig,
}

impl<A: AccountRepository> LocalIdentityProvider<A> {
    pub fn new(accounts: A, config: AuthConfig) -> Self {
        Self { accounts, config }
    }

    /// Exchange email + password for session credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> BarangayResult<SessionToken> {
        match self.authenticate(email, password).await? {
            Some(identity) => self.token_for(identity.as_str()),
            None => Err(AuthError::InvalidCredentials.into()),
        }
    }

    fn token_for(&self, subject: &str) -> BarangayResult<SessionToken> {
        let access_token = token::issue_access_token(subject, &self.config)?;
        Ok(SessionToken {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }
}

impl<A: AccountRepository> IdentityProvider for LocalIdentityProvider<A> {
    async fn provision_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> BarangayResult<ExternalIdentityId> {
        let account = self
            .accounts
            .create(CreateAccount {
                email: email.to_string(),
                display_name: display_name.to_string(),
                password: password.to_string(),
            })
            .await
            .map_err(|e| match e {
                e @ BarangayError::AlreadyExists { .. } => e,
                other => BarangayError::AuthProvider(other.to_string()),
            })?;

        Ok(ExternalIdentityId(account.id.to_string()))
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> BarangayResult<Option<ExternalIdentityId>> {
        let email = email.trim().to_lowercase();
        let account = match self.accounts.get_by_email(&email).await {
            Ok(account) => account,
            Err(BarangayError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let valid =
            password::verify_password(password, &account.password_hash, self.config.pepper.as_deref())?;
        Ok(valid.then(|| ExternalIdentityId(account.id.to_string())))
    }

    async fn verify_credentials(
        &self,
        credentials: &RequestCredentials,
    ) -> BarangayResult<Option<ExternalIdentityId>> {
        let Some(bearer) = credentials.bearer_token.as_deref() else {
            return Ok(None);
        };

        match token::decode_access_token(bearer, &self.config) {
            Ok(claims) => Ok(Some(ExternalIdentityId(claims.sub))),
            Err(AuthError::Crypto(msg)) => Err(BarangayError::AuthProvider(msg)),
            Err(e) => {
                debug!(error = %e, "Rejected bearer token");
                Ok(None)
            }
        }
    }

    async fn issue_session(&self, identity: &ExternalIdentityId) -> BarangayResult<SessionToken> {
        self.token_for(identity.as_str())
    }
}
