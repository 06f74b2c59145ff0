//! Session gateway: request credentials to a resolved [`Principal`].

use barangay_core::error::{BarangayError, BarangayResult};
use barangay_core::identity::{IdentityProvider, RequestCredentials};
use barangay_core::models::principal::Principal;
use barangay_core::models::tenant::TenantResolution;
use barangay_core::policy::{self, Page};
use barangay_core::repository::{PrincipalRepository, TenantRepository};
use serde::Serialize;
use tracing::debug;

use crate::tenant::TenantResolver;

/// Everything the UI needs after a successful session check.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub principal: Principal,
    pub tenant: TenantResolution,
    pub pages: Vec<Page>,
    pub default_page: Page,
}

pub struct SessionGateway<I, P, T>
where
    I: IdentityProvider,
    P: PrincipalRepository,
    T: TenantRepository,
{
    identity: I,
    principals: P,
    resolver: TenantResolver<T>,
}

impl<I, P, T> SessionGateway<I, P, T>
where
    I: IdentityProvider,
    P: PrincipalRepository,
    T: TenantRepository,
{
    pub fn new(identity: I, principals: P, tenants: T) -> Self {
        Self {
            identity,
            principals,
            resolver: TenantResolver::new(tenants),
        }
    }

    /// Resolve the principal behind `credentials`. Read-only: a verified
    /// identity with no principal record is rejected, never created.
    pub async fn resolve_principal(
        &self,
        credentials: &RequestCredentials,
    ) -> BarangayResult<Principal> {
        if credentials.is_empty() {
            return Err(BarangayError::Unauthenticated);
        }
        let Some(identity) = self.identity.verify_credentials(credentials).await? else {
            return Err(BarangayError::Unauthenticated);
        };

        let principal = match self.principals.get_by_identity(identity.as_str()).await {
            Ok(principal) => principal,
            Err(BarangayError::NotFound { .. }) => {
                debug!(identity = %identity, "No principal for verified identity");
                return Err(BarangayError::Unauthenticated);
            }
            Err(e) => return Err(e),
        };

        if !principal.active {
            return Err(BarangayError::AccountInactive);
        }
        Ok(principal)
    }

    pub async fn resolve_session(
        &self,
        credentials: &RequestCredentials,
    ) -> BarangayResult<SessionContext> {
        let principal = self.resolve_principal(credentials).await?;
        let tenant = self.resolver.resolve_tenant(&principal).await?;
        let pages = policy::accessible_pages(principal.role).to_vec();
        let default_page = policy::default_page(principal.role);
        Ok(SessionContext {
            principal,
            tenant,
            pages,
            default_page,
        })
    }
}
