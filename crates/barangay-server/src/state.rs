//! Shared application state: every service wired to one SurrealDB client.

use std::sync::Arc;

use barangay_auth::{
    AuthConfig, InvitationConfig, InvitationLedger, LocalIdentityProvider, MemberDirectory,
    OnboardingFlow, SessionGateway, TenantResolver,
};
use barangay_db::repository::{
    SurrealAccountRepository, SurrealInvitationRepository, SurrealPrincipalRepository,
    SurrealTenantRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

pub type Identity = LocalIdentityProvider<SurrealAccountRepository<Any>>;

pub struct Services {
    pub identity: Identity,
    pub principals: SurrealPrincipalRepository<Any>,
    pub invitations: InvitationLedger<SurrealInvitationRepository<Any>>,
    pub tenants: TenantResolver<SurrealTenantRepository<Any>>,
    pub sessions: SessionGateway<Identity, SurrealPrincipalRepository<Any>, SurrealTenantRepository<Any>>,
    pub onboarding:
        OnboardingFlow<SurrealInvitationRepository<Any>, Identity, SurrealPrincipalRepository<Any>>,
    pub members: MemberDirectory<SurrealPrincipalRepository<Any>>,
}

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
}

impl AppState {
    pub fn new(db: Surreal<Any>, auth: &AuthConfig, invitations: &InvitationConfig) -> Self {
        let accounts = match &auth.pepper {
            Some(pepper) => SurrealAccountRepository::with_pepper(db.clone(), pepper.clone()),
            None => SurrealAccountRepository::new(db.clone()),
        };
        let identity = LocalIdentityProvider::new(accounts, auth.clone());
        let principals = SurrealPrincipalRepository::new(db.clone());
        let tenants = SurrealTenantRepository::new(db.clone());
        let invitation_repo = SurrealInvitationRepository::new(db);

        let services = Services {
            identity: identity.clone(),
            principals: principals.clone(),
            invitations: InvitationLedger::new(invitation_repo.clone(), invitations.clone()),
            tenants: TenantResolver::new(tenants.clone()),
            sessions: SessionGateway::new(identity.clone(), principals.clone(), tenants),
            onboarding: OnboardingFlow::new(
                InvitationLedger::new(invitation_repo, invitations.clone()),
                identity,
                principals.clone(),
                auth.min_password_length,
            ),
            members: MemberDirectory::new(principals),
        };

        Self {
            services: Arc::new(services),
        }
    }
}
