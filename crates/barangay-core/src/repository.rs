//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Principals, barangays and
//! invitations live in global tables; isolation is enforced by the
//! ownership checks in the services that call these traits.

use uuid::Uuid;

use crate::error::BarangayResult;
use crate::models::{
    account::{CreateAccount, IdentityAccount},
    invitation::{CreateInvitation, Invitation},
    principal::{CreatePrincipal, NewMember, Principal},
    role::Role,
    tenant::{CreateTenant, Tenant, UpdateTenant},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Result of a successful invitation redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub invitation: Invitation,
    pub principal: Principal,
}

// ---------------------------------------------------------------------------
// Identity-provider storage
// ---------------------------------------------------------------------------

pub trait AccountRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the email is taken.
    fn create(
        &self,
        input: CreateAccount,
    ) -> impl Future<Output = BarangayResult<IdentityAccount>> + Send;
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = BarangayResult<IdentityAccount>> + Send;
}

// ---------------------------------------------------------------------------
// Principals
// ---------------------------------------------------------------------------

pub trait PrincipalRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePrincipal,
    ) -> impl Future<Output = BarangayResult<Principal>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = BarangayResult<Principal>> + Send;
    fn get_by_identity(
        &self,
        identity_id: &str,
    ) -> impl Future<Output = BarangayResult<Principal>> + Send;
    fn get_by_email(&self, email: &str)
    -> impl Future<Output = BarangayResult<Principal>> + Send;
    /// Deactivation only; principals are never deleted.
    fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> impl Future<Output = BarangayResult<Principal>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = BarangayResult<PaginatedResult<Principal>>> + Send;
    fn list_by_role(
        &self,
        role: Role,
        pagination: Pagination,
    ) -> impl Future<Output = BarangayResult<PaginatedResult<Principal>>> + Send;
}

// ---------------------------------------------------------------------------
// Barangays
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    /// Create a barangay owned by `owner_id` and bind the owner to it in
    /// one atomic step.
    ///
    /// Owner uniqueness is enforced by the store, not by a prior read:
    /// if the owner already has a barangay this fails with
    /// `AlreadyExists` carrying the existing barangay's id.
    fn create_for_owner(
        &self,
        owner_id: Uuid,
        input: CreateTenant,
    ) -> impl Future<Output = BarangayResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = BarangayResult<Tenant>> + Send;
    fn get_by_owner(
        &self,
        owner_id: Uuid,
    ) -> impl Future<Output = BarangayResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = BarangayResult<Tenant>> + Send;
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

pub trait InvitationRepository: Send + Sync {
    /// Persist a new pending invitation, marking any pending invitation
    /// for the same `(email, tenant_id)` as expired.
    ///
    /// Fails with `AlreadyExists` if the code is already taken.
    fn create_superseding(
        &self,
        input: CreateInvitation,
    ) -> impl Future<Output = BarangayResult<Invitation>> + Send;
    fn get_by_code(&self, code: &str) -> impl Future<Output = BarangayResult<Invitation>> + Send;
    /// Atomically flip a pending, unexpired invitation to consumed and
    /// create the principal it grants, with role and tenant taken from
    /// the invitation.
    ///
    /// Of any number of concurrent calls for one code at most one
    /// succeeds; the rest fail with `AlreadyConsumed`, `Expired` or
    /// `NotFound`.
    fn consume(
        &self,
        code: &str,
        member: NewMember,
    ) -> impl Future<Output = BarangayResult<Redemption>> + Send;
    /// Mark a pending invitation expired. Fails with `Expired` when it is
    /// no longer pending.
    fn revoke(&self, code: &str) -> impl Future<Output = BarangayResult<Invitation>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Option<Uuid>,
    ) -> impl Future<Output = BarangayResult<Vec<Invitation>>> + Send;
}
