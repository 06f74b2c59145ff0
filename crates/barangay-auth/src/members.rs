//! Member directory: listing and (de)activating onboarded principals.

use barangay_core::error::{BarangayError, BarangayResult};
use barangay_core::models::principal::Principal;
use barangay_core::models::role::Role;
use barangay_core::policy;
use barangay_core::repository::{PaginatedResult, Pagination, PrincipalRepository};
use tracing::info;
use uuid::Uuid;

pub struct MemberDirectory<P: PrincipalRepository> {
    principals: P,
}

impl<P: PrincipalRepository> MemberDirectory<P> {
    pub fn new(principals: P) -> Self {
        Self { principals }
    }

    /// Superadmins see every captain; tenant-bound grantors see their
    /// barangay's members.
    pub async fn list_members(
        &self,
        actor: &Principal,
        pagination: Pagination,
    ) -> BarangayResult<PaginatedResult<Principal>> {
        if policy::grantable_roles(actor.role).is_empty() {
            return Err(BarangayError::forbidden(format!(
                "{} may not view the member directory",
                actor.role
            )));
        }
        if actor.role == Role::Superadmin {
            return self
                .principals
                .list_by_role(Role::BarangayCaptain, pagination)
                .await;
        }
        let Some(tenant_id) = actor.tenant_id else {
            return Err(BarangayError::PrerequisiteMissing {
                reason: "set up your barangay before managing members".into(),
            });
        };
        self.principals.list_by_tenant(tenant_id, pagination).await
    }

    /// Activate or deactivate a principal the actor could have invited.
    pub async fn set_active(
        &self,
        actor: &Principal,
        target_id: Uuid,
        active: bool,
    ) -> BarangayResult<Principal> {
        if actor.id == target_id {
            return Err(BarangayError::forbidden("cannot change your own status"));
        }
        let target = self.principals.get_by_id(target_id).await?;
        if !policy::can_grant(actor.role, target.role) {
            return Err(BarangayError::forbidden(format!(
                "{} may not manage {}",
                actor.role, target.role
            )));
        }
        if actor.role != Role::Superadmin && actor.tenant_id != target.tenant_id {
            return Err(BarangayError::forbidden("member belongs to another barangay"));
        }

        let updated = self.principals.set_active(target_id, active).await?;
        info!(actor = %actor.id, target = %target_id, active, "Member status changed");
        Ok(updated)
    }
}
