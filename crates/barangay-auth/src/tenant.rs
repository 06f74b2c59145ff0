//! Tenant resolver: which barangay a principal's data operations are
//! scoped to, and first-time barangay setup by a captain.

use barangay_core::error::{BarangayError, BarangayResult};
use barangay_core::models::principal::Principal;
use barangay_core::models::role::Role;
use barangay_core::models::tenant::{CreateTenant, Tenant, TenantResolution, UpdateTenant};
use barangay_core::repository::TenantRepository;
use tracing::info;
use uuid::Uuid;

pub struct TenantResolver<T: TenantRepository> {
    tenants: T,
}

impl<T: TenantRepository> TenantResolver<T> {
    pub fn new(tenants: T) -> Self {
        Self { tenants }
    }

    pub async fn resolve_tenant(&self, principal: &Principal) -> BarangayResult<TenantResolution> {
        if principal.role == Role::Superadmin {
            return Ok(TenantResolution::NotApplicable);
        }
        match principal.tenant_id {
            Some(tenant_id) => {
                let tenant = self.tenants.get_by_id(tenant_id).await?;
                Ok(TenantResolution::Resolved { tenant })
            }
            None => Ok(TenantResolution::PendingSetup {
                can_create: principal.role == Role::BarangayCaptain,
            }),
        }
    }

    /// Set up the captain's barangay and bind the captain to it.
    ///
    /// A captain that already owns a barangay gets `AlreadyExists` with
    /// the existing id, including when two requests race.
    pub async fn create_tenant(
        &self,
        principal: &Principal,
        input: CreateTenant,
    ) -> BarangayResult<Tenant> {
        if principal.role != Role::BarangayCaptain {
            return Err(BarangayError::forbidden(
                "only a barangay captain can set up a barangay",
            ));
        }
        if let Some(existing) = principal.tenant_id {
            return Err(BarangayError::AlreadyExists {
                entity: "tenant".into(),
                id: existing.to_string(),
            });
        }

        let input = CreateTenant {
            name: required(&input.name, "name")?,
            address: required(&input.address, "address")?,
            contact_number: optional(input.contact_number),
            contact_email: optional(input.contact_email),
        };

        let tenant = self.tenants.create_for_owner(principal.id, input).await?;
        info!(tenant_id = %tenant.id, owner = %principal.id, "Barangay created");
        Ok(tenant)
    }

    pub async fn update_tenant(
        &self,
        principal: &Principal,
        tenant_id: Uuid,
        input: UpdateTenant,
    ) -> BarangayResult<Tenant> {
        if principal.tenant_id != Some(tenant_id) {
            return Err(BarangayError::forbidden(
                "cannot modify another barangay",
            ));
        }
        if principal.role != Role::BarangayCaptain {
            return Err(BarangayError::forbidden(
                "only the barangay captain can edit barangay details",
            ));
        }

        let input = UpdateTenant {
            name: input.name.as_deref().map(|n| required(n, "name")).transpose()?,
            address: input
                .address
                .as_deref()
                .map(|a| required(a, "address"))
                .transpose()?,
            contact_number: input.contact_number.map(optional),
            contact_email: input.contact_email.map(optional),
        };
        self.tenants.update(tenant_id, input).await
    }
}

fn required(value: &str, field: &str) -> BarangayResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BarangayError::validation(format!("{field} must not be empty")));
    }
    Ok(value.to_owned())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
