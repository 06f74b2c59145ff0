//! First-run creation of the superadmin principal.

use barangay_core::error::{BarangayError, BarangayResult};
use barangay_core::identity::IdentityProvider;
use barangay_core::models::principal::{CreatePrincipal, Principal};
use barangay_core::models::role::Role;
use barangay_core::repository::PrincipalRepository;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::invitation::normalize_email;

/// Credentials for the initial superadmin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub email: String,
    pub password: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
}

fn default_display_name() -> String {
    "Superadmin".into()
}

/// Ensure a superadmin principal exists for `config.email`.
///
/// Returns the existing principal when there is one. No invitation can
/// grant the superadmin role, so this is the only way to create one.
pub async fn ensure_superadmin<I, P>(
    identity: &I,
    principals: &P,
    config: &BootstrapConfig,
) -> BarangayResult<Principal>
where
    I: IdentityProvider,
    P: PrincipalRepository,
{
    let email = normalize_email(&config.email)?;

    match principals.get_by_email(&email).await {
        Ok(existing) if existing.role == Role::Superadmin => return Ok(existing),
        Ok(existing) => {
            return Err(BarangayError::AlreadyExists {
                entity: "principal".into(),
                id: existing.id.to_string(),
            });
        }
        Err(BarangayError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    let identity_id = match identity
        .provision_account(&email, &config.password, &config.display_name)
        .await
    {
        Ok(identity_id) => identity_id,
        // An earlier start provisioned the account but stopped before
        // the principal was stored.
        Err(err @ BarangayError::AlreadyExists { .. }) => identity
            .authenticate(&email, &config.password)
            .await?
            .ok_or(err)?,
        Err(e) => return Err(e),
    };
    let principal = principals
        .create(CreatePrincipal {
            identity_id: identity_id.to_string(),
            email,
            display_name: config.display_name.clone(),
            role: Role::Superadmin,
            tenant_id: None,
        })
        .await?;

    info!(principal_id = %principal.id, "Superadmin bootstrapped");
    Ok(principal)
}
