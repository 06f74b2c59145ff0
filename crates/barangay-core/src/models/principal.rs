//! Principal domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// An onboarded actor: an identity-provider account bound to a role and,
/// for tenant-scoped roles, a barangay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    /// Stable id issued by the identity provider.
    pub identity_id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// `None` until the principal is bound to a barangay.
    pub tenant_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrincipal {
    pub identity_id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
}

/// Account details recorded when an invitation is redeemed. Role and
/// tenant come from the invitation itself, never from the redeemer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
    pub identity_id: String,
    pub email: String,
    pub display_name: String,
}
