//! Tenant (barangay) domain model.
//!
//! A barangay is the unit of data isolation. Every tenant-scoped
//! principal is bound to exactly one; each captain owns at most one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub contact_number: Option<String>,
    pub contact_email: Option<String>,
    /// The captain who created the barangay.
    pub owner_principal_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a captain when setting up their barangay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub address: String,
    pub contact_number: Option<String>,
    pub contact_email: Option<String>,
}

/// Fields that can be updated on an existing barangay.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub address: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub contact_number: Option<Option<String>>,
    pub contact_email: Option<Option<String>>,
}

/// Outcome of resolving a principal's tenant binding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TenantResolution {
    Resolved { tenant: Tenant },
    /// No barangay bound yet. `can_create` is `true` for captains, who
    /// set one up themselves, and `false` for roles awaiting assignment.
    PendingSetup { can_create: bool },
    /// Superadmins operate across barangays.
    NotApplicable,
}
