//! Invitation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Consumed,
    Expired,
}

/// A single-use offer to onboard `email` with a fixed role and barangay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invitation {
    pub code: String,
    /// Lower-cased target email.
    pub email: String,
    pub role: Role,
    /// Barangay the invitee joins; `None` for captain invitations.
    pub tenant_id: Option<Uuid>,
    pub status: InvitationStatus,
    pub created_by: Uuid,
    /// Principal provisioned when the code was redeemed.
    pub consumed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// `true` while the code may still be redeemed.
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && now < self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitation {
    pub code: String,
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    pub created_by: Uuid,
    pub expires_at: DateTime<Utc>,
}
