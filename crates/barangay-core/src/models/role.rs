//! Role domain model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BarangayError;

/// Closed set of roles a principal can hold.
///
/// `PeaceOrderOfficer`, `HealthOfficer` and `SocialWorker` are member
/// roles: they share `Staff`'s grant scope (none) and differ only in
/// which pages they see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    BarangayCaptain,
    Secretary,
    Treasurer,
    Staff,
    PeaceOrderOfficer,
    HealthOfficer,
    SocialWorker,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Superadmin,
        Role::BarangayCaptain,
        Role::Secretary,
        Role::Treasurer,
        Role::Staff,
        Role::PeaceOrderOfficer,
        Role::HealthOfficer,
        Role::SocialWorker,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::BarangayCaptain => "barangay_captain",
            Role::Secretary => "secretary",
            Role::Treasurer => "treasurer",
            Role::Staff => "staff",
            Role::PeaceOrderOfficer => "peace_order_officer",
            Role::HealthOfficer => "health_officer",
            Role::SocialWorker => "social_worker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BarangayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| BarangayError::validation(format!("unknown role: {s}")))
    }
}
