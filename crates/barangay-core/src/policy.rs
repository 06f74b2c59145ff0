//! Role policy: who may invite whom, and which pages each role sees.
//!
//! This is the single table consulted for grant and page-access
//! decisions. Everything here is pure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::role::Role;

/// UI page identifiers guarded by the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Dashboard,
    Residents,
    Clearances,
    Blotter,
    Financial,
    Documents,
    Reports,
    Settings,
    Barangays,
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Residents => "residents",
            Page::Clearances => "clearances",
            Page::Blotter => "blotter",
            Page::Financial => "financial",
            Page::Documents => "documents",
            Page::Reports => "reports",
            Page::Settings => "settings",
            Page::Barangays => "barangays",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page shown to principals whose role grants nothing else.
pub const FALLBACK_PAGE: Page = Page::Dashboard;

const CAPTAIN_GRANTS: &[Role] = &[
    Role::Secretary,
    Role::Treasurer,
    Role::Staff,
    Role::PeaceOrderOfficer,
    Role::HealthOfficer,
    Role::SocialWorker,
];

/// Roles `role` may grant through an invitation. An empty slice means
/// the role has no invitation permission.
pub fn grantable_roles(role: Role) -> &'static [Role] {
    match role {
        Role::Superadmin => &[Role::BarangayCaptain],
        Role::BarangayCaptain => CAPTAIN_GRANTS,
        Role::Secretary => &[Role::Staff],
        Role::Treasurer
        | Role::Staff
        | Role::PeaceOrderOfficer
        | Role::HealthOfficer
        | Role::SocialWorker => &[],
    }
}

pub fn can_grant(grantor: Role, requested: Role) -> bool {
    grantable_roles(grantor).contains(&requested)
}

/// Ordered pages `role` may open. Never empty; the first entry is the
/// landing page.
pub fn accessible_pages(role: Role) -> &'static [Page] {
    match role {
        Role::Superadmin => &[Page::Barangays, Page::Settings],
        Role::BarangayCaptain => &[
            Page::Dashboard,
            Page::Residents,
            Page::Clearances,
            Page::Blotter,
            Page::Financial,
            Page::Documents,
            Page::Reports,
            Page::Settings,
        ],
        Role::Secretary => &[
            Page::Dashboard,
            Page::Residents,
            Page::Clearances,
            Page::Blotter,
            Page::Documents,
            Page::Reports,
            Page::Settings,
        ],
        Role::Treasurer => &[Page::Dashboard, Page::Financial, Page::Reports],
        Role::Staff => &[
            Page::Dashboard,
            Page::Residents,
            Page::Clearances,
            Page::Documents,
        ],
        Role::PeaceOrderOfficer => &[Page::Dashboard, Page::Blotter, Page::Residents],
        Role::HealthOfficer => &[Page::Dashboard, Page::Residents],
        Role::SocialWorker => &[Page::Dashboard, Page::Residents, Page::Clearances],
    }
}

pub fn has_page_access(role: Role, page: Page) -> bool {
    accessible_pages(role).contains(&page)
}

pub fn default_page(role: Role) -> Page {
    accessible_pages(role)
        .first()
        .copied()
        .unwrap_or(FALLBACK_PAGE)
}
