//! SurrealDB repository implementations.

mod account;
mod invitation;
mod principal;
mod tenant;

pub use account::SurrealAccountRepository;
pub use invitation::SurrealInvitationRepository;
pub use principal::SurrealPrincipalRepository;
pub use tenant::SurrealTenantRepository;

use barangay_core::models::role::Role;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_opt_uuid(raw: Option<&str>, what: &str) -> Result<Option<Uuid>, DbError> {
    raw.map(|r| parse_uuid(r, what)).transpose()
}

fn parse_role(raw: &str) -> Result<Role, DbError> {
    raw.parse()
        .map_err(|_| DbError::Decode(format!("unknown role: {raw}")))
}
