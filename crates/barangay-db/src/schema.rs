//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "onboarding_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Identity-provider accounts
-- =======================================================================
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD email ON TABLE account TYPE string;
DEFINE FIELD display_name ON TABLE account TYPE string;
DEFINE FIELD password_hash ON TABLE account TYPE string;
DEFINE FIELD created_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_account_email ON TABLE account COLUMNS email UNIQUE;

-- =======================================================================
-- Principals
-- =======================================================================
DEFINE TABLE principal SCHEMAFULL;
DEFINE FIELD identity_id ON TABLE principal TYPE string;
DEFINE FIELD email ON TABLE principal TYPE string;
DEFINE FIELD display_name ON TABLE principal TYPE string;
DEFINE FIELD role ON TABLE principal TYPE string \
    ASSERT $value IN ['superadmin', 'barangay_captain', 'secretary', \
    'treasurer', 'staff', 'peace_order_officer', 'health_officer', \
    'social_worker'];
DEFINE FIELD tenant_id ON TABLE principal TYPE option<string>;
DEFINE FIELD active ON TABLE principal TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE principal TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE principal TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_principal_identity ON TABLE principal \
    COLUMNS identity_id UNIQUE;
DEFINE INDEX idx_principal_email ON TABLE principal COLUMNS email;
DEFINE INDEX idx_principal_tenant ON TABLE principal COLUMNS tenant_id;

-- =======================================================================
-- Barangays (tenants)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD address ON TABLE tenant TYPE string;
DEFINE FIELD contact_number ON TABLE tenant TYPE option<string>;
DEFINE FIELD contact_email ON TABLE tenant TYPE option<string>;
DEFINE FIELD owner_principal_id ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_owner ON TABLE tenant \
    COLUMNS owner_principal_id UNIQUE;

-- =======================================================================
-- Invitations
-- =======================================================================
DEFINE TABLE invitation SCHEMAFULL;
DEFINE FIELD code ON TABLE invitation TYPE string;
DEFINE FIELD email ON TABLE invitation TYPE string;
DEFINE FIELD role ON TABLE invitation TYPE string \
    ASSERT $value IN ['barangay_captain', 'secretary', 'treasurer', \
    'staff', 'peace_order_officer', 'health_officer', 'social_worker'];
DEFINE FIELD tenant_id ON TABLE invitation TYPE option<string>;
DEFINE FIELD status ON TABLE invitation TYPE string \
    ASSERT $value IN ['pending', 'consumed', 'expired'];
DEFINE FIELD created_by ON TABLE invitation TYPE string;
DEFINE FIELD consumed_by ON TABLE invitation TYPE option<string>;
DEFINE FIELD created_at ON TABLE invitation TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD expires_at ON TABLE invitation TYPE datetime;
DEFINE FIELD consumed_at ON TABLE invitation TYPE option<datetime>;
DEFINE INDEX idx_invitation_code ON TABLE invitation COLUMNS code UNIQUE;
DEFINE INDEX idx_invitation_target ON TABLE invitation \
    COLUMNS email, tenant_id;
";

/// Run all pending migrations against the given SurrealDB instance.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_every_table() {
        for table in ["account", "principal", "tenant", "invitation"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing {table}"
            );
        }
    }

    #[test]
    fn owner_and_code_indexes_are_unique() {
        assert!(SCHEMA_V1.contains("COLUMNS owner_principal_id UNIQUE"));
        assert!(SCHEMA_V1.contains("COLUMNS code UNIQUE"));
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
