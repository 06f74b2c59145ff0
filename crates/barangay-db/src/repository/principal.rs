//! SurrealDB implementation of [`PrincipalRepository`].

use barangay_core::error::BarangayResult;
use barangay_core::models::principal::{CreatePrincipal, Principal};
use barangay_core::models::role::Role;
use barangay_core::repository::{PaginatedResult, Pagination, PrincipalRepository};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_opt_uuid, parse_role, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PrincipalRow {
    identity_id: String,
    email: String,
    display_name: String,
    role: String,
    tenant_id: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PrincipalRow {
    fn into_principal(self, id: Uuid) -> Result<Principal, DbError> {
        Ok(Principal {
            id,
            identity_id: self.identity_id,
            email: self.email,
            display_name: self.display_name,
            role: parse_role(&self.role)?,
            tenant_id: parse_opt_uuid(self.tenant_id.as_deref(), "tenant")?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PrincipalRowWithId {
    record_id: String,
    identity_id: String,
    email: String,
    display_name: String,
    role: String,
    tenant_id: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PrincipalRowWithId {
    fn try_into_principal(self) -> Result<Principal, DbError> {
        let id = parse_uuid(&self.record_id, "principal")?;
        PrincipalRow {
            identity_id: self.identity_id,
            email: self.email,
            display_name: self.display_name,
            role: self.role,
            tenant_id: self.tenant_id,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_principal(id)
    }
}

/// SurrealDB implementation of the Principal repository.
#[derive(Clone)]
pub struct SurrealPrincipalRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPrincipalRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_one(&self, field: &'static str, value: &str) -> BarangayResult<Principal> {
        let query = format!("SELECT meta::id(id) AS record_id, * FROM principal WHERE {field} = $value");

        let mut result = self
            .db
            .query(query)
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: format!("{field}={value}"),
        })?;

        Ok(row.try_into_principal()?)
    }

    async fn list_where(
        &self,
        field: &'static str,
        value: String,
        pagination: Pagination,
    ) -> BarangayResult<PaginatedResult<Principal>> {
        let count_query =
            format!("SELECT count() AS total FROM principal WHERE {field} = $value GROUP ALL");
        let mut count_result = self
            .db
            .query(count_query)
            .bind(("value", value.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let list_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM principal \
             WHERE {field} = $value \
             ORDER BY created_at ASC \
             LIMIT $limit START $offset"
        );
        let mut result = self
            .db
            .query(list_query)
            .bind(("value", value))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_principal())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

impl<C: Connection> PrincipalRepository for SurrealPrincipalRepository<C> {
    async fn create(&self, input: CreatePrincipal) -> BarangayResult<Principal> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('principal', $id) SET \
                 identity_id = $identity_id, \
                 email = $email, \
                 display_name = $display_name, \
                 role = $role, \
                 tenant_id = $tenant_id, \
                 active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("identity_id", input.identity_id))
            .bind(("email", input.email))
            .bind(("display_name", input.display_name))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("tenant_id", input.tenant_id.map(|t| t.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> BarangayResult<Principal> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('principal', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn get_by_identity(&self, identity_id: &str) -> BarangayResult<Principal> {
        self.select_one("identity_id", identity_id).await
    }

    async fn get_by_email(&self, email: &str) -> BarangayResult<Principal> {
        self.select_one("email", email).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> BarangayResult<Principal> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('principal', $id) SET \
                 active = $active, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> BarangayResult<PaginatedResult<Principal>> {
        self.list_where("tenant_id", tenant_id.to_string(), pagination)
            .await
    }

    async fn list_by_role(
        &self,
        role: Role,
        pagination: Pagination,
    ) -> BarangayResult<PaginatedResult<Principal>> {
        self.list_where("role", role.as_str().to_string(), pagination)
            .await
    }
}
