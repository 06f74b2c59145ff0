//! SurrealDB implementation of [`TenantRepository`].

use barangay_core::error::{BarangayError, BarangayResult};
use barangay_core::models::tenant::{CreateTenant, Tenant, UpdateTenant};
use barangay_core::repository::TenantRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    address: String,
    contact_number: Option<String>,
    contact_email: Option<String>,
    owner_principal_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        Ok(Tenant {
            id,
            name: self.name,
            address: self.address,
            contact_number: self.contact_number,
            contact_email: self.contact_email,
            owner_principal_id: parse_uuid(&self.owner_principal_id, "owner principal")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    name: String,
    address: String,
    contact_number: Option<String>,
    contact_email: Option<String>,
    owner_principal_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = parse_uuid(&self.record_id, "tenant")?;
        TenantRow {
            name: self.name,
            address: self.address,
            contact_number: self.contact_number,
            contact_email: self.contact_email,
            owner_principal_id: self.owner_principal_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_tenant(id)
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create_for_owner(&self, owner_id: Uuid, input: CreateTenant) -> BarangayResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let owner_str = owner_id.to_string();

        // The tenant row and the owner's binding commit together. The
        // unique index on owner_principal_id rejects a second barangay
        // for the same captain, including under concurrent submissions.
        let outcome = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('tenant', $id) SET \
                 name = $name, address = $address, \
                 contact_number = $contact_number, \
                 contact_email = $contact_email, \
                 owner_principal_id = $owner_id; \
                 UPDATE type::record('principal', $owner_id) SET \
                 tenant_id = $id, updated_at = time::now(); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .bind(("owner_id", owner_str))
            .bind(("name", input.name))
            .bind(("address", input.address))
            .bind(("contact_number", input.contact_number))
            .bind(("contact_email", input.contact_email))
            .await
            .map_err(DbError::from)
            .and_then(|response| response.check().map_err(|e| DbError::Query(e.to_string())));

        if let Err(err) = outcome {
            debug!(owner_id = %owner_id, error = %err, "Tenant creation rejected");
            return match self.get_by_owner(owner_id).await {
                Ok(existing) => Err(BarangayError::AlreadyExists {
                    entity: "tenant".into(),
                    id: existing.id.to_string(),
                }),
                Err(_) => Err(err.into()),
            };
        }

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> BarangayResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_owner(&self, owner_id: Uuid) -> BarangayResult<Tenant> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE owner_principal_id = $owner_id",
            )
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("owner={owner_id}"),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> BarangayResult<Tenant> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.address.is_some() {
            sets.push("address = $address");
        }
        if input.contact_number.is_some() {
            sets.push("contact_number = $contact_number");
        }
        if input.contact_email.is_some() {
            sets.push("contact_email = $contact_email");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('tenant', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(address) = input.address {
            builder = builder.bind(("address", address));
        }
        if let Some(contact_number) = input.contact_number {
            builder = builder.bind(("contact_number", contact_number));
        }
        if let Some(contact_email) = input.contact_email {
            builder = builder.bind(("contact_email", contact_email));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }
}
