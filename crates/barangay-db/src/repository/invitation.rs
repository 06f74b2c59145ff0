//! SurrealDB implementation of [`InvitationRepository`].
//!
//! Invitations are keyed by their code (`invitation:<CODE>`), so the
//! record id itself guards against code collisions and every state
//! change is a conditional update on a single record.

use barangay_core::error::{BarangayError, BarangayResult};
use barangay_core::models::invitation::{CreateInvitation, Invitation, InvitationStatus};
use barangay_core::models::principal::NewMember;
use barangay_core::repository::{InvitationRepository, PrincipalRepository, Redemption};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{SurrealPrincipalRepository, parse_opt_uuid, parse_role, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct InvitationRow {
    code: String,
    email: String,
    role: String,
    tenant_id: Option<String>,
    status: String,
    created_by: String,
    consumed_by: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    consumed_at: Option<DateTime<Utc>>,
}

fn parse_status(s: &str) -> Result<InvitationStatus, DbError> {
    match s {
        "pending" => Ok(InvitationStatus::Pending),
        "consumed" => Ok(InvitationStatus::Consumed),
        "expired" => Ok(InvitationStatus::Expired),
        other => Err(DbError::Decode(format!("unknown invitation status: {other}"))),
    }
}

impl InvitationRow {
    fn try_into_invitation(self) -> Result<Invitation, DbError> {
        Ok(Invitation {
            role: parse_role(&self.role)?,
            tenant_id: parse_opt_uuid(self.tenant_id.as_deref(), "tenant")?,
            status: parse_status(&self.status)?,
            created_by: parse_uuid(&self.created_by, "grantor")?,
            consumed_by: parse_opt_uuid(self.consumed_by.as_deref(), "consumer")?,
            code: self.code,
            email: self.email,
            created_at: self.created_at,
            expires_at: self.expires_at,
            consumed_at: self.consumed_at,
        })
    }
}

/// `tenant_id` filter; captain invitations carry no tenant.
fn tenant_filter(tenant_id: Option<Uuid>) -> &'static str {
    if tenant_id.is_some() {
        "tenant_id = $tenant_id"
    } else {
        "tenant_id = NONE"
    }
}

/// SurrealDB implementation of the Invitation repository.
#[derive(Clone)]
pub struct SurrealInvitationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInvitationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Explain why a conditional update on `code` matched nothing.
    async fn classify_unavailable(&self, code: &str, cause: Option<DbError>) -> BarangayError {
        match self.get_by_code(code).await {
            Ok(invitation) if invitation.status == InvitationStatus::Consumed => {
                BarangayError::AlreadyConsumed
            }
            Ok(invitation) if !invitation.is_redeemable_at(Utc::now()) => BarangayError::Expired,
            Ok(_) => match cause {
                Some(err) => err.into(),
                None => BarangayError::Internal(format!(
                    "invitation {code} is pending but the update matched nothing"
                )),
            },
            Err(err) => err,
        }
    }
}

impl<C: Connection> InvitationRepository for SurrealInvitationRepository<C> {
    async fn create_superseding(&self, input: CreateInvitation) -> BarangayResult<Invitation> {
        let code = input.code.clone();
        let query = format!(
            "BEGIN TRANSACTION; \
             UPDATE invitation SET status = 'expired' \
             WHERE email = $email AND {} AND status = 'pending'; \
             CREATE type::record('invitation', $code) SET \
             code = $code, email = $email, role = $role, \
             tenant_id = $tenant_id, status = 'pending', \
             created_by = $created_by, consumed_by = NONE, \
             expires_at = $expires_at, consumed_at = NONE; \
             COMMIT TRANSACTION;",
            tenant_filter(input.tenant_id)
        );

        let outcome = self
            .db
            .query(query)
            .bind(("code", input.code))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("tenant_id", input.tenant_id.map(|t| t.to_string())))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)
            .and_then(|response| response.check().map_err(|e| DbError::Query(e.to_string())));

        if let Err(err) = outcome {
            return match self.get_by_code(&code).await {
                Ok(_) => Err(BarangayError::AlreadyExists {
                    entity: "invitation".into(),
                    id: code,
                }),
                Err(_) => Err(err.into()),
            };
        }

        self.get_by_code(&code).await
    }

    async fn get_by_code(&self, code: &str) -> BarangayResult<Invitation> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('invitation', $code)")
            .bind(("code", code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "invitation".into(),
            id: code.to_string(),
        })?;

        Ok(row.try_into_invitation()?)
    }

    async fn consume(&self, code: &str, member: NewMember) -> BarangayResult<Redemption> {
        let principal_id = Uuid::new_v4();

        // Check-and-set on the invitation and creation of the principal
        // it grants commit together or not at all. Role and tenant are
        // copied from the claimed invitation inside the transaction.
        let outcome = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 LET $claimed = (UPDATE type::record('invitation', $code) SET \
                 status = 'consumed', consumed_by = $principal_id, \
                 consumed_at = time::now() \
                 WHERE status = 'pending' AND expires_at > time::now() \
                 RETURN AFTER); \
                 IF array::len($claimed) = 0 { THROW 'invitation unavailable' }; \
                 CREATE type::record('principal', $principal_id) SET \
                 identity_id = $identity_id, email = $email, \
                 display_name = $display_name, \
                 role = $claimed[0].role, \
                 tenant_id = $claimed[0].tenant_id, \
                 active = true; \
                 COMMIT TRANSACTION;",
            )
            .bind(("code", code.to_string()))
            .bind(("principal_id", principal_id.to_string()))
            .bind(("identity_id", member.identity_id))
            .bind(("email", member.email))
            .bind(("display_name", member.display_name))
            .await
            .map_err(DbError::from)
            .and_then(|response| response.check().map_err(|e| DbError::Query(e.to_string())));

        if let Err(err) = outcome {
            debug!(error = %err, "Invitation consumption rejected");
            return Err(self.classify_unavailable(code, Some(err)).await);
        }

        let invitation = self.get_by_code(code).await?;
        let principal = SurrealPrincipalRepository::new(self.db.clone())
            .get_by_id(principal_id)
            .await?;

        Ok(Redemption {
            invitation,
            principal,
        })
    }

    async fn revoke(&self, code: &str) -> BarangayResult<Invitation> {
        let result = self
            .db
            .query(
                "UPDATE type::record('invitation', $code) SET status = 'expired' \
                 WHERE status = 'pending'",
            )
            .bind(("code", code.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(row.try_into_invitation()?),
            None => Err(self.classify_unavailable(code, None).await),
        }
    }

    async fn list_by_tenant(&self, tenant_id: Option<Uuid>) -> BarangayResult<Vec<Invitation>> {
        let query = format!(
            "SELECT * FROM invitation WHERE {} ORDER BY created_at DESC",
            tenant_filter(tenant_id)
        );

        let mut result = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.map(|t| t.to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_invitation().map_err(Into::into))
            .collect()
    }
}
