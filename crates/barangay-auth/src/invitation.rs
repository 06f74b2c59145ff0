//! Invitation ledger: creation, lookup, consumption and revocation of
//! single-use invitation codes.

use barangay_core::error::{BarangayError, BarangayResult};
use barangay_core::models::invitation::{CreateInvitation, Invitation, InvitationStatus};
use barangay_core::models::principal::{NewMember, Principal};
use barangay_core::models::role::Role;
use barangay_core::policy;
use barangay_core::repository::InvitationRepository;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::code;
use crate::config::InvitationConfig;

/// Lower-case and sanity-check an email address.
pub fn normalize_email(email: &str) -> BarangayResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(BarangayError::validation(format!("invalid email address: {email}")))
    }
}

pub struct InvitationLedger<I: InvitationRepository> {
    invitations: I,
    config: InvitationConfig,
}

impl<I: InvitationRepository> InvitationLedger<I> {
    pub fn new(invitations: I, config: InvitationConfig) -> Self {
        Self {
            invitations,
            config,
        }
    }

    /// Issue an invitation for `email` to join with `requested_role`.
    ///
    /// The grantor must be allowed to grant the role. Captains must have
    /// set up their barangay first; the invitee is bound to it. Captain
    /// invitations issued by a superadmin carry no barangay. Any pending
    /// invitation for the same email and barangay is superseded.
    pub async fn create_invitation(
        &self,
        grantor: &Principal,
        email: &str,
        requested_role: Role,
    ) -> BarangayResult<Invitation> {
        if !grantor.active {
            return Err(BarangayError::AccountInactive);
        }
        if !policy::can_grant(grantor.role, requested_role) {
            return Err(BarangayError::forbidden(format!(
                "{} may not invite {}",
                grantor.role, requested_role
            )));
        }

        let tenant_id = if requested_role == Role::BarangayCaptain {
            None
        } else {
            let Some(tenant_id) = grantor.tenant_id else {
                return Err(BarangayError::PrerequisiteMissing {
                    reason: "set up your barangay before inviting members".into(),
                });
            };
            Some(tenant_id)
        };

        let email = normalize_email(email)?;
        let ttl = i64::try_from(self.config.ttl_secs)
            .map_err(|_| BarangayError::Internal("invitation TTL out of range".into()))?;

        for attempt in 1..=self.config.max_code_attempts.max(1) {
            let input = CreateInvitation {
                code: code::generate_code(self.config.effective_code_length()),
                email: email.clone(),
                role: requested_role,
                tenant_id,
                created_by: grantor.id,
                expires_at: Utc::now() + Duration::seconds(ttl),
            };

            match self.invitations.create_superseding(input).await {
                Ok(invitation) => {
                    info!(
                        grantor = %grantor.id,
                        email = %invitation.email,
                        role = %invitation.role,
                        tenant_id = ?invitation.tenant_id,
                        "Invitation created"
                    );
                    return Ok(invitation);
                }
                Err(BarangayError::AlreadyExists { .. }) => {
                    warn!(attempt, "Invitation code collision, drawing a new code");
                }
                Err(e) => return Err(e),
            }
        }

        Err(BarangayError::Internal(
            "could not allocate an unused invitation code".into(),
        ))
    }

    /// Fetch an invitation in any state.
    ///
    /// Malformed codes fail with `NotFound` after the same store round
    /// trip an unknown code costs.
    pub async fn find_by_code(&self, code: &str) -> BarangayResult<Invitation> {
        let length = self.config.effective_code_length();
        if let Some(normalized) = code::normalize_code(code, length) {
            return self.invitations.get_by_code(&normalized).await;
        }

        match self.invitations.get_by_code(&code::unissued_code(length)).await {
            Ok(_) | Err(BarangayError::NotFound { .. }) => {
                Err(BarangayError::not_found("invitation", code.trim()))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch a redeemable invitation.
    ///
    /// Fails with `NotFound` for unknown or malformed codes and `Expired`
    /// when the invitation is past its deadline or no longer pending.
    pub async fn lookup_by_code(&self, code: &str) -> BarangayResult<Invitation> {
        let invitation = self.find_by_code(code).await?;
        if !invitation.is_redeemable_at(Utc::now()) {
            return Err(BarangayError::Expired);
        }
        Ok(invitation)
    }

    /// Redeem `code` for a freshly provisioned account, creating the
    /// principal the invitation grants. Exactly one of any concurrent
    /// redemptions succeeds.
    pub async fn consume(&self, code: &str, member: NewMember) -> BarangayResult<Principal> {
        let Some(code) = code::normalize_code(code, self.config.effective_code_length()) else {
            return Err(BarangayError::not_found("invitation", code.trim()));
        };

        let redemption = self.invitations.consume(&code, member).await?;
        info!(
            principal_id = %redemption.principal.id,
            role = %redemption.principal.role,
            tenant_id = ?redemption.principal.tenant_id,
            "Invitation consumed"
        );
        Ok(redemption.principal)
    }

    /// Invitations visible to `grantor`: those of their barangay, or
    /// captain invitations for a superadmin.
    pub async fn list_invitations(&self, grantor: &Principal) -> BarangayResult<Vec<Invitation>> {
        let scope = self.grantor_scope(grantor)?;
        self.invitations.list_by_tenant(scope).await
    }

    /// Withdraw a pending invitation within the grantor's scope.
    pub async fn revoke_invitation(
        &self,
        grantor: &Principal,
        code: &str,
    ) -> BarangayResult<Invitation> {
        let scope = self.grantor_scope(grantor)?;
        let Some(code) = code::normalize_code(code, self.config.effective_code_length()) else {
            return Err(BarangayError::InvalidInvitation);
        };

        let invitation = match self.invitations.get_by_code(&code).await {
            Ok(invitation) => invitation,
            Err(BarangayError::NotFound { .. }) => return Err(BarangayError::InvalidInvitation),
            Err(e) => return Err(e),
        };
        if invitation.tenant_id != scope || !policy::can_grant(grantor.role, invitation.role) {
            return Err(BarangayError::forbidden(
                "invitation belongs to another barangay",
            ));
        }
        if invitation.status != InvitationStatus::Pending {
            return Err(BarangayError::InvalidInvitation);
        }

        let revoked = self.invitations.revoke(&code).await.map_err(|e| match e {
            BarangayError::Expired | BarangayError::AlreadyConsumed => {
                BarangayError::InvalidInvitation
            }
            other => other,
        })?;
        info!(grantor = %grantor.id, email = %revoked.email, "Invitation revoked");
        Ok(revoked)
    }

    fn grantor_scope(&self, grantor: &Principal) -> BarangayResult<Option<uuid::Uuid>> {
        if policy::grantable_roles(grantor.role).is_empty() {
            return Err(BarangayError::forbidden(format!(
                "{} may not manage invitations",
                grantor.role
            )));
        }
        match (grantor.role, grantor.tenant_id) {
            (Role::Superadmin, _) => Ok(None),
            (_, Some(tenant_id)) => Ok(Some(tenant_id)),
            (_, None) => Err(BarangayError::PrerequisiteMissing {
                reason: "set up your barangay before managing invitations".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use barangay_core::repository::Redemption;
    use uuid::Uuid;

    use super::*;

    /// Store with no invitations that counts reads.
    #[derive(Default)]
    struct EmptyStore {
        reads: AtomicUsize,
    }

    impl InvitationRepository for EmptyStore {
        async fn create_superseding(&self, _input: CreateInvitation) -> BarangayResult<Invitation> {
            Err(BarangayError::Internal("read-only store".into()))
        }

        async fn get_by_code(&self, code: &str) -> BarangayResult<Invitation> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(BarangayError::not_found("invitation", code))
        }

        async fn consume(&self, code: &str, _member: NewMember) -> BarangayResult<Redemption> {
            Err(BarangayError::not_found("invitation", code))
        }

        async fn revoke(&self, code: &str) -> BarangayResult<Invitation> {
            Err(BarangayError::not_found("invitation", code))
        }

        async fn list_by_tenant(&self, _tenant_id: Option<Uuid>) -> BarangayResult<Vec<Invitation>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn malformed_and_unknown_codes_cost_one_read_each() {
        let ledger = InvitationLedger::new(EmptyStore::default(), InvitationConfig::default());

        for input in ["ZZZZ99", "?", "0", "", "K7QX2M9"] {
            let before = ledger.invitations.reads.load(Ordering::SeqCst);
            let err = ledger.lookup_by_code(input).await.unwrap_err();
            assert!(matches!(err, BarangayError::NotFound { .. }), "{input}: {err:?}");
            assert_eq!(
                ledger.invitations.reads.load(Ordering::SeqCst),
                before + 1,
                "{input}"
            );
        }
    }
}
