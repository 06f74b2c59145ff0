//! Onboarding flow: verify code, create account, establish session.
//!
//! Each step consumes the previous step's output, so the states
//! `AwaitingCode -> CodeVerified -> AccountCreated -> SessionEstablished`
//! can only be walked in order.

use barangay_core::error::{BarangayError, BarangayResult};
use barangay_core::identity::{ExternalIdentityId, IdentityProvider, SessionToken};
use barangay_core::models::invitation::{Invitation, InvitationStatus};
use barangay_core::models::principal::{NewMember, Principal};
use barangay_core::policy::{self, Page};
use barangay_core::repository::{InvitationRepository, PrincipalRepository};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::invitation::InvitationLedger;
use crate::password;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    AwaitingCode,
    CodeVerified,
    AccountCreated,
    SessionEstablished,
}

/// A code that resolved to a redeemable invitation.
#[derive(Debug, Clone)]
pub struct VerifiedCode {
    pub invitation: Invitation,
}

/// Details collected from the invitee on the second signup screen.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDetails {
    pub name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct AccountCreated {
    pub principal: Principal,
    pub identity: ExternalIdentityId,
}

#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub principal: Principal,
    pub token: SessionToken,
    pub default_page: Page,
}

impl VerifiedCode {
    pub fn step(&self) -> OnboardingStep {
        OnboardingStep::CodeVerified
    }
}

impl AccountCreated {
    pub fn step(&self) -> OnboardingStep {
        OnboardingStep::AccountCreated
    }
}

impl EstablishedSession {
    pub fn step(&self) -> OnboardingStep {
        OnboardingStep::SessionEstablished
    }
}

pub struct OnboardingFlow<R: InvitationRepository, I: IdentityProvider, P: PrincipalRepository> {
    ledger: InvitationLedger<R>,
    identity: I,
    principals: P,
    min_password_length: usize,
}

impl<R, I, P> OnboardingFlow<R, I, P>
where
    R: InvitationRepository,
    I: IdentityProvider,
    P: PrincipalRepository,
{
    pub fn new(
        ledger: InvitationLedger<R>,
        identity: I,
        principals: P,
        min_password_length: usize,
    ) -> Self {
        Self {
            ledger,
            identity,
            principals,
            min_password_length,
        }
    }

    /// `AwaitingCode -> CodeVerified`. Unknown and expired codes fail
    /// alike with `InvalidInvitation`; nothing is consumed.
    pub async fn submit_code(&self, code: &str) -> BarangayResult<VerifiedCode> {
        match self.ledger.lookup_by_code(code).await {
            Ok(invitation) => Ok(VerifiedCode { invitation }),
            Err(e) => Err(collapse_lookup_error(e)),
        }
    }

    /// `CodeVerified -> AccountCreated`.
    ///
    /// Provisions the identity-provider account for the invited email and
    /// redeems the code. An account already registered for that email is
    /// reused when the password matches and no principal is bound to it.
    /// If another redemption won the race `AlreadyConsumed` is returned.
    pub async fn create_account(
        &self,
        verified: &VerifiedCode,
        details: AccountDetails,
    ) -> BarangayResult<AccountCreated> {
        let name = details.name.trim();
        if name.is_empty() {
            return Err(BarangayError::validation("name must not be empty"));
        }
        password::validate_new_password(
            &details.password,
            &details.confirm_password,
            self.min_password_length,
        )?;

        let code = verified.invitation.code.as_str();
        let invitation = self
            .ledger
            .lookup_by_code(code)
            .await
            .map_err(collapse_lookup_error)?;

        let identity = match self
            .identity
            .provision_account(&invitation.email, &details.password, name)
            .await
        {
            Ok(identity) => identity,
            Err(BarangayError::AlreadyExists { .. }) => {
                self.existing_identity(&invitation, &details.password).await?
            }
            Err(e) => return Err(e),
        };

        let member = NewMember {
            identity_id: identity.to_string(),
            email: invitation.email.clone(),
            display_name: name.to_owned(),
        };
        let principal = match self.ledger.consume(code, member).await {
            Ok(principal) => principal,
            Err(BarangayError::AlreadyConsumed) => {
                warn!(
                    identity = %identity,
                    email = %invitation.email,
                    "Invitation redeemed concurrently; account may be left without a role binding"
                );
                return Err(BarangayError::AlreadyConsumed);
            }
            Err(e) => return Err(collapse_lookup_error(e)),
        };

        info!(principal_id = %principal.id, role = %principal.role, "Account onboarded");
        Ok(AccountCreated {
            principal,
            identity,
        })
    }

    /// Resolve the account already registered for the invited email.
    ///
    /// Either a concurrent redemption provisioned it, or an earlier
    /// attempt provisioned it and then failed to consume the code.
    async fn existing_identity(
        &self,
        invitation: &Invitation,
        password: &str,
    ) -> BarangayResult<ExternalIdentityId> {
        self.ensure_still_pending(&invitation.code).await?;

        let Some(identity) = self.identity.authenticate(&invitation.email, password).await? else {
            // The winner of a race may commit while the password is checked.
            self.ensure_still_pending(&invitation.code).await?;
            return Err(account_taken(&invitation.email));
        };

        match self.principals.get_by_identity(identity.as_str()).await {
            Err(BarangayError::NotFound { .. }) => {
                info!(identity = %identity, "Reusing account with no role binding");
                Ok(identity)
            }
            Ok(_) => {
                self.ensure_still_pending(&invitation.code).await?;
                Err(account_taken(&invitation.email))
            }
            Err(e) => Err(e),
        }
    }

    async fn ensure_still_pending(&self, code: &str) -> BarangayResult<()> {
        let current = self
            .ledger
            .find_by_code(code)
            .await
            .map_err(collapse_lookup_error)?;
        match current.status {
            InvitationStatus::Consumed => Err(BarangayError::AlreadyConsumed),
            _ if !current.is_redeemable_at(Utc::now()) => Err(BarangayError::InvalidInvitation),
            _ => Ok(()),
        }
    }

    /// `AccountCreated -> SessionEstablished`.
    pub async fn establish_session(
        &self,
        created: AccountCreated,
    ) -> BarangayResult<EstablishedSession> {
        let token = self.identity.issue_session(&created.identity).await?;
        let default_page = policy::default_page(created.principal.role);
        Ok(EstablishedSession {
            principal: created.principal,
            token,
            default_page,
        })
    }
}

fn account_taken(email: &str) -> BarangayError {
    BarangayError::AlreadyExists {
        entity: "account".into(),
        id: email.to_owned(),
    }
}

fn collapse_lookup_error(err: BarangayError) -> BarangayError {
    match err {
        BarangayError::NotFound { .. } | BarangayError::Expired => BarangayError::InvalidInvitation,
        other => other,
    }
}
