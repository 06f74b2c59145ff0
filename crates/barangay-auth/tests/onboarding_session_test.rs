//! Integration tests for onboarding, session resolution, tenant setup
//! and the member directory.

mod common;

use barangay_auth::onboarding::{AccountDetails, OnboardingStep};
use barangay_auth::{BootstrapConfig, ensure_superadmin};
use barangay_core::error::BarangayError;
use barangay_core::identity::{IdentityProvider, RequestCredentials};
use barangay_core::models::invitation::{CreateInvitation, InvitationStatus};
use barangay_core::models::principal::CreatePrincipal;
use barangay_core::models::role::Role;
use barangay_core::models::tenant::{TenantResolution, UpdateTenant};
use barangay_core::policy::Page;
use barangay_core::repository::{InvitationRepository, Pagination, PrincipalRepository};
use chrono::{Duration, Utc};
use common::{Harness, PASSWORD, details, sample_tenant};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Onboarding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn superadmin_onboards_captain_into_pending_setup() {
    let h = Harness::new().await;
    let root = h.superadmin().await;
    let invitation = h
        .ledger()
        .create_invitation(&root, "cap@x.gov", Role::BarangayCaptain)
        .await
        .unwrap();

    let flow = h.onboarding();
    let verified = flow.submit_code(&invitation.code).await.unwrap();
    assert_eq!(verified.step(), OnboardingStep::CodeVerified);

    let created = flow
        .create_account(&verified, details("Juan Dela Cruz"))
        .await
        .unwrap();
    assert_eq!(created.step(), OnboardingStep::AccountCreated);
    assert_eq!(created.principal.role, Role::BarangayCaptain);
    assert_eq!(created.principal.tenant_id, None);
    assert_eq!(created.principal.email, "cap@x.gov");
    assert_eq!(created.principal.display_name, "Juan Dela Cruz");

    let session = flow.establish_session(created).await.unwrap();
    assert_eq!(session.step(), OnboardingStep::SessionEstablished);
    assert_eq!(session.default_page, Page::Dashboard);

    let resolution = h.resolver().resolve_tenant(&session.principal).await.unwrap();
    assert_eq!(resolution, TenantResolution::PendingSetup { can_create: true });

    let stored = h.invitations().get_by_code(&invitation.code).await.unwrap();
    assert_eq!(stored.status, InvitationStatus::Consumed);
    assert_eq!(stored.consumed_by, Some(session.principal.id));
}

#[tokio::test]
async fn invitee_joins_grantor_tenant() {
    let h = Harness::new().await;
    let (captain, tenant) = h.captain_with_tenant("cap@x.gov").await;
    let (staff, _) = h.onboard(&captain, "s@x.gov", Role::Staff).await;

    assert_eq!(staff.role, Role::Staff);
    assert_eq!(staff.tenant_id, Some(tenant.id));
    assert!(staff.active);
}

#[tokio::test]
async fn expired_code_fails_like_unknown_code() {
    let h = Harness::new().await;
    h.invitations()
        .create_superseding(CreateInvitation {
            code: "LATE23".into(),
            email: "late@x.gov".into(),
            role: Role::Staff,
            tenant_id: Some(Uuid::new_v4()),
            created_by: Uuid::new_v4(),
            expires_at: Utc::now() - Duration::seconds(1),
        })
        .await
        .unwrap();

    let flow = h.onboarding();
    let expired = flow.submit_code("late23").await.unwrap_err();
    let unknown = flow.submit_code("ZZZZ99").await.unwrap_err();
    let malformed = flow.submit_code("?").await.unwrap_err();

    assert!(matches!(expired, BarangayError::InvalidInvitation));
    assert!(matches!(unknown, BarangayError::InvalidInvitation));
    assert!(matches!(malformed, BarangayError::InvalidInvitation));
    assert_eq!(expired.to_string(), unknown.to_string());
}

#[tokio::test]
async fn password_policy_is_enforced_before_provisioning() {
    let h = Harness::new().await;
    let root = h.superadmin().await;
    let invitation = h
        .ledger()
        .create_invitation(&root, "cap@x.gov", Role::BarangayCaptain)
        .await
        .unwrap();
    let flow = h.onboarding();
    let verified = flow.submit_code(&invitation.code).await.unwrap();

    let short = AccountDetails {
        name: "Cap".into(),
        password: "short".into(),
        confirm_password: "short".into(),
    };
    let mismatch = AccountDetails {
        name: "Cap".into(),
        password: PASSWORD.into(),
        confirm_password: "something else".into(),
    };
    let nameless = AccountDetails {
        name: "  ".into(),
        ..details("")
    };

    for input in [short, mismatch, nameless] {
        let err = flow.create_account(&verified, input).await.unwrap_err();
        assert!(matches!(err, BarangayError::Validation { .. }));
    }

    // Nothing was consumed.
    let still = h.ledger().lookup_by_code(&invitation.code).await.unwrap();
    assert_eq!(still.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn code_cannot_be_redeemed_twice() {
    let h = Harness::new().await;
    let root = h.superadmin().await;
    let invitation = h
        .ledger()
        .create_invitation(&root, "cap@x.gov", Role::BarangayCaptain)
        .await
        .unwrap();
    let flow = h.onboarding();
    let verified = flow.submit_code(&invitation.code).await.unwrap();

    flow.create_account(&verified, details("First")).await.unwrap();
    let err = flow
        .create_account(&verified, details("Second"))
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::InvalidInvitation));
}

#[tokio::test]
async fn concurrent_redemption_creates_one_principal() {
    let h = Harness::new().await;
    let root = h.superadmin().await;
    let invitation = h
        .ledger()
        .create_invitation(&root, "cap@x.gov", Role::BarangayCaptain)
        .await
        .unwrap();

    let flow_a = h.onboarding();
    let flow_b = h.onboarding();
    let verified = flow_a.submit_code(&invitation.code).await.unwrap();

    let (a, b) = tokio::join!(
        flow_a.create_account(&verified, details("A")),
        flow_b.create_account(&verified, details("B")),
    );
    let loser = match (a, b) {
        (Ok(_), Err(e)) | (Err(e), Ok(_)) => e,
        (a, b) => panic!("exactly one redemption must win: {a:?} / {b:?}"),
    };
    assert!(
        matches!(loser, BarangayError::AlreadyConsumed),
        "loser should see the code as used, got {loser:?}"
    );

    let captains = h
        .principals()
        .list_by_role(Role::BarangayCaptain, Pagination::default())
        .await
        .unwrap();
    assert_eq!(captains.total, 1);
}

#[tokio::test]
async fn account_left_by_failed_redemption_is_reused() {
    let h = Harness::new().await;
    let root = h.superadmin().await;
    let leftover = h
        .identity()
        .provision_account("cap@x.gov", PASSWORD, "Cap")
        .await
        .unwrap();
    let invitation = h
        .ledger()
        .create_invitation(&root, "cap@x.gov", Role::BarangayCaptain)
        .await
        .unwrap();

    let flow = h.onboarding();
    let verified = flow.submit_code(&invitation.code).await.unwrap();
    let created = flow
        .create_account(&verified, details("Juan Dela Cruz"))
        .await
        .unwrap();

    assert_eq!(created.identity, leftover);
    assert_eq!(created.principal.identity_id, leftover.to_string());
    assert_eq!(created.principal.role, Role::BarangayCaptain);
    let session = flow.establish_session(created).await.unwrap();
    assert_eq!(session.principal.email, "cap@x.gov");

    let stored = h.invitations().get_by_code(&invitation.code).await.unwrap();
    assert_eq!(stored.status, InvitationStatus::Consumed);
}

#[tokio::test]
async fn leftover_account_needs_its_own_password() {
    let h = Harness::new().await;
    let root = h.superadmin().await;
    h.identity()
        .provision_account("cap@x.gov", "some other password", "Cap")
        .await
        .unwrap();
    let invitation = h
        .ledger()
        .create_invitation(&root, "cap@x.gov", Role::BarangayCaptain)
        .await
        .unwrap();

    let flow = h.onboarding();
    let verified = flow.submit_code(&invitation.code).await.unwrap();
    let err = flow
        .create_account(&verified, details("Impostor"))
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::AlreadyExists { .. }), "{err:?}");

    let still = h.ledger().lookup_by_code(&invitation.code).await.unwrap();
    assert_eq!(still.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn bound_account_is_not_reused() {
    let h = Harness::new().await;
    let (captain, _) = h.captain_with_tenant("cap@x.gov").await;
    let (staff, _) = h.onboard(&captain, "s@x.gov", Role::Staff).await;

    // A second invitation for an already onboarded email.
    let invitation = h
        .ledger()
        .create_invitation(&captain, "s@x.gov", Role::Treasurer)
        .await
        .unwrap();
    let flow = h.onboarding();
    let verified = flow.submit_code(&invitation.code).await.unwrap();
    let err = flow
        .create_account(&verified, details("Again"))
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::AlreadyExists { .. }), "{err:?}");

    let unchanged = h.principals().get_by_id(staff.id).await.unwrap();
    assert_eq!(unchanged.role, Role::Staff);
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let h = Harness::new().await;
    let first = h.superadmin().await;
    let second = h.superadmin().await;
    assert_eq!(first.id, second.id);
    assert_eq!(first.role, Role::Superadmin);
    assert_eq!(first.tenant_id, None);
}

#[tokio::test]
async fn bootstrap_resumes_after_account_without_principal() {
    let h = Harness::new().await;
    let leftover = h
        .identity()
        .provision_account("root@barangay.gov", PASSWORD, "Root")
        .await
        .unwrap();

    let root = h.superadmin().await;
    assert_eq!(root.identity_id, leftover.to_string());
    assert_eq!(root.role, Role::Superadmin);
}

#[tokio::test]
async fn bootstrap_refuses_non_superadmin_email() {
    let h = Harness::new().await;
    let (captain, _) = h.captain_with_tenant("cap@x.gov").await;

    let config = BootstrapConfig {
        email: captain.email.clone(),
        password: PASSWORD.into(),
        display_name: "Root".into(),
    };
    let err = ensure_superadmin(&h.identity(), &h.principals(), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::AlreadyExists { .. }));
}

// ---------------------------------------------------------------------------
// Session gateway
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_resolves_principal_and_tenant() {
    let h = Harness::new().await;
    let (captain, tenant) = h.captain_with_tenant("cap@x.gov").await;
    let (_, token) = h.onboard(&captain, "hw@x.gov", Role::HealthOfficer).await;

    let context = h
        .gateway()
        .resolve_session(&RequestCredentials::bearer(token.access_token))
        .await
        .unwrap();
    assert_eq!(context.principal.role, Role::HealthOfficer);
    assert_eq!(context.tenant, TenantResolution::Resolved { tenant });
    assert_eq!(context.pages, vec![Page::Dashboard, Page::Residents]);
    assert_eq!(context.default_page, Page::Dashboard);
}

#[tokio::test]
async fn sign_in_then_resolve_superadmin() {
    let h = Harness::new().await;
    let root = h.superadmin().await;

    let token = h
        .identity()
        .sign_in("ROOT@barangay.gov", PASSWORD)
        .await
        .unwrap();
    let context = h
        .gateway()
        .resolve_session(&RequestCredentials::bearer(token.access_token))
        .await
        .unwrap();
    assert_eq!(context.principal.id, root.id);
    assert_eq!(context.tenant, TenantResolution::NotApplicable);
    assert_eq!(context.default_page, Page::Barangays);

    let err = h
        .identity()
        .sign_in("root@barangay.gov", "wrong password")
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::Unauthenticated));
}

#[tokio::test]
async fn missing_or_bad_credentials_are_unauthenticated() {
    let h = Harness::new().await;
    let gateway = h.gateway();

    for creds in [
        RequestCredentials::default(),
        RequestCredentials::bearer("not-a-jwt"),
    ] {
        let err = gateway.resolve_principal(&creds).await.unwrap_err();
        assert!(matches!(err, BarangayError::Unauthenticated));
    }
}

#[tokio::test]
async fn identity_without_principal_is_rejected() {
    let h = Harness::new().await;
    let identity = h.identity();
    let id = identity
        .provision_account("orphan@x.gov", PASSWORD, "Orphan")
        .await
        .unwrap();
    let token = identity.issue_session(&id).await.unwrap();

    let err = h
        .gateway()
        .resolve_principal(&RequestCredentials::bearer(token.access_token))
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::Unauthenticated));
}

#[tokio::test]
async fn deactivated_principal_is_distinguished() {
    let h = Harness::new().await;
    let (captain, _) = h.captain_with_tenant("cap@x.gov").await;
    let (secretary, token) = h.onboard(&captain, "sec@x.gov", Role::Secretary).await;

    h.members()
        .set_active(&captain, secretary.id, false)
        .await
        .unwrap();

    let err = h
        .gateway()
        .resolve_principal(&RequestCredentials::bearer(token.access_token))
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::AccountInactive));
}

// ---------------------------------------------------------------------------
// Tenant resolver
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unassigned_member_cannot_create_tenant() {
    let h = Harness::new().await;
    let staff = h
        .principals()
        .create(CreatePrincipal {
            identity_id: "legacy-staff".into(),
            email: "legacy@x.gov".into(),
            display_name: "Legacy".into(),
            role: Role::Staff,
            tenant_id: None,
        })
        .await
        .unwrap();

    let resolver = h.resolver();
    assert_eq!(
        resolver.resolve_tenant(&staff).await.unwrap(),
        TenantResolution::PendingSetup { can_create: false }
    );
    let err = resolver
        .create_tenant(&staff, sample_tenant("Rogue"))
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::Forbidden { .. }));
}

#[tokio::test]
async fn second_tenant_creation_reports_existing() {
    let h = Harness::new().await;
    let root = h.superadmin().await;
    let (captain, _) = h.onboard(&root, "cap@x.gov", Role::BarangayCaptain).await;
    let resolver = h.resolver();

    let first = resolver
        .create_tenant(&captain, sample_tenant("San Isidro"))
        .await
        .unwrap();

    // Stale principal: the store still refuses a second barangay.
    let err = resolver
        .create_tenant(&captain, sample_tenant("Santa Cruz"))
        .await
        .unwrap_err();
    match err {
        BarangayError::AlreadyExists { id, .. } => assert_eq!(id, first.id.to_string()),
        other => panic!("expected AlreadyExists, got {other:?}"),
    }

    let fresh = h.principals().get_by_id(captain.id).await.unwrap();
    assert_eq!(fresh.tenant_id, Some(first.id));
    match resolver.resolve_tenant(&fresh).await.unwrap() {
        TenantResolution::Resolved { tenant } => assert_eq!(tenant.name, "San Isidro"),
        other => panic!("expected Resolved, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_tenant_creation_has_one_winner() {
    let h = Harness::new().await;
    let root = h.superadmin().await;
    let (captain, _) = h.onboard(&root, "cap@x.gov", Role::BarangayCaptain).await;
    let resolver_a = h.resolver();
    let resolver_b = h.resolver();

    let (a, b) = tokio::join!(
        resolver_a.create_tenant(&captain, sample_tenant("A")),
        resolver_b.create_tenant(&captain, sample_tenant("B")),
    );

    let (winner, loser) = match (a, b) {
        (Ok(t), Err(e)) | (Err(e), Ok(t)) => (t, e),
        (a, b) => panic!("expected one winner, got {a:?} and {b:?}"),
    };
    match loser {
        BarangayError::AlreadyExists { id, .. } => assert_eq!(id, winner.id.to_string()),
        other => panic!("expected AlreadyExists, got {other:?}"),
    }
}

#[tokio::test]
async fn tenant_updates_are_owner_only() {
    let h = Harness::new().await;
    let (captain, tenant) = h.captain_with_tenant("cap@x.gov").await;
    let root = h.superadmin().await;
    let (other, _) = h.onboard(&root, "cap2@x.gov", Role::BarangayCaptain).await;
    let resolver = h.resolver();

    let update = UpdateTenant {
        address: Some("Zone 4, Poblacion".into()),
        contact_email: Some(Some("hall@sanisidro.gov".into())),
        ..Default::default()
    };

    let err = resolver
        .update_tenant(&other, tenant.id, update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::Forbidden { .. }));

    let updated = resolver.update_tenant(&captain, tenant.id, update).await.unwrap();
    assert_eq!(updated.address, "Zone 4, Poblacion");
    assert_eq!(updated.contact_email.as_deref(), Some("hall@sanisidro.gov"));
    assert_eq!(updated.name, tenant.name);
}

// ---------------------------------------------------------------------------
// Member directory
// ---------------------------------------------------------------------------

#[tokio::test]
async fn members_are_listed_per_scope() {
    let h = Harness::new().await;
    let (captain, tenant) = h.captain_with_tenant("cap@x.gov").await;
    h.onboard(&captain, "s@x.gov", Role::Staff).await;
    let root = h.superadmin().await;

    let page = h
        .members()
        .list_members(&captain, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|p| p.tenant_id == Some(tenant.id)));

    let captains = h
        .members()
        .list_members(&root, Pagination::default())
        .await
        .unwrap();
    assert_eq!(captains.total, 1);
    assert_eq!(captains.items[0].id, captain.id);
}

#[tokio::test]
async fn status_changes_follow_grant_scope() {
    let h = Harness::new().await;
    let (captain, _) = h.captain_with_tenant("cap@x.gov").await;
    let (secretary, _) = h.onboard(&captain, "sec@x.gov", Role::Secretary).await;
    let (staff, _) = h.onboard(&secretary, "s@x.gov", Role::Staff).await;
    let (treasurer, _) = h.onboard(&captain, "t@x.gov", Role::Treasurer).await;
    let members = h.members();

    let off = members.set_active(&secretary, staff.id, false).await.unwrap();
    assert!(!off.active);
    let on = members.set_active(&secretary, staff.id, true).await.unwrap();
    assert!(on.active);

    let err = members
        .set_active(&secretary, treasurer.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::Forbidden { .. }));

    let err = members
        .set_active(&captain, captain.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::Forbidden { .. }));

    let err = members
        .list_members(&staff, Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::Forbidden { .. }));
}

#[tokio::test]
async fn captains_cannot_reach_other_barangays() {
    let h = Harness::new().await;
    let (captain, _) = h.captain_with_tenant("cap@x.gov").await;
    let (staff, _) = h.onboard(&captain, "s@x.gov", Role::Staff).await;

    let root = h.superadmin().await;
    let (rival, _) = h.onboard(&root, "rival@x.gov", Role::BarangayCaptain).await;
    h.resolver()
        .create_tenant(&rival, sample_tenant("Santa Cruz"))
        .await
        .unwrap();
    let rival = h.principals().get_by_id(rival.id).await.unwrap();

    let err = h
        .members()
        .set_active(&rival, staff.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, BarangayError::Forbidden { .. }));
}
