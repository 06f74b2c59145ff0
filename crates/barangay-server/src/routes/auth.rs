use axum::Json;
use axum::extract::State;
use barangay_auth::SessionContext;
use barangay_core::identity::RequestCredentials;
use barangay_core::models::role::Role;
use barangay_core::policy;
use serde::{Deserialize, Serialize};

use super::{Credentials, CurrentPrincipal};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub session: SessionContext,
}

/// Sign in, then resolve the session so a deactivated account is
/// reported as such rather than as a bad password.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let token = state
        .services
        .identity
        .sign_in(&req.email, &req.password)
        .await?;
    let session = state
        .services
        .sessions
        .resolve_session(&RequestCredentials::bearer(token.access_token.clone()))
        .await?;

    Ok(Json(LoginResponse {
        access_token: token.access_token,
        token_type: "Bearer",
        expires_in: token.expires_in,
        session,
    }))
}

pub async fn session(
    State(state): State<AppState>,
    Credentials(credentials): Credentials,
) -> ApiResult<Json<SessionContext>> {
    let context = state.services.sessions.resolve_session(&credentials).await?;
    Ok(Json(context))
}

#[derive(Debug, Serialize)]
pub struct GrantableRoles {
    pub roles: Vec<Role>,
}

pub async fn grantable_roles(
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Json<GrantableRoles> {
    Json(GrantableRoles {
        roles: policy::grantable_roles(principal.role).to_vec(),
    })
}
