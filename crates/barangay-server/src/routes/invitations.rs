use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use barangay_core::models::invitation::Invitation;
use barangay_core::models::role::Role;
use serde::Deserialize;

use super::CurrentPrincipal;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
    pub role: String,
}

/// The response carries the code; it is shown once to the grantor for
/// manual distribution.
pub async fn create(
    State(state): State<AppState>,
    CurrentPrincipal(grantor): CurrentPrincipal,
    Json(req): Json<CreateInvitationRequest>,
) -> ApiResult<(StatusCode, Json<Invitation>)> {
    let role: Role = req.role.parse()?;
    let invitation = state
        .services
        .invitations
        .create_invitation(&grantor, &req.email, role)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentPrincipal(grantor): CurrentPrincipal,
) -> ApiResult<Json<Vec<Invitation>>> {
    let invitations = state.services.invitations.list_invitations(&grantor).await?;
    Ok(Json(invitations))
}

pub async fn revoke(
    State(state): State<AppState>,
    CurrentPrincipal(grantor): CurrentPrincipal,
    Path(code): Path<String>,
) -> ApiResult<Json<Invitation>> {
    let invitation = state
        .services
        .invitations
        .revoke_invitation(&grantor, &code)
        .await?;
    Ok(Json(invitation))
}
