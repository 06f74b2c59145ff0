use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use barangay_auth::{AccountDetails, OnboardingStep};
use barangay_core::models::principal::Principal;
use barangay_core::models::role::Role;
use barangay_core::policy::Page;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub step: OnboardingStep,
    pub email: String,
    pub role: Role,
}

pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    let verified = state.services.onboarding.submit_code(&req.code).await?;
    Ok(Json(VerifyResponse {
        step: verified.step(),
        email: verified.invitation.email,
        role: verified.invitation.role,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub code: String,
    #[serde(flatten)]
    pub details: AccountDetails,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub step: OnboardingStep,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub principal: Principal,
    pub default_page: Page,
}

/// Second signup screen: the code is re-verified, then the account is
/// created and a session opened in one request.
pub async fn complete(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> ApiResult<(StatusCode, Json<CompleteResponse>)> {
    let flow = &state.services.onboarding;
    let verified = flow.submit_code(&req.code).await?;
    let created = flow.create_account(&verified, req.details).await?;
    let session = flow.establish_session(created).await?;

    Ok((
        StatusCode::CREATED,
        Json(CompleteResponse {
            step: session.step(),
            access_token: session.token.access_token,
            token_type: "Bearer",
            expires_in: session.token.expires_in,
            principal: session.principal,
            default_page: session.default_page,
        }),
    ))
}
