//! REST surface consumed by the onboarding and settings screens.

mod auth;
mod barangay;
mod invitations;
mod members;
mod onboarding;

use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::routing::{delete, get, post, put};
use barangay_core::identity::RequestCredentials;
use barangay_core::models::principal::Principal;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/session", get(auth::session))
        .route("/api/roles/grantable", get(auth::grantable_roles))
        .route(
            "/api/invitations",
            post(invitations::create).get(invitations::list),
        )
        .route("/api/invitations/{code}", delete(invitations::revoke))
        .route("/api/onboarding/verify", post(onboarding::verify))
        .route("/api/onboarding/complete", post(onboarding::complete))
        .route("/api/barangay", get(barangay::resolve).post(barangay::create))
        .route("/api/barangay/{id}", put(barangay::update))
        .route("/api/members", get(members::list))
        .route("/api/members/{id}/active", put(members::set_active))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn credentials(parts: &Parts) -> RequestCredentials {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    RequestCredentials::from_authorization_header(header)
}

/// The active principal behind the request's bearer token.
pub struct CurrentPrincipal(pub Principal);

impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credentials = credentials(parts);
        let principal = state
            .services
            .sessions
            .resolve_principal(&credentials)
            .await?;
        Ok(Self(principal))
    }
}

/// Raw bearer credentials, for routes that resolve the session themselves.
pub struct Credentials(pub RequestCredentials);

impl<S: Send + Sync> FromRequestParts<S> for Credentials {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(credentials(parts)))
    }
}
