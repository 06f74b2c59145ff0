use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use barangay_core::models::tenant::{CreateTenant, Tenant, TenantResolution, UpdateTenant};
use uuid::Uuid;

use super::CurrentPrincipal;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn resolve(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> ApiResult<Json<TenantResolution>> {
    let resolution = state.services.tenants.resolve_tenant(&principal).await?;
    Ok(Json(resolution))
}

/// A repeat submission answers 409 with the existing barangay's id.
pub async fn create(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(input): Json<CreateTenant>,
) -> ApiResult<(StatusCode, Json<Tenant>)> {
    let tenant = state
        .services
        .tenants
        .create_tenant(&principal, input)
        .await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// Omitted fields are left unchanged; an empty contact string clears it.
pub async fn update(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTenant>,
) -> ApiResult<Json<Tenant>> {
    let tenant = state
        .services
        .tenants
        .update_tenant(&principal, id, input)
        .await?;
    Ok(Json(tenant))
}
