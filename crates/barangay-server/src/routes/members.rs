use axum::Json;
use axum::extract::{Path, Query, State};
use barangay_core::models::principal::Principal;
use barangay_core::repository::Pagination;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CurrentPrincipal;
use crate::error::ApiResult;
use crate::state::AppState;

const MAX_PAGE_SIZE: u64 = 200;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<PageQuery> for Pagination {
    fn from(query: PageQuery) -> Self {
        let default = Pagination::default();
        Self {
            offset: query.offset.unwrap_or(default.offset),
            limit: query.limit.unwrap_or(default.limit).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberPage {
    pub items: Vec<Principal>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub async fn list(
    State(state): State<AppState>,
    CurrentPrincipal(actor): CurrentPrincipal,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<MemberPage>> {
    let page = state
        .services
        .members
        .list_members(&actor, query.into())
        .await?;
    Ok(Json(MemberPage {
        items: page.items,
        total: page.total,
        offset: page.offset,
        limit: page.limit,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

pub async fn set_active(
    State(state): State<AppState>,
    CurrentPrincipal(actor): CurrentPrincipal,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> ApiResult<Json<Principal>> {
    let principal = state
        .services
        .members
        .set_active(&actor, id, req.active)
        .await?;
    Ok(Json(principal))
}
