//! Dashboard statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::AppResult, policy::ScopeRequest, services::stats::StatsOverview};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct StatsQuery {
    pub scope: Option<ScopeRequest>,
}

/// Dashboard counters, campus-scoped
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(StatsQuery),
    responses(
        (status = 200, description = "Dashboard counters", body = StatsOverview),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StatsOverview>> {
    claims.require_staff()?;

    let stats = state.services.stats.overview(&claims, query.scope).await?;
    Ok(Json(stats))
}
