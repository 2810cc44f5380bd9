//! Campus management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::campus::{Campus, CreateCampus, UpdateCampus},
};

use super::AuthenticatedUser;

/// List all campuses
#[utoipa::path(
    get,
    path = "/campuses",
    tag = "campuses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of campuses", body = Vec<Campus>)
    )
)]
pub async fn list_campuses(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Campus>>> {
    let campuses = state.services.catalog.list_campuses().await?;
    Ok(Json(campuses))
}

/// Get campus details by ID
#[utoipa::path(
    get,
    path = "/campuses/{id}",
    tag = "campuses",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Campus ID")
    ),
    responses(
        (status = 200, description = "Campus details", body = Campus),
        (status = 404, description = "Campus not found")
    )
)]
pub async fn get_campus(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Campus>> {
    let campus = state.services.catalog.get_campus(id).await?;
    Ok(Json(campus))
}

/// Create a new campus
#[utoipa::path(
    post,
    path = "/campuses",
    tag = "campuses",
    security(("bearer_auth" = [])),
    request_body = CreateCampus,
    responses(
        (status = 201, description = "Campus created", body = Campus),
        (status = 403, description = "Administrator privileges required"),
        (status = 409, description = "Name or code already exists")
    )
)]
pub async fn create_campus(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(campus): Json<CreateCampus>,
) -> AppResult<(StatusCode, Json<Campus>)> {
    claims.require_admin()?;

    let created = state.services.catalog.create_campus(campus).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing campus
#[utoipa::path(
    put,
    path = "/campuses/{id}",
    tag = "campuses",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Campus ID")
    ),
    request_body = UpdateCampus,
    responses(
        (status = 200, description = "Campus updated", body = Campus),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Campus not found")
    )
)]
pub async fn update_campus(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateCampus>,
) -> AppResult<Json<Campus>> {
    claims.require_admin()?;

    let updated = state.services.catalog.update_campus(id, update).await?;
    Ok(Json(updated))
}
