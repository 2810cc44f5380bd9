//! Bookcase and shelf management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::bookcase::{Bookcase, CreateBookcase, CreateShelf, Shelf, UpdateBookcase},
};

use super::AuthenticatedUser;

/// List bookcases visible to the caller
#[utoipa::path(
    get,
    path = "/bookcases",
    tag = "bookcases",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of bookcases", body = Vec<Bookcase>)
    )
)]
pub async fn list_bookcases(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Bookcase>>> {
    let bookcases = state.services.catalog.list_bookcases(&claims).await?;
    Ok(Json(bookcases))
}

/// Get bookcase details by ID
#[utoipa::path(
    get,
    path = "/bookcases/{id}",
    tag = "bookcases",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Bookcase ID")
    ),
    responses(
        (status = 200, description = "Bookcase details", body = Bookcase),
        (status = 404, description = "Bookcase not found")
    )
)]
pub async fn get_bookcase(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Bookcase>> {
    let bookcase = state.services.catalog.get_bookcase(id).await?;
    Ok(Json(bookcase))
}

/// Create a new bookcase
#[utoipa::path(
    post,
    path = "/bookcases",
    tag = "bookcases",
    security(("bearer_auth" = [])),
    request_body = CreateBookcase,
    responses(
        (status = 201, description = "Bookcase created", body = Bookcase),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn create_bookcase(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(bookcase): Json<CreateBookcase>,
) -> AppResult<(StatusCode, Json<Bookcase>)> {
    claims.require_staff()?;

    let created = state.services.catalog.create_bookcase(bookcase).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing bookcase
#[utoipa::path(
    put,
    path = "/bookcases/{id}",
    tag = "bookcases",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Bookcase ID")
    ),
    request_body = UpdateBookcase,
    responses(
        (status = 200, description = "Bookcase updated", body = Bookcase),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Bookcase not found")
    )
)]
pub async fn update_bookcase(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateBookcase>,
) -> AppResult<Json<Bookcase>> {
    claims.require_staff()?;

    let updated = state.services.catalog.update_bookcase(id, update).await?;
    Ok(Json(updated))
}

/// Delete a bookcase
#[utoipa::path(
    delete,
    path = "/bookcases/{id}",
    tag = "bookcases",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Bookcase ID")
    ),
    responses(
        (status = 204, description = "Bookcase deleted"),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Bookcase not found")
    )
)]
pub async fn delete_bookcase(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.catalog.delete_bookcase(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List shelves of a bookcase
#[utoipa::path(
    get,
    path = "/bookcases/{id}/shelves",
    tag = "bookcases",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Bookcase ID")
    ),
    responses(
        (status = 200, description = "Shelves in position order", body = Vec<Shelf>),
        (status = 404, description = "Bookcase not found")
    )
)]
pub async fn list_shelves(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Shelf>>> {
    let shelves = state.services.catalog.list_shelves(id).await?;
    Ok(Json(shelves))
}

/// Add a shelf to a bookcase
#[utoipa::path(
    post,
    path = "/bookcases/{id}/shelves",
    tag = "bookcases",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Bookcase ID")
    ),
    request_body = CreateShelf,
    responses(
        (status = 201, description = "Shelf created", body = Shelf),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Bookcase not found")
    )
)]
pub async fn create_shelf(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(shelf): Json<CreateShelf>,
) -> AppResult<(StatusCode, Json<Shelf>)> {
    claims.require_staff()?;

    let created = state.services.catalog.create_shelf(id, shelf).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a shelf
#[utoipa::path(
    delete,
    path = "/shelves/{id}",
    tag = "bookcases",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Shelf ID")
    ),
    responses(
        (status = 204, description = "Shelf deleted"),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Shelf not found")
    )
)]
pub async fn delete_shelf(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.catalog.delete_shelf(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
