//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{LoanDetails, LoanQuery},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Response for loan return and cancellation
#[derive(Serialize, ToSchema)]
pub struct LoanClosedResponse {
    pub message: String,
    pub loan: LoanDetails,
}

/// List loans (staff/admin, campus-scoped)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "List of loans", body = PaginatedResponse<LoanDetails>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    let (loans, total) = state.services.loans.search(&claims, &query).await?;

    Ok(Json(PaginatedResponse {
        items: loans,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get loans for a specific user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's loans", body = Vec<LoanDetails>),
        (status = 403, description = "Readers may only view their own loans"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.user_loans(user_id, &claims).await?;
    Ok(Json(loans))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = LoanClosedResponse),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Loan already closed")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanClosedResponse>> {
    let loan = state.services.loans.return_loan(loan_id, &claims).await?;

    Ok(Json(LoanClosedResponse {
        message: "Book returned".to_string(),
        loan,
    }))
}

/// Void a loan, restoring the book's availability
#[utoipa::path(
    post,
    path = "/loans/{id}/cancel",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan canceled", body = LoanClosedResponse),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Loan already closed")
    )
)]
pub async fn cancel_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanClosedResponse>> {
    let loan = state.services.loans.cancel_loan(loan_id, &claims).await?;

    Ok(Json(LoanClosedResponse {
        message: "Loan canceled".to_string(),
        loan,
    }))
}
