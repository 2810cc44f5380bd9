//! Loan request workflow endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        loan::LoanDetails,
        loan_request::{DecideRequest, LoanRequestDetails, LoanRequestQuery},
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Response for request submission and cancellation
#[derive(Serialize, ToSchema)]
pub struct LoanRequestResponse {
    pub message: String,
    #[serde(rename = "loanRequest")]
    pub loan_request: LoanRequestDetails,
}

/// Response for a staff/admin decision
#[derive(Serialize, ToSchema)]
pub struct DecisionResponse {
    pub message: String,
    #[serde(rename = "loanRequest")]
    pub loan_request: LoanRequestDetails,
    /// The loan created by an approval; null on rejection
    #[serde(rename = "bookLoan")]
    pub book_loan: Option<LoanDetails>,
}

/// Submit a loan request for a book
#[utoipa::path(
    post,
    path = "/books/{id}/loan-requests",
    tag = "loan-requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Request created", body = LoanRequestResponse),
        (status = 403, description = "Only regular users can request loans"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book not requestable, unavailable, or duplicate request")
    )
)]
pub async fn submit_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<(StatusCode, Json<LoanRequestResponse>)> {
    let request = state
        .services
        .loan_requests
        .submit(book_id, &claims)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanRequestResponse {
            message: "Loan request submitted".to_string(),
            loan_request: request,
        }),
    ))
}

/// List loan requests (staff/admin, campus-scoped)
#[utoipa::path(
    get,
    path = "/loan-requests",
    tag = "loan-requests",
    security(("bearer_auth" = [])),
    params(LoanRequestQuery),
    responses(
        (status = 200, description = "List of loan requests", body = PaginatedResponse<LoanRequestDetails>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanRequestQuery>,
) -> AppResult<Json<PaginatedResponse<LoanRequestDetails>>> {
    let (requests, total) = state.services.loan_requests.search(&claims, &query).await?;

    Ok(Json(PaginatedResponse {
        items: requests,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// List the authenticated user's own loan requests
#[utoipa::path(
    get,
    path = "/loan-requests/mine",
    tag = "loan-requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's request history", body = Vec<LoanRequestDetails>)
    )
)]
pub async fn my_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanRequestDetails>>> {
    let requests = state.services.loan_requests.mine(&claims).await?;
    Ok(Json(requests))
}

/// Approve or reject a pending loan request
#[utoipa::path(
    post,
    path = "/loan-requests/{id}/decide",
    tag = "loan-requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan request ID")
    ),
    request_body = DecideRequest,
    responses(
        (status = 200, description = "Request decided", body = DecisionResponse),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Request already processed or book unavailable")
    )
)]
pub async fn decide_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
    Json(body): Json<DecideRequest>,
) -> AppResult<Json<DecisionResponse>> {
    let (request, loan) = state
        .services
        .loan_requests
        .decide(request_id, &claims, body.decision)
        .await?;

    Ok(Json(DecisionResponse {
        message: format!("Loan request {}", request.status),
        loan_request: request,
        book_loan: loan,
    }))
}

/// Cancel one of the caller's own pending requests
#[utoipa::path(
    post,
    path = "/loan-requests/{id}/cancel",
    tag = "loan-requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan request ID")
    ),
    responses(
        (status = 200, description = "Request canceled", body = LoanRequestResponse),
        (status = 403, description = "Not the request owner"),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Request already processed")
    )
)]
pub async fn cancel_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<LoanRequestResponse>> {
    let request = state
        .services
        .loan_requests
        .cancel(request_id, &claims)
        .await?;

    Ok(Json(LoanRequestResponse {
        message: "Loan request canceled".to_string(),
        loan_request: request,
    }))
}
