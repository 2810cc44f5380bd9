//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, bookcases, books, campuses, categories, health, loan_requests, loans, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblion API",
        version = "1.0.0",
        description = "Multi-Campus Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Biblion Team")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Loan requests
        loan_requests::submit_request,
        loan_requests::list_requests,
        loan_requests::my_requests,
        loan_requests::decide_request,
        loan_requests::cancel_request,
        // Loans
        loans::list_loans,
        loans::get_user_loans,
        loans::return_loan,
        loans::cancel_loan,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Campuses
        campuses::list_campuses,
        campuses::get_campus,
        campuses::create_campus,
        campuses::update_campus,
        // Categories
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Bookcases
        bookcases::list_bookcases,
        bookcases::get_bookcase,
        bookcases::create_bookcase,
        bookcases::update_bookcase,
        bookcases::delete_bookcase,
        bookcases::list_shelves,
        bookcases::create_shelf,
        bookcases::delete_shelf,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Books
            crate::models::book::Book,
            crate::models::book::BookKind,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Loan requests
            crate::models::loan_request::LoanRequestDetails,
            crate::models::loan_request::RequestStatus,
            crate::models::loan_request::Decision,
            crate::models::loan_request::DecideRequest,
            loan_requests::LoanRequestResponse,
            loan_requests::DecisionResponse,
            // Loans
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanStatus,
            loans::LoanClosedResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::Role,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Campuses
            crate::models::campus::Campus,
            crate::models::campus::CreateCampus,
            crate::models::campus::UpdateCampus,
            // Categories
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            // Bookcases
            crate::models::bookcase::Bookcase,
            crate::models::bookcase::Shelf,
            crate::models::bookcase::CreateBookcase,
            crate::models::bookcase::UpdateBookcase,
            crate::models::bookcase::CreateShelf,
            // Stats
            crate::services::stats::StatsOverview,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication"),
        (name = "books", description = "Catalog management"),
        (name = "loan-requests", description = "Loan request workflow"),
        (name = "loans", description = "Loan management"),
        (name = "users", description = "User management"),
        (name = "campuses", description = "Campus management"),
        (name = "categories", description = "Category management"),
        (name = "bookcases", description = "Bookcases and shelves"),
        (name = "stats", description = "Dashboard statistics"),
    )
)]
pub struct ApiDoc;

/// Create the router serving the OpenAPI document and Swagger UI
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
