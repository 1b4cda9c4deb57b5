//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, patrons, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfmark API",
        version = "0.1.0",
        description = "School Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::change_password,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        // Loans
        loans::borrow_book,
        loans::return_book,
        loans::loan_history,
        loans::patron_loans,
        loans::active_loan_count,
        // Patrons
        patrons::list_patrons,
        patrons::get_patron,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::RegisterRequest,
            auth::RegisterResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::ChangePasswordRequest,
            // Books
            crate::models::book::Book,
            crate::models::book::BookStatus,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookQuery,
            // Loans
            loans::BorrowRequest,
            loans::BorrowResponse,
            loans::ReturnRequest,
            loans::ReturnResponse,
            loans::ActiveLoanCountResponse,
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::ReturnStatus,
            crate::models::loan::LoanHistoryQuery,
            // Patrons
            crate::models::patron::Patron,
            crate::models::patron::PatronType,
            crate::models::patron::Role,
            // Stats
            stats::StatsResponse,
            stats::BookStats,
            stats::LoanStats,
            stats::PatronStats,
            stats::StatEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog maintenance"),
        (name = "loans", description = "Loan ledger"),
        (name = "patrons", description = "Patron accounts"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
