//! Loan ledger endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{Loan, LoanDetails, LoanHistoryQuery},
        patron::{PatronType, Role},
    },
};

use super::AuthenticatedAccount;

/// Borrow request. Patrons borrow for themselves; admins must name the
/// patron they are borrowing for.
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// Book ID to borrow
    pub book_id: i64,
    /// Patron ID (admin requests only)
    pub patron_id: Option<i64>,
    /// Patron type (admin requests only)
    pub patron_type: Option<PatronType>,
}

/// Borrow response
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// New loan ID
    pub loan_id: i64,
    pub message: String,
}

/// Return request
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// Physical condition note recorded at return
    pub condition: Option<String>,
    /// Book ID cross-check; rejected if it does not match the loan
    pub book_id: Option<i64>,
}

/// Return response with the closed ledger entry
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub status: String,
    pub loan: Loan,
}

/// Active loan count response
#[derive(Serialize, ToSchema)]
pub struct ActiveLoanCountResponse {
    pub patron_id: i64,
    pub active_loans: i64,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowResponse),
        (status = 404, description = "Book or patron not found"),
        (status = 409, description = "Book is not available"),
        (status = 422, description = "Borrowing limit exceeded")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let (patron_id, patron_type) = if claims.role == Role::Admin {
        match (request.patron_id, request.patron_type) {
            (Some(id), Some(pt)) => (id, pt),
            _ => {
                return Err(AppError::BadRequest(
                    "patron_id and patron_type are required for admin borrow".to_string(),
                ))
            }
        }
    } else {
        claims.patron()?
    };

    let loan_id = state
        .services
        .ledger
        .borrow_book(patron_id, patron_type, request.book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            loan_id,
            message: "Book borrowed successfully".to_string(),
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan is already closed")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
    Path(loan_id): Path<i64>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<ReturnResponse>> {
    // Patrons may only return their own loans
    if claims.role != Role::Admin {
        let (patron_id, patron_type) = claims.patron()?;
        let loan = state.services.ledger.get_loan(loan_id).await?;
        if loan.patron_id != patron_id || loan.patron_type != patron_type {
            return Err(AppError::Authorization(
                "Cannot return another patron's loan".to_string(),
            ));
        }
    }

    let loan = state
        .services
        .ledger
        .return_book(
            loan_id,
            request.book_id,
            request.condition.as_deref().unwrap_or("-"),
        )
        .await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        loan,
    }))
}

/// Full borrowing history with optional filters (admin only)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanHistoryQuery),
    responses(
        (status = 200, description = "Borrowing history", body = Vec<LoanDetails>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn loan_history(
    State(state): State<crate::AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
    Query(query): Query<LoanHistoryQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_admin()?;

    let loans = state.services.ledger.loan_history(&query).await?;
    Ok(Json(loans))
}

/// A patron's borrowing history
#[utoipa::path(
    get,
    path = "/patrons/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Patron ID")
    ),
    responses(
        (status = 200, description = "Patron's loans", body = Vec<LoanDetails>),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn patron_loans(
    State(state): State<crate::AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
    Path(patron_id): Path<i64>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_self_or_admin(patron_id)?;

    let patron = state.services.identity.get_patron(patron_id).await?;
    let loans = state
        .services
        .ledger
        .patron_history(patron.id, patron.patron_type)
        .await?;
    Ok(Json(loans))
}

/// A patron's open-loan count
#[utoipa::path(
    get,
    path = "/patrons/{id}/loans/count",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Patron ID")
    ),
    responses(
        (status = 200, description = "Open loan count", body = ActiveLoanCountResponse),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn active_loan_count(
    State(state): State<crate::AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
    Path(patron_id): Path<i64>,
) -> AppResult<Json<ActiveLoanCountResponse>> {
    claims.require_self_or_admin(patron_id)?;

    let patron = state.services.identity.get_patron(patron_id).await?;
    let active_loans = state
        .services
        .ledger
        .active_loan_count(patron.id, patron.patron_type)
        .await?;

    Ok(Json(ActiveLoanCountResponse {
        patron_id,
        active_loans,
    }))
}
