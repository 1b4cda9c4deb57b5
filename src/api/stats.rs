//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedAccount;

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Catalog statistics
    pub books: BookStats,
    /// Loan statistics
    pub loans: LoanStats,
    /// Patron statistics
    pub patrons: PatronStats,
}

#[derive(Serialize, ToSchema)]
pub struct BookStats {
    /// Total books in the catalog
    pub total: i64,
    /// Books currently available
    pub available: i64,
    /// Books currently out
    pub borrowed: i64,
}

#[derive(Serialize, ToSchema)]
pub struct LoanStats {
    /// Open loans (Active or Overdue)
    pub open: i64,
    /// Open loans past their due date
    pub overdue: i64,
    /// Open loans by book category
    pub open_by_category: Vec<StatEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct PatronStats {
    /// Total registered patrons
    pub total: i64,
    pub students: i64,
    pub instructors: i64,
}

#[derive(Serialize, ToSchema)]
pub struct StatEntry {
    /// Label
    pub label: String,
    /// Value
    pub value: i64,
}

/// Get library statistics (admin only)
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
) -> AppResult<Json<StatsResponse>> {
    claims.require_admin()?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
