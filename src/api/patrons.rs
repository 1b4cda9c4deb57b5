//! Patron listing endpoints (admin screens)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::patron::{Patron, PatronType},
};

use super::AuthenticatedAccount;

/// Patron list filters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PatronQuery {
    /// Restrict to one role
    pub patron_type: Option<PatronType>,
}

/// List registered patrons (admin only)
#[utoipa::path(
    get,
    path = "/patrons",
    tag = "patrons",
    security(("bearer_auth" = [])),
    params(PatronQuery),
    responses(
        (status = 200, description = "Registered patrons", body = Vec<Patron>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_patrons(
    State(state): State<crate::AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
    Query(query): Query<PatronQuery>,
) -> AppResult<Json<Vec<Patron>>> {
    claims.require_admin()?;

    let patrons = state
        .services
        .identity
        .list_patrons(query.patron_type)
        .await?;
    Ok(Json(patrons))
}

/// Get a patron profile
#[utoipa::path(
    get,
    path = "/patrons/{id}",
    tag = "patrons",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Patron ID")
    ),
    responses(
        (status = 200, description = "Patron profile", body = Patron),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn get_patron(
    State(state): State<crate::AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
    Path(id): Path<i64>,
) -> AppResult<Json<Patron>> {
    claims.require_self_or_admin(id)?;

    let patron = state.services.identity.get_patron(id).await?;
    Ok(Json(patron))
}
