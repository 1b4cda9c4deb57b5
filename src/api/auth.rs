//! Authentication endpoints: registration, login, password change

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::patron::Role,
};

use super::AuthenticatedAccount;

/// Register account request
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    pub role: Role,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(length(min = 1, max = 64))]
    pub id_number: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    /// Student-only
    pub strand: Option<String>,
    /// Student-only
    pub grade_level: Option<String>,
}

/// Register response
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub id: i64,
    pub role: Role,
    pub message: String,
}

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub role: Role,
    pub id_number: String,
    pub password: String,
}

/// Login response with bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub account_id: i64,
    pub role: Role,
    pub full_name: String,
}

/// Change password request
#[derive(Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    #[validate(length(min = 6, max = 128))]
    pub new_password: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "ID number already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state
        .services
        .identity
        .register(
            request.role,
            &request.full_name,
            &request.id_number,
            &request.password,
            request.strand.as_deref(),
            request.grade_level.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id,
            role: request.role,
            message: "Account registered successfully".to_string(),
        }),
    ))
}

/// Log in and obtain a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, claims) = state
        .services
        .identity
        .login(request.role, &request.id_number, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        account_id: claims.account_id,
        role: claims.role,
        full_name: claims.full_name,
    }))
}

/// Change the authenticated account's password
#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Invalid current password")
    )
)]
pub async fn change_password(
    State(state): State<crate::AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
    Json(request): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .identity
        .change_password(
            claims.role,
            &claims.sub,
            &request.old_password,
            &request.new_password,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
