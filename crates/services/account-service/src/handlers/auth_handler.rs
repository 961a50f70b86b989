//! Authentication handlers: registration, login and password recovery.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use common::AppResult;
use domain::{AccountResponse, Cpf, NewAccount, NewAccountProfile};

use crate::extractors::ValidatedJson;
use crate::service::TokenResponse;
use crate::state::AppState;

/// Registration request
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// CPF, 11 digits
    #[schema(example = "52998224725")]
    pub cpf: String,
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    #[schema(example = "Maria Silva")]
    pub full_name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 100, message = "Email is too long")
    )]
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "correct horse")]
    pub password: String,
    #[schema(value_type = String, format = Date, example = "1990-05-17")]
    pub birth_date: NaiveDate,
}

/// Login request
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request a recovery code
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecoveryCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "maria@example.com")]
    pub email: String,
}

/// Exchange a recovery code for a reset token
#[derive(Deserialize, Validate, ToSchema)]
pub struct VerifyCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(equal = 6, message = "Recovery code must have 6 digits"))]
    #[schema(example = "042917")]
    pub code: String,
}

/// Reset token handed back after a code is verified
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResetTokenResponse {
    pub token: String,
}

/// Set a new password with a reset token
#[derive(Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/recovery/code", post(send_recovery_code))
        .route("/recovery/verify", post(verify_recovery_code))
        .route("/recovery/reset", post(reset_password))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid CPF or validation error"),
        (status = 409, description = "CPF or email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    let data = NewAccount {
        profile: NewAccountProfile {
            cpf: Cpf::parse(payload.cpf)?,
            full_name: payload.full_name,
            email: payload.email,
            birth_date: payload.birth_date,
        },
        password: payload.password,
    };

    let account = state.account_service.register(data).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed access token", body = TokenResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(token))
}

/// Send a recovery code to the account's email
///
/// Always accepted, whether or not the email belongs to an account.
#[utoipa::path(
    post,
    path = "/auth/recovery/code",
    tag = "Authentication",
    request_body = RecoveryCodeRequest,
    responses(
        (status = 202, description = "Request accepted")
    )
)]
pub async fn send_recovery_code(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RecoveryCodeRequest>,
) -> AppResult<StatusCode> {
    state.auth_service.send_recovery_code(&payload.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Verify a recovery code
#[utoipa::path(
    post,
    path = "/auth/recovery/verify",
    tag = "Authentication",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Reset token", body = ResetTokenResponse),
        (status = 400, description = "Invalid or expired recovery code")
    )
)]
pub async fn verify_recovery_code(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyCodeRequest>,
) -> AppResult<Json<ResetTokenResponse>> {
    let token = state
        .auth_service
        .verify_recovery_code(&payload.email, &payload.code)
        .await?;
    Ok(Json(ResetTokenResponse { token }))
}

/// Reset the password with a reset token
#[utoipa::path(
    post,
    path = "/auth/recovery/reset",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid or expired reset token")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .auth_service
        .reset_password(&payload.email, &payload.token, &payload.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
