//! Account handlers.
//!
//! Identity comes from the gateway headers; the service applies the
//! authorization policy.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{AccountResponse, AccountUpdate, Cpf, SyncAccount};

use crate::extractors::{AccountId, GatewayIdentity, GatewayRoles, ValidatedJson};
use crate::state::AppState;

/// Profile update. Blank or absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountRequest {
    #[validate(length(max = 100, message = "Full name must be at most 100 characters"))]
    #[schema(example = "Maria Souza")]
    pub full_name: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "1990-05-17")]
    pub birth_date: Option<NaiveDate>,
}

/// Partial account pushed by an internal system
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SyncAccountRequest {
    pub id: Uuid,
    #[schema(example = "52998224725")]
    pub cpf: String,
    #[validate(length(max = 100, message = "Full name must be at most 100 characters"))]
    pub full_name: Option<String>,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 100, message = "Email is too long")
    )]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// CPF lookup query
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CpfQuery {
    /// CPF, 11 digits
    pub cpf: String,
}

/// Create account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts))
        .route("/me", get(get_current_account))
        .route("/search", get(find_by_cpf))
        .route("/sync", post(sync_account))
        .route(
            "/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
}

/// Get the requester's own account
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Accounts",
    security(("user_id" = [], "user_roles" = [])),
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Missing gateway identity"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_current_account(
    State(state): State<AppState>,
    GatewayIdentity(requester): GatewayIdentity,
) -> AppResult<Json<AccountResponse>> {
    let account = state
        .account_service
        .get_account(requester.id, &requester)
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

/// List all active accounts (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Accounts",
    security(("user_roles" = [])),
    responses(
        (status = 200, description = "Active accounts", body = Vec<AccountResponse>),
        (status = 401, description = "Missing gateway identity"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    GatewayRoles(roles): GatewayRoles,
) -> AppResult<Json<Vec<AccountResponse>>> {
    let accounts = state.account_service.list_accounts(&roles).await?;
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// Find an active account by CPF (in-person verification)
#[utoipa::path(
    get,
    path = "/users/search",
    tag = "Accounts",
    params(CpfQuery),
    responses(
        (status = 200, description = "Matching account", body = AccountResponse),
        (status = 400, description = "Invalid CPF"),
        (status = 404, description = "No active account with this CPF")
    )
)]
pub async fn find_by_cpf(
    State(state): State<AppState>,
    query: Result<Query<CpfQuery>, QueryRejection>,
) -> AppResult<Json<AccountResponse>> {
    let Query(query) = query.map_err(|e| AppError::bad_request(e.body_text()))?;
    let account = state.account_service.find_by_cpf(&query.cpf).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Create a partial account from an internal system
#[utoipa::path(
    post,
    path = "/users/sync",
    tag = "Accounts",
    request_body = SyncAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid CPF, validation error or id in use"),
        (status = 409, description = "CPF or email already registered")
    )
)]
pub async fn sync_account(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SyncAccountRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    let data = SyncAccount {
        id: payload.id,
        cpf: Cpf::parse(payload.cpf)?,
        full_name: payload.full_name,
        email: payload.email,
        created_at: payload.created_at,
    };

    let account = state.account_service.sync(data).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// Get an account by ID (own account or admin)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Accounts",
    security(("user_id" = [], "user_roles" = [])),
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 401, description = "Missing gateway identity"),
        (status = 403, description = "Forbidden - Own account unless admin"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    GatewayIdentity(requester): GatewayIdentity,
    AccountId(id): AccountId,
) -> AppResult<Json<AccountResponse>> {
    let account = state.account_service.get_account(id, &requester).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Update an account's profile (own account or admin)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Accounts",
    security(("user_id" = [], "user_roles" = [])),
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing gateway identity"),
        (status = 403, description = "Forbidden - Own account unless admin"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn update_account(
    State(state): State<AppState>,
    GatewayIdentity(requester): GatewayIdentity,
    AccountId(id): AccountId,
    ValidatedJson(payload): ValidatedJson<UpdateAccountRequest>,
) -> AppResult<Json<AccountResponse>> {
    let update = AccountUpdate {
        full_name: payload.full_name,
        birth_date: payload.birth_date,
    };

    let account = state
        .account_service
        .update_account(id, update, &requester)
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Soft delete an account (own account or admin)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Accounts",
    security(("user_id" = [], "user_roles" = [])),
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Missing gateway identity"),
        (status = 403, description = "Forbidden - Own account unless admin"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    GatewayIdentity(requester): GatewayIdentity,
    AccountId(id): AccountId,
) -> AppResult<StatusCode> {
    state.account_service.delete_account(id, &requester).await?;
    Ok(StatusCode::NO_CONTENT)
}
