//! OpenAPI documentation.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::extractors::{USER_ID_HEADER, USER_ROLES_HEADER};
use crate::handlers::account_handler::{SyncAccountRequest, UpdateAccountRequest};
use crate::handlers::auth_handler::{
    LoginRequest, RecoveryCodeRequest, RegisterRequest, ResetPasswordRequest, ResetTokenResponse,
    VerifyCodeRequest,
};
use crate::service::TokenResponse;
use domain::AccountResponse;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth_handler::register,
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::send_recovery_code,
        crate::handlers::auth_handler::verify_recovery_code,
        crate::handlers::auth_handler::reset_password,
        crate::handlers::account_handler::get_current_account,
        crate::handlers::account_handler::list_accounts,
        crate::handlers::account_handler::find_by_cpf,
        crate::handlers::account_handler::sync_account,
        crate::handlers::account_handler::get_account,
        crate::handlers::account_handler::update_account,
        crate::handlers::account_handler::delete_account,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RecoveryCodeRequest,
            VerifyCodeRequest,
            ResetTokenResponse,
            ResetPasswordRequest,
            TokenResponse,
            AccountResponse,
            UpdateAccountRequest,
            SyncAccountRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and password recovery"),
        (name = "Accounts", description = "Account management endpoints"),
    )
)]
pub struct ApiDoc;

/// Gateway header schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_ID_HEADER))),
            );
            components.add_security_scheme(
                "user_roles",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_ROLES_HEADER))),
            );
        }
    }
}
