//! Business logic: account lifecycle, authentication and token issuance.

mod account_service;
mod auth_service;
mod token;

pub use account_service::{AccountManager, AccountService};
pub use auth_service::{AuthService, Authenticator};
pub use token::{Claims, TokenIssuer, TokenResponse};

#[cfg(any(test, feature = "test-utils"))]
pub use account_service::MockAccountService;
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
