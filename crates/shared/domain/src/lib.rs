//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the CPF value object, the account aggregate, credential hashing, password
//! recovery state and the authorization policy.

pub mod account;
pub mod constants;
pub mod cpf;
pub mod error;
pub mod password;
pub mod policy;
pub mod recovery;
pub mod role;

pub use account::{Account, AccountResponse, AccountUpdate, NewAccount, NewAccountProfile, SyncAccount};
pub use constants::*;
pub use cpf::Cpf;
pub use error::{DomainError, DomainResult};
pub use password::Password;
pub use policy::{check_is_admin, check_ownership_or_admin, Requester};
pub use recovery::PasswordRecovery;
pub use role::{Role, RoleSet};
