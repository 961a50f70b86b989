//! Repository layer for data access.

pub mod entities;
mod account_repository;
mod recovery_repository;
mod role_repository;

pub use account_repository::{AccountRepository, AccountStore};
pub use recovery_repository::{RecoveryRepository, RecoveryStore};
pub use role_repository::{RoleRepository, RoleStore};

#[cfg(any(test, feature = "test-utils"))]
pub use account_repository::MockAccountRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use recovery_repository::MockRecoveryRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use role_repository::MockRoleRepository;
