//! SeaORM entity definitions.
//!
//! These are database-specific entities separate from domain models.

pub mod password_recovery;
pub mod role;
pub mod user;
pub mod user_role;
