//! Custom request extractors.

mod account_path;
mod gateway;
mod validated_json;

pub use account_path::AccountId;
pub use gateway::{GatewayIdentity, GatewayRoles, USER_ID_HEADER, USER_ROLES_HEADER};
pub use validated_json::ValidatedJson;
