//! Identity asserted by the upstream gateway.
//!
//! The gateway verifies the caller's token and forwards the result as two
//! headers. They are trusted as-is; a missing or malformed header means the
//! request did not come through the gateway and is rejected as unauthorized.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use common::AppError;
use domain::{Requester, RoleSet};

/// Header carrying the authenticated account id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the delimited role names of the authenticated account
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Requester id and roles, for ownership-or-admin operations.
#[derive(Debug, Clone)]
pub struct GatewayIdentity(pub Requester);

/// Requester roles only, for admin-only operations.
#[derive(Debug, Clone)]
pub struct GatewayRoles(pub RoleSet);

#[async_trait]
impl<S> FromRequestParts<S> for GatewayIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, USER_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| AppError::Unauthorized)?;
        let roles = RoleSet::parse_delimited(header_value(parts, USER_ROLES_HEADER)?);

        Ok(GatewayIdentity(Requester::new(id, roles)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for GatewayRoles
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = header_value(parts, USER_ROLES_HEADER)?;
        Ok(GatewayRoles(RoleSet::parse_delimited(raw)))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .ok_or(AppError::Unauthorized)
}
