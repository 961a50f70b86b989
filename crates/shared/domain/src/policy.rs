//! Authorization policy for protected account operations.
//!
//! Identity and roles are asserted by the upstream gateway after it has
//! verified the caller's token; this module only decides allow/deny from
//! those asserted values. Every protected operation calls into it before
//! touching the account store.

use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::role::RoleSet;

/// Identity asserted by the gateway for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: Uuid,
    pub roles: RoleSet,
}

impl Requester {
    pub fn new(id: Uuid, roles: RoleSet) -> Self {
        Self { id, roles }
    }

    /// Shorthand for [`check_ownership_or_admin`] with this requester.
    pub fn ensure_can_act_on(&self, target_id: Uuid) -> DomainResult<()> {
        check_ownership_or_admin(target_id, self.id, &self.roles)
    }

    /// Shorthand for [`check_is_admin`] with this requester's roles.
    pub fn ensure_admin(&self) -> DomainResult<()> {
        check_is_admin(&self.roles)
    }
}

/// Allow when the requester is the target account or holds the admin role.
pub fn check_ownership_or_admin(
    target_id: Uuid,
    requester_id: Uuid,
    requester_roles: &RoleSet,
) -> DomainResult<()> {
    if requester_id == target_id || requester_roles.is_admin() {
        Ok(())
    } else {
        Err(DomainError::AccessDenied)
    }
}

/// Allow only when the admin role is present.
pub fn check_is_admin(requester_roles: &RoleSet) -> DomainResult<()> {
    if requester_roles.is_admin() {
        Ok(())
    } else {
        Err(DomainError::AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ROLE_ADMIN, ROLE_USER};

    fn roles(names: &[&str]) -> RoleSet {
        names.iter().copied().collect()
    }

    #[test]
    fn test_ownership_or_admin_truth_table() {
        let target = Uuid::new_v4();
        let other = Uuid::new_v4();
        let cases = [
            (target, roles(&[]), true),
            (target, roles(&[ROLE_USER]), true),
            (target, roles(&[ROLE_ADMIN]), true),
            (other, roles(&[]), false),
            (other, roles(&[ROLE_USER]), false),
            (other, roles(&[ROLE_ADMIN]), true),
            (other, roles(&[ROLE_USER, ROLE_ADMIN]), true),
        ];

        for (requester, roles, allowed) in cases {
            let result = check_ownership_or_admin(target, requester, &roles);
            assert_eq!(result.is_ok(), allowed, "requester={requester} roles={roles:?}");
            if !allowed {
                assert_eq!(result, Err(DomainError::AccessDenied));
            }
        }
    }

    #[test]
    fn test_is_admin() {
        assert!(check_is_admin(&roles(&[ROLE_ADMIN])).is_ok());
        assert_eq!(check_is_admin(&roles(&[ROLE_USER])), Err(DomainError::AccessDenied));
        assert_eq!(check_is_admin(&RoleSet::new()), Err(DomainError::AccessDenied));
    }

    #[test]
    fn test_requester_shorthands() {
        let id = Uuid::new_v4();
        let user = Requester::new(id, roles(&[ROLE_USER]));
        assert!(user.ensure_can_act_on(id).is_ok());
        assert!(user.ensure_can_act_on(Uuid::new_v4()).is_err());
        assert!(user.ensure_admin().is_err());
    }
}
