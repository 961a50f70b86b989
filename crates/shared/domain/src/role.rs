//! Roles and role sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_ADMIN, ROLE_SEPARATOR};

/// Role reference data, looked up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

/// Ordered set of role names held by an account or asserted for a requester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// Empty role set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a delimited list such as `ROLE_USER,ROLE_ADMIN`.
    ///
    /// Brackets, quotes and whitespace around names are ignored so that
    /// `[ROLE_USER, ROLE_ADMIN]` and `"ROLE_USER"` parse the same way.
    /// Empty segments are dropped.
    pub fn parse_delimited(raw: &str) -> Self {
        raw.split(ROLE_SEPARATOR)
            .map(|part| part.trim_matches(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | '"')))
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Add a role name
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    /// Exact-name membership test
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Whether the set carries the administrative role
    pub fn is_admin(&self) -> bool {
        self.contains(ROLE_ADMIN)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Snapshot as an ordered list (used for token claims)
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<&Role> for RoleSet {
    fn from(role: &Role) -> Self {
        std::iter::once(role.name.clone()).collect()
    }
}
