// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorities, role comparison and the path -> role map.
//!
//! ## Canonical form
//!
//! An authority is a role name carrying the `ROLE_` prefix. Normalization only
//! adds the prefix; case is kept as issued. Comparison against a required role
//! is case-insensitive and accepts the authority with or without the prefix.

use std::collections::HashMap;

use serde::Deserialize;

/// Canonical authority prefix.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Authority granted when a token carries no role claims.
pub const DEFAULT_AUTHORITY: &str = "ROLE_USER";

/// Prefix `role` with [`ROLE_PREFIX`] unless it already has it.
pub fn normalize_authority(role: &str) -> String {
    if role.starts_with(ROLE_PREFIX) {
        role.to_string()
    } else {
        format!("{ROLE_PREFIX}{role}")
    }
}

/// Check whether any authority satisfies `required`.
///
/// `"admin"` matches `"ADMIN"`, `"ROLE_ADMIN"` and `"role_admin"`.
/// A blank `required` never matches.
pub fn has_role<'a, I>(authorities: I, required: &str) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    let required = required.trim();
    if required.is_empty() {
        return false;
    }

    let role_name = required.to_uppercase();
    let prefixed = format!("{ROLE_PREFIX}{role_name}");

    authorities.into_iter().any(|authority| {
        let authority = authority.to_uppercase();
        authority == prefixed || authority == role_name
    })
}

/// Static mapping from exact request path to the single role it requires.
///
/// Loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RoleMap(HashMap<String, String>);

impl RoleMap {
    /// Create an empty role map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the role required for `path`.
    pub fn with_role(mut self, path: impl Into<String>, role: impl Into<String>) -> Self {
        self.0.insert(path.into(), role.into());
        self
    }

    /// Role required for `path`. Blank entries count as missing.
    pub fn required_role(&self, path: &str) -> Option<&str> {
        self.0
            .get(path)
            .map(String::as_str)
            .filter(|role| !role.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P, R> FromIterator<(P, R)> for RoleMap
where
    P: Into<String>,
    R: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (P, R)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(path, role)| (path.into(), role.into()))
                .collect(),
        )
    }
}
