// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated caller representation.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::roles;

/// Decoded token payload, claim name to claim value.
pub type Claims = Map<String, Value>;

/// Identity and authorities derived from a validated bearer token.
///
/// Only [`TokenValidator`](super::TokenValidator) builds these, so a
/// `Principal` always stands for a token that passed every check. It is bound
/// to one request and never mutated afterwards.
#[derive(Clone, PartialEq)]
pub struct Principal {
    subject: String,
    email: Option<String>,
    user_id: Option<String>,
    raw_token: String,
    claims: Claims,
    authorities: BTreeSet<String>,
}

impl Principal {
    pub(crate) fn new(
        subject: String,
        email: Option<String>,
        user_id: Option<String>,
        raw_token: String,
        claims: Claims,
        authorities: BTreeSet<String>,
    ) -> Self {
        Self {
            subject,
            email,
            user_id,
            raw_token,
            claims,
            authorities,
        }
    }

    /// Token subject (`sub`).
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Same as [`subject`](Self::subject).
    pub fn name(&self) -> &str {
        &self.subject
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The bearer token this principal was built from.
    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Normalized authorities, always non-empty.
    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Deserialize a claim into `T`. `None` if absent or of another shape.
    pub fn claim_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.claims
            .get(name)
            .and_then(|value| T::deserialize(value).ok())
    }

    pub fn has_claim(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    /// Case-insensitive role check, with or without the `ROLE_` prefix.
    pub fn has_authority(&self, role: &str) -> bool {
        roles::has_role(&self.authorities, role)
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the bearer token
        f.debug_struct("Principal")
            .field("subject", &self.subject)
            .field("email", &self.email)
            .field("user_id", &self.user_id)
            .field("raw_token", &"[REDACTED]")
            .field("claims", &self.claims.keys().collect::<Vec<_>>())
            .field("authorities", &self.authorities)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_principal(subject: &str, authorities: &[&str]) -> Principal {
    let mut claims = Claims::new();
    claims.insert("sub".to_string(), Value::String(subject.to_string()));
    Principal::new(
        subject.to_string(),
        None,
        None,
        "header.payload.signature".to_string(),
        claims,
        authorities.iter().map(|a| a.to_string()).collect(),
    )
}
