// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token validation.
//!
//! ## Checks (in order, first failure wins)
//!
//! 1. Size bound, structure and RSA signature
//! 2. `exp`, when present, is not in the past
//! 3. `sub` is present and not blank
//! 4. `iat`, when present, is not in the future
//!
//! Authority derivation then always succeeds, falling back to
//! [`DEFAULT_AUTHORITY`] when the token carries no usable role claim.
//!
//! Validation is a pure function of the token, the configured key and the
//! current time, so a single validator is shared across all requests.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, Validation};
use serde_json::Value;

use super::error::ValidationFailure;
use super::key::VerificationKey;
use super::principal::{Claims, Principal};
use super::roles::{normalize_authority, DEFAULT_AUTHORITY};

/// Maximum accepted token length (8KB). Longer tokens are refused before parsing.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// List claims consulted for authorities, highest priority first.
const ROLE_LIST_CLAIMS: [&str; 3] = ["roles", "authorities", "permissions"];

/// Space-delimited fallback claim.
const SCOPE_CLAIM: &str = "scope";

/// Validates RSA-signed bearer tokens and turns them into [`Principal`]s.
#[derive(Clone)]
pub struct TokenValidator {
    key: VerificationKey,
    validation: Validation,
    leeway: Duration,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl TokenValidator {
    /// Create a validator for tokens signed by the holder of `key`.
    pub fn new(key: VerificationKey) -> Self {
        // jsonwebtoken only verifies the signature here; time and subject
        // checks run afterwards so each gets its own failure reason.
        let mut validation = Validation::new(Algorithm::RS256);
        // PKCS#1 v1.5 only. PS* and HMAC headers fail as malformed.
        validation.algorithms = vec![Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            key,
            validation,
            leeway: Duration::ZERO,
        }
    }

    /// Tolerate this much clock skew on `exp` and `iat`.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    /// Validate `token` against the current time.
    pub fn validate(&self, token: &str) -> Result<Principal, ValidationFailure> {
        self.validate_at(token, Utc::now())
    }

    /// Validate `token` as of `now`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, ValidationFailure> {
        if token.is_empty() || token.len() > MAX_TOKEN_SIZE_BYTES {
            return Err(ValidationFailure::MalformedToken);
        }

        let claims = decode::<Claims>(token, self.key.decoding_key(), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => ValidationFailure::BadSignature,
                _ => ValidationFailure::MalformedToken,
            })?
            .claims;

        let now_ms = now.timestamp_millis();
        let leeway_ms = i64::try_from(self.leeway.as_millis()).unwrap_or(i64::MAX);

        if let Some(exp_ms) = numeric_date_millis(&claims, "exp")? {
            if exp_ms.saturating_add(leeway_ms) < now_ms {
                return Err(ValidationFailure::Expired);
            }
        }

        let subject = match claims.get("sub").and_then(Value::as_str) {
            Some(sub) if !sub.trim().is_empty() => sub.to_string(),
            _ => return Err(ValidationFailure::MissingSubject),
        };

        if let Some(iat_ms) = numeric_date_millis(&claims, "iat")? {
            if iat_ms.saturating_sub(leeway_ms) > now_ms {
                return Err(ValidationFailure::IssuedInFuture);
            }
        }

        let authorities = derive_authorities(&claims);
        let email = string_claim(&claims, "email");
        let user_id = string_claim(&claims, "userId");

        Ok(Principal::new(
            subject,
            email,
            user_id,
            token.to_string(),
            claims,
            authorities,
        ))
    }
}

/// Read a NumericDate claim as epoch milliseconds.
///
/// Absent and `null` are both "not present". Any other non-number is malformed.
fn numeric_date_millis(claims: &Claims, name: &str) -> Result<Option<i64>, ValidationFailure> {
    match claims.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(secs) = n.as_i64() {
                Ok(Some(secs.saturating_mul(1000)))
            } else if n.as_u64().is_some() {
                Ok(Some(i64::MAX))
            } else if let Some(secs) = n.as_f64() {
                // float -> int casts saturate
                Ok(Some((secs * 1000.0) as i64))
            } else {
                Err(ValidationFailure::MalformedToken)
            }
        }
        Some(_) => Err(ValidationFailure::MalformedToken),
    }
}

fn string_claim(claims: &Claims, name: &str) -> Option<String> {
    claims.get(name).and_then(Value::as_str).map(str::to_string)
}

/// Derive the normalized authority set from role claims.
///
/// The first of `roles`, `authorities`, `permissions` that is present wins,
/// even if it yields nothing. Only when none is present is `scope` split on
/// whitespace. An empty result becomes `{ROLE_USER}`.
pub fn derive_authorities(claims: &Claims) -> BTreeSet<String> {
    let raw: Vec<&str> = match ROLE_LIST_CLAIMS.iter().find_map(|name| claims.get(*name)) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|role| !role.trim().is_empty())
            .collect(),
        Some(_) => Vec::new(),
        None => claims
            .get(SCOPE_CLAIM)
            .and_then(Value::as_str)
            .map(|scope| scope.split_whitespace().collect())
            .unwrap_or_default(),
    };

    if raw.is_empty() {
        tracing::info!("no roles found in token claims, using default authority");
        return BTreeSet::from([DEFAULT_AUTHORITY.to_string()]);
    }

    raw.into_iter().map(normalize_authority).collect()
}
