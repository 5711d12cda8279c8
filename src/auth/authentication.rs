// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token authentication stage.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, request::Parts};

use super::stage::{Decision, SecurityContext, Stage};
use super::{AuthError, TokenValidator};

/// Scheme prefix, case-sensitive with a single space.
const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the bearer token, validates it and binds a [`SecurityContext`].
///
/// Requests without a usable `Authorization: Bearer <token>` header are
/// rejected before the validator is consulted.
#[derive(Debug, Clone)]
pub struct AuthenticationStage {
    validator: Arc<TokenValidator>,
}

impl AuthenticationStage {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }
}

/// The token part of an `Authorization` header value, if it uses the bearer scheme.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
}

impl Stage for AuthenticationStage {
    fn name(&self) -> &'static str {
        "authentication"
    }

    fn inspect(&self, request: &mut Parts) -> Decision {
        let Some(token) = bearer_token(request) else {
            return Decision::Reject(AuthError::MissingOrInvalidAuthHeader);
        };

        match self.validator.validate(token) {
            Ok(principal) => {
                tracing::debug!(subject = %principal.subject(), "bearer token accepted");
                request
                    .extensions
                    .insert(SecurityContext::authenticated(principal));
                Decision::Forward
            }
            Err(failure) => Decision::Reject(AuthError::InvalidToken(failure)),
        }
    }
}
