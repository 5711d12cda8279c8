// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated principal.
//!
//! Use the `Auth` extractor in handlers mounted behind the filter chain:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is Arc<Principal>
//! }
//! ```

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::stage::SecurityContext;
use super::{AuthError, Principal};

/// Principal bound by the authentication stage.
///
/// The extractor never validates a token itself; it only reads the
/// [`SecurityContext`] left in the request extensions.
#[derive(Debug, Clone)]
pub struct Auth(pub Arc<Principal>);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .filter(|context| context.is_authenticated())
            .map(|context| Auth(context.principal().clone()))
            .ok_or(AuthError::Unauthorized)
    }
}
