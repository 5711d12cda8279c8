// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer JWT authentication and path-based role authorization.
//!
//! ## Request Flow
//!
//! 1. Client sends `Authorization: Bearer <JWT>`
//! 2. [`AuthenticationStage`]:
//!    - Verifies the RSA signature against the configured public key
//!    - Checks `exp`, `sub` and `iat`
//!    - Derives authorities from `roles` / `authorities` / `permissions` / `scope`
//!    - Binds a [`SecurityContext`] to the request
//! 3. [`AuthorizationStage`]:
//!    - Forwards unprotected paths
//!    - Requires the [`RoleMap`] role on protected paths (fail-closed)
//!
//! ## Security
//!
//! - Authentication is required on every path the chain is mounted on
//! - Rejection reasons are logged, clients only see a generic error code
//! - No state is shared between requests apart from read-only configuration

pub mod authentication;
pub mod authorization;
pub mod error;
pub mod extractor;
pub mod key;
pub mod middleware;
pub mod principal;
pub mod roles;
pub mod stage;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

pub use authentication::AuthenticationStage;
pub use authorization::{AuthorizationStage, ExactPath, PathPrefix, ProtectedEndpoints, RequestMatcher};
pub use error::{AuthError, ValidationFailure};
pub use extractor::Auth;
pub use key::{KeyError, VerificationKey};
pub use middleware::security_filter;
pub use principal::{Claims, Principal};
pub use roles::RoleMap;
pub use stage::{Decision, SecurityContext, Stage, StageChain};
pub use validator::TokenValidator;

/// The standard two-stage chain: authentication, then authorization.
pub fn security_chain(
    validator: Arc<TokenValidator>,
    protected: ProtectedEndpoints,
    role_map: Arc<RoleMap>,
) -> StageChain {
    StageChain::new()
        .then(AuthenticationStage::new(validator))
        .then(AuthorizationStage::new(protected, role_map))
}
