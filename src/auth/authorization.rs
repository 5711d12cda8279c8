// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-based authorization stage.
//!
//! ## Decision procedure
//!
//! 1. No authenticated [`SecurityContext`] bound → `Unauthorized`
//! 2. Path not matched by [`ProtectedEndpoints`] → forward
//! 3. No [`RoleMap`] entry for the exact path → `Forbidden` (fail-closed)
//! 4. Required role held (case-insensitive, prefix optional) → forward,
//!    otherwise `Forbidden`
//!
//! Each branch returns exactly one decision.

use std::sync::Arc;

use axum::http::request::Parts;

use super::roles::{has_role, RoleMap};
use super::stage::{Decision, SecurityContext, Stage};
use super::AuthError;

/// Suffix that turns a configured path into a prefix matcher.
const PREFIX_WILDCARD: &str = "/**";

/// Decides whether a request path falls under role enforcement.
pub trait RequestMatcher: Send + Sync + std::fmt::Debug {
    fn matches(&self, path: &str) -> bool;
}

/// Matches one path exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactPath(pub String);

impl RequestMatcher for ExactPath {
    fn matches(&self, path: &str) -> bool {
        path == self.0
    }
}

/// Matches a path and everything below it (`/admin` covers `/admin/users`
/// but not `/administrator`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix(pub String);

impl RequestMatcher for PathPrefix {
    fn matches(&self, path: &str) -> bool {
        let prefix = self.0.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// OR-set of matchers naming the protected endpoints.
#[derive(Debug, Clone, Default)]
pub struct ProtectedEndpoints {
    matchers: Vec<Arc<dyn RequestMatcher>>,
}

impl ProtectedEndpoints {
    /// No protected endpoints.
    pub fn none() -> Self {
        Self::default()
    }

    /// Exact-match set over `paths`.
    pub fn exact<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths
            .into_iter()
            .fold(Self::none(), |set, path| set.with(ExactPath(path.into())))
    }

    /// Parse configured patterns. `"/admin/**"` is a prefix matcher, anything
    /// else matches exactly. Blank entries are ignored.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns.into_iter().fold(Self::none(), |set, pattern| {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                set
            } else if let Some(prefix) = pattern.strip_suffix(PREFIX_WILDCARD) {
                set.with(PathPrefix(prefix.to_string()))
            } else {
                set.with(ExactPath(pattern.to_string()))
            }
        })
    }

    /// Add a matcher.
    pub fn with(mut self, matcher: impl RequestMatcher + 'static) -> Self {
        self.matchers.push(Arc::new(matcher));
        self
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|matcher| matcher.matches(path))
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Enforces the role map against the principal bound by authentication.
///
/// Must run after [`AuthenticationStage`](super::AuthenticationStage).
#[derive(Debug, Clone)]
pub struct AuthorizationStage {
    protected: ProtectedEndpoints,
    role_map: Arc<RoleMap>,
}

impl AuthorizationStage {
    pub fn new(protected: ProtectedEndpoints, role_map: Arc<RoleMap>) -> Self {
        Self {
            protected,
            role_map,
        }
    }

    /// Decide for `path` given the bound context, if any.
    pub fn decide(&self, context: Option<&SecurityContext>, path: &str) -> Decision {
        let context = match context {
            Some(context) if context.is_authenticated() => context,
            _ => return Decision::Reject(AuthError::Unauthorized),
        };

        if !self.protected.matches(path) {
            return Decision::Forward;
        }

        let Some(required) = self.role_map.required_role(path) else {
            tracing::warn!(path = %path, "protected path has no role mapping");
            return Decision::Reject(AuthError::Forbidden);
        };

        if has_role(context.authorities(), required) {
            Decision::Forward
        } else {
            tracing::debug!(
                subject = %context.principal().subject(),
                required_role = %required,
                "required role not held"
            );
            Decision::Reject(AuthError::Forbidden)
        }
    }
}

impl Stage for AuthorizationStage {
    fn name(&self) -> &'static str {
        "authorization"
    }

    fn inspect(&self, request: &mut Parts) -> Decision {
        self.decide(
            request.extensions.get::<SecurityContext>(),
            request.uri.path(),
        )
    }
}
