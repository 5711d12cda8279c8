// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request filter stages.
//!
//! A stage looks at the request head and returns exactly one [`Decision`].
//! Stages are chained in order by [`StageChain`]; the first rejection ends
//! the chain and nothing after it runs.
//!
//! Per-request state travels in the request extensions as a
//! [`SecurityContext`], never in shared or global state.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::http::request::Parts;

use super::{AuthError, Principal};

/// Outcome of a stage: pass the request on, or stop it here.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Forward,
    Reject(AuthError),
}

impl Decision {
    pub fn is_forward(&self) -> bool {
        matches!(self, Decision::Forward)
    }
}

/// One step of the filter chain.
pub trait Stage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Inspect (and possibly annotate) the request head.
    fn inspect(&self, request: &mut Parts) -> Decision;
}

/// Authentication state bound to a single request.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    principal: Arc<Principal>,
    authenticated: bool,
}

impl SecurityContext {
    /// Context for a principal that just passed token validation.
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Arc::new(principal),
            authenticated: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn unauthenticated(principal: Principal) -> Self {
        Self {
            principal: Arc::new(principal),
            authenticated: false,
        }
    }

    pub fn principal(&self) -> &Arc<Principal> {
        &self.principal
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        self.principal.authorities()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Ordered list of stages run against every request.
#[derive(Clone, Default)]
pub struct StageChain {
    stages: Vec<Arc<dyn Stage>>,
}

impl std::fmt::Debug for StageChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageChain")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl StageChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage to the end of the chain.
    pub fn then(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage in order, stopping at the first rejection.
    pub fn run(&self, request: &mut Parts) -> Decision {
        for stage in &self.stages {
            if let Decision::Reject(err) = stage.inspect(request) {
                tracing::warn!(
                    stage = stage.name(),
                    method = %request.method,
                    path = %request.uri.path(),
                    reason = err.reason(),
                    "request rejected"
                );
                return Decision::Reject(err);
            }
        }
        Decision::Forward
    }
}
