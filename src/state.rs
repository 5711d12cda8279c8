// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{self, ProtectedEndpoints, RoleMap, StageChain, TokenValidator};
use crate::config::Config;

/// Shared, read-only application state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub security: Arc<StageChain>,
}

impl AppState {
    pub fn new(
        validator: TokenValidator,
        protected: ProtectedEndpoints,
        role_map: RoleMap,
    ) -> Self {
        Self {
            security: Arc::new(auth::security_chain(
                Arc::new(validator),
                protected,
                Arc::new(role_map),
            )),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.token_validator(),
            config.protected_endpoints(),
            config.role_map.clone(),
        )
    }
}
