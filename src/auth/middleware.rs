// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum adapter for the filter chain.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let chain = Arc::new(auth::security_chain(validator, protected, role_map));
//!
//! let app = Router::new()
//!     .route("/v1", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(chain, security_filter));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::stage::{Decision, StageChain};

/// Run the chain on the request head, then either call the inner service
/// or answer with the rejection. Never both.
pub async fn security_filter(
    State(chain): State<Arc<StageChain>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    match chain.run(&mut parts) {
        Decision::Forward => next.run(Request::from_parts(parts, body)).await,
        Decision::Reject(err) => err.into_response(),
    }
}
