// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sample resources guarded by the filter chain.

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::auth::Auth;

/// Response for the versioned resource endpoints.
#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub resource: &'static str,
    pub subject: String,
}

/// Identity of the caller as seen by the server.
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub authorities: Vec<String>,
}

pub async fn get_v1(Auth(principal): Auth) -> Json<ResourceResponse> {
    Json(ResourceResponse {
        resource: "v1",
        subject: principal.subject().to_string(),
    })
}

pub async fn get_v2(Auth(principal): Auth) -> Json<ResourceResponse> {
    Json(ResourceResponse {
        resource: "v2",
        subject: principal.subject().to_string(),
    })
}

pub async fn whoami(Auth(principal): Auth) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        subject: principal.subject().to_string(),
        email: principal.email().map(str::to_string),
        user_id: principal.user_id().map(str::to_string),
        authorities: principal.authorities().iter().cloned().collect(),
    })
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
