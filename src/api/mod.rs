// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP routes served behind the security filter chain.
//!
//! Every route, including the fallback, passes through the chain, so a
//! request without a valid bearer token never reaches a handler.

use axum::{middleware, routing::get, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{auth::security_filter, state::AppState};

pub mod resources;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1", get(resources::get_v1))
        .route("/v2", get(resources::get_v2))
        .route("/me", get(resources::whoami))
        .fallback(resources::not_found)
        .layer(middleware::from_fn_with_state(
            state.security.clone(),
            security_filter,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{sign, sign_foreign, validator};
    use crate::auth::{ProtectedEndpoints, RoleMap};
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(
            validator(),
            ProtectedEndpoints::exact(["/v1", "/admin"]),
            RoleMap::new().with_role("/v1", "ADMIN"),
        );
        router(state)
    }

    async fn send(path: &str, authorization: Option<String>) -> Response {
        let mut builder = Request::builder().uri(path);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn bearer(claims: Value) -> Option<String> {
        Some(format!("Bearer {}", sign(&claims)))
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let _ = app().into_make_service();
    }

    #[tokio::test]
    async fn protected_path_with_required_role_is_forwarded() {
        let response = send("/v1", bearer(json!({ "sub": "alice", "roles": ["admin"] }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body = json_body(response).await;
        assert_eq!(body["resource"], "v1");
        assert_eq!(body["subject"], "alice");
    }

    #[tokio::test]
    async fn protected_path_without_role_is_forbidden() {
        let response = send("/v1", bearer(json!({ "sub": "bob", "roles": ["USER"] }))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error_code"], "forbidden");
    }

    #[tokio::test]
    async fn default_role_cannot_reach_protected_path() {
        let response = send("/v1", bearer(json!({ "sub": "bob" }))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unprotected_path_still_requires_authentication() {
        let response = send("/v2", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["error_code"],
            "missing_or_invalid_auth_header"
        );
    }

    #[tokio::test]
    async fn unprotected_path_is_open_to_any_authenticated_caller() {
        let response = send("/v2", bearer(json!({ "sub": "carol" }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["resource"], "v2");
    }

    #[tokio::test]
    async fn wrong_scheme_is_unauthorized() {
        let response = send("/v2", Some("Basic xyz".to_string())).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["error_code"],
            "missing_or_invalid_auth_header"
        );
    }

    #[tokio::test]
    async fn foreign_signature_is_unauthorized_with_generic_error() {
        let token = sign_foreign(&json!({ "sub": "mallory", "roles": ["ADMIN"] }));
        let response = send("/v1", Some(format!("Bearer {token}"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(response).await;
        assert_eq!(body["error_code"], "invalid_token");
        assert!(!body.to_string().contains("SIGNATURE"));
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let response = send("/v2", bearer(json!({ "sub": "alice", "exp": 1 }))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error_code"], "invalid_token");
    }

    #[tokio::test]
    async fn protected_path_without_mapping_is_forbidden() {
        let claims = json!({
            "sub": "root",
            "roles": ["ADMIN", "USER", "ROOT", "ADMINISTRATOR", "SUPERUSER"]
        });
        let response = send("/admin", bearer(claims)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_path_is_authenticated_before_not_found() {
        let response = send("/nowhere", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send("/nowhere", bearer(json!({ "sub": "alice" }))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn whoami_reports_principal() {
        let claims = json!({
            "sub": "alice",
            "email": "alice@example.com",
            "userId": "u-1",
            "scope": "read write"
        });
        let response = send("/me", bearer(claims)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["subject"], "alice");
        assert_eq!(body["email"], "alice@example.com");
        assert_eq!(body["user_id"], "u-1");
        assert_eq!(body["authorities"], json!(["ROLE_read", "ROLE_write"]));
    }
}
