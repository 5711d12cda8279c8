// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Two layers:
//!
//! - [`ValidationFailure`] - why a token was refused by the validator. These
//!   reason codes are logged but never sent back to the caller.
//! - [`AuthError`] - the rejection a stage hands to the transport. Every token
//!   failure collapses into the same generic `invalid_token` response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Reason a bearer token failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ValidationFailure {
    /// Not a well-formed signed token (structure, encoding, algorithm, size).
    #[error("token is malformed")]
    MalformedToken,
    /// Signature does not verify against the configured key.
    #[error("token signature is invalid")]
    BadSignature,
    /// `exp` is in the past.
    #[error("token has expired")]
    Expired,
    /// `sub` is absent, not a string, or blank.
    #[error("token subject is missing")]
    MissingSubject,
    /// `iat` is in the future.
    #[error("token was issued in the future")]
    IssuedInFuture,
}

impl ValidationFailure {
    /// Stable reason code for logs.
    pub fn reason_code(&self) -> &'static str {
        match self {
            ValidationFailure::MalformedToken => "MALFORMED",
            ValidationFailure::BadSignature => "BAD_SIGNATURE",
            ValidationFailure::Expired => "EXPIRED",
            ValidationFailure::MissingSubject => "MISSING_SUBJECT",
            ValidationFailure::IssuedInFuture => "ISSUED_IN_FUTURE",
        }
    }
}

/// Terminal rejection produced by a filter stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header, or it does not use the `Bearer ` scheme.
    #[error("Authorization header is missing or invalid (expected 'Bearer <token>')")]
    MissingOrInvalidAuthHeader,
    /// The bearer token failed validation.
    #[error("The access token is invalid or expired")]
    InvalidToken(#[from] ValidationFailure),
    /// No authenticated security context is bound to the request.
    #[error("Authentication is required")]
    Unauthorized,
    /// Authenticated, but the required role is not held or not configured.
    #[error("Insufficient permissions for this resource")]
    Forbidden,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingOrInvalidAuthHeader => "missing_or_invalid_auth_header",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::Unauthorized => "unauthorized",
            AuthError::Forbidden => "forbidden",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingOrInvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Reason code for logging. Validation failures keep their precise cause.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidToken(failure) => failure.reason_code(),
            AuthError::MissingOrInvalidAuthHeader => "MISSING_OR_INVALID_HEADER",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
