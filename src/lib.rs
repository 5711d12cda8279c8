// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer Gate - token authentication and authorization filter chain
//!
//! Validates RSA-signed bearer JWTs and enforces a static path -> role map
//! before requests reach axum handlers.
//!
//! ## Modules
//!
//! - `api` - Demo HTTP routes mounted behind the chain (Axum)
//! - `auth` - Token validation, filter stages and role enforcement
//! - `config` - Environment configuration
//! - `state` - Shared application state

pub mod api;
pub mod auth;
pub mod config;
pub mod state;
