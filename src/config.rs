// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the parsed [`Config`]. Everything
//! is read once at startup and is immutable afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_PUBLIC_KEY` | RSA verification key (base64 SPKI DER or PEM) | Required |
//! | `REQUEST_ROLE_MAP` | JSON object mapping exact path to required role | `{}` |
//! | `PROTECTED_PATHS` | Comma-separated protected paths (`/x/**` = prefix) | `/v1` |
//! | `JWT_CLOCK_SKEW_SECS` | Tolerated clock skew for `exp` / `iat` | `0` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{KeyError, ProtectedEndpoints, RoleMap, TokenValidator, VerificationKey};

pub const JWT_PUBLIC_KEY_ENV: &str = "JWT_PUBLIC_KEY";
pub const REQUEST_ROLE_MAP_ENV: &str = "REQUEST_ROLE_MAP";
pub const PROTECTED_PATHS_ENV: &str = "PROTECTED_PATHS";
pub const JWT_CLOCK_SKEW_SECS_ENV: &str = "JWT_CLOCK_SKEW_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PROTECTED_PATHS: &str = "/v1";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("JWT_PUBLIC_KEY is invalid: {0}")]
    Key(#[from] KeyError),
    #[error("REQUEST_ROLE_MAP must be a JSON object of path -> role: {0}")]
    RoleMap(#[from] serde_json::Error),
    #[error("{name} is invalid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Parsed process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub verification_key: VerificationKey,
    pub role_map: RoleMap,
    pub protected_paths: Vec<String>,
    pub clock_skew: Duration,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup(JWT_PUBLIC_KEY_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(JWT_PUBLIC_KEY_ENV))?;
        let verification_key = VerificationKey::parse(&key)?;

        let role_map = match lookup(REQUEST_ROLE_MAP_ENV) {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)?,
            _ => RoleMap::new(),
        };

        let protected_paths = lookup(PROTECTED_PATHS_ENV)
            .unwrap_or_else(|| DEFAULT_PROTECTED_PATHS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .collect();

        let clock_skew = match lookup(JWT_CLOCK_SKEW_SECS_ENV) {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: JWT_CLOCK_SKEW_SECS_ENV,
                value: raw.clone(),
            })?),
            None => Duration::ZERO,
        };

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = lookup(LOG_FORMAT_ENV)
            .map(|raw| LogFormat::parse(&raw))
            .unwrap_or_default();

        Ok(Self {
            verification_key,
            role_map,
            protected_paths,
            clock_skew,
            host,
            port,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                value: self.host.clone(),
            })
    }

    pub fn token_validator(&self) -> TokenValidator {
        TokenValidator::new(self.verification_key.clone()).with_leeway(self.clock_skew)
    }

    pub fn protected_endpoints(&self) -> ProtectedEndpoints {
        ProtectedEndpoints::from_patterns(&self.protected_paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn key_is_required() {
        let result = Config::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::Missing(JWT_PUBLIC_KEY_ENV))));
    }

    #[test]
    fn defaults_apply() {
        let config =
            Config::from_lookup(lookup(&[(JWT_PUBLIC_KEY_ENV, test_support::PUBLIC_KEY_DER_B64)]))
                .unwrap();

        assert!(config.role_map.is_empty());
        assert_eq!(config.protected_paths, vec!["/v1".to_string()]);
        assert_eq!(config.clock_skew, Duration::ZERO);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn parses_all_variables() {
        let config = Config::from_lookup(lookup(&[
            (JWT_PUBLIC_KEY_ENV, test_support::PUBLIC_KEY_PEM),
            (REQUEST_ROLE_MAP_ENV, r#"{"/v1":"ADMIN","/v2":"USER"}"#),
            (PROTECTED_PATHS_ENV, "/v1, /v2 ,/admin/**"),
            (JWT_CLOCK_SKEW_SECS_ENV, "30"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (LOG_FORMAT_ENV, "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.role_map.required_role("/v2"), Some("USER"));
        assert_eq!(config.protected_paths, vec!["/v1", "/v2", "/admin/**"]);
        assert!(config.protected_endpoints().matches("/admin/users"));
        assert_eq!(config.clock_skew, Duration::from_secs(30));
        assert_eq!(config.token_validator().leeway(), Duration::from_secs(30));
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_bad_role_map() {
        let result = Config::from_lookup(lookup(&[
            (JWT_PUBLIC_KEY_ENV, test_support::PUBLIC_KEY_PEM),
            (REQUEST_ROLE_MAP_ENV, r#"["/v1"]"#),
        ]));
        assert!(matches!(result, Err(ConfigError::RoleMap(_))));
    }

    #[test]
    fn rejects_bad_port() {
        let result = Config::from_lookup(lookup(&[
            (JWT_PUBLIC_KEY_ENV, test_support::PUBLIC_KEY_PEM),
            (PORT_ENV, "eighty"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: PORT_ENV, .. })
        ));
    }

    #[test]
    fn rejects_bad_clock_skew() {
        for raw in ["-5", "abc"] {
            let result = Config::from_lookup(lookup(&[
                (JWT_PUBLIC_KEY_ENV, test_support::PUBLIC_KEY_PEM),
                (JWT_CLOCK_SKEW_SECS_ENV, raw),
            ]));
            assert!(
                matches!(
                    result,
                    Err(ConfigError::Invalid { name: JWT_CLOCK_SKEW_SECS_ENV, .. })
                ),
                "skew {raw:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_key() {
        let result = Config::from_lookup(lookup(&[(JWT_PUBLIC_KEY_ENV, "%%%")]));
        assert!(matches!(result, Err(ConfigError::Key(_))));
    }
}
