// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! typed settings built from them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory for the member database | unset (in-memory) |
//! | `JWT_SECRET` | HMAC secret for signing tokens (>= 32 bytes) | Required |
//! | `JWT_ACCESS_TTL_SECS` | Access token lifetime | `3600` |
//! | `JWT_REFRESH_TTL_SECS` | Refresh token lifetime | `1209600` |
//! | `JWT_ACCESS_HEADER` | Header carrying the access token | `Authorization` |
//! | `JWT_REFRESH_HEADER` | Header carrying the refresh token | `Authorization-refresh` |
//! | `JWT_SCHEME` | Scheme marker preceding token values | `Bearer` |
//! | `JWT_SCHEME_POLICY` | `optional`, `required` or `disabled` | `optional` |
//! | `LOGIN_PATH` | Path that bypasses the authentication gate | `/login` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use axum::http::HeaderName;

use crate::auth::bearer::SchemePolicy;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Directory holding `members.redb`. When unset the service keeps members
/// in memory and loses them on restart.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_ACCESS_TTL_ENV: &str = "JWT_ACCESS_TTL_SECS";
pub const JWT_REFRESH_TTL_ENV: &str = "JWT_REFRESH_TTL_SECS";
pub const JWT_ACCESS_HEADER_ENV: &str = "JWT_ACCESS_HEADER";
pub const JWT_REFRESH_HEADER_ENV: &str = "JWT_REFRESH_HEADER";
pub const JWT_SCHEME_ENV: &str = "JWT_SCHEME";
pub const JWT_SCHEME_POLICY_ENV: &str = "JWT_SCHEME_POLICY";
pub const LOGIN_PATH_ENV: &str = "LOGIN_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 3600;
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 1_209_600;
pub const DEFAULT_ACCESS_HEADER: &str = "Authorization";
pub const DEFAULT_REFRESH_HEADER: &str = "Authorization-refresh";
pub const DEFAULT_SCHEME: &str = "Bearer";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Minimum HS512 secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Paths with fixed routes, which the login path may not take over.
pub const RESERVED_PATHS: &[&str] = &[
    "/logout",
    "/signUp",
    "/member",
    "/member/password",
    "/health",
    "/health/live",
    "/health/ready",
    "/docs",
    "/api-doc/openapi.json",
];

/// File name of the member database inside `DATA_DIR`.
pub const MEMBER_DB_FILE: &str = "members.redb";

/// Configuration loading errors. All of them abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings for token issuance and the authentication gate.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// HMAC signing secret.
    pub secret: String,
    /// Lifetime of newly issued access tokens.
    pub access_ttl: Duration,
    /// Lifetime of newly issued refresh tokens.
    pub refresh_ttl: Duration,
    /// Request header carrying the access token. Reissued access tokens are
    /// written to the response header of the same name.
    pub access_header: HeaderName,
    /// Request header carrying the refresh token.
    pub refresh_header: HeaderName,
    /// Scheme marker that may precede a token value, e.g. `Bearer`.
    pub scheme: String,
    /// How the scheme marker is treated when reading headers.
    pub scheme_policy: SchemePolicy,
    /// Exact request path that skips token inspection.
    pub login_path: String,
}

impl AuthSettings {
    /// Settings with every default applied and the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::from_secs(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: Duration::from_secs(DEFAULT_REFRESH_TTL_SECS),
            access_header: HeaderName::from_static("authorization"),
            refresh_header: HeaderName::from_static("authorization-refresh"),
            scheme: DEFAULT_SCHEME.to_string(),
            scheme_policy: SchemePolicy::default(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    /// Load from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from a variable lookup, applying defaults for unset
    /// variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let scheme_policy = match lookup(JWT_SCHEME_POLICY_ENV) {
            Some(raw) => SchemePolicy::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                name: JWT_SCHEME_POLICY_ENV,
                reason: format!("unknown policy '{raw}'"),
            })?,
            None => SchemePolicy::default(),
        };

        let login_path = lookup(LOGIN_PATH_ENV).unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string());
        if !login_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                name: LOGIN_PATH_ENV,
                reason: "must start with '/'".to_string(),
            });
        }
        if RESERVED_PATHS.contains(&login_path.as_str()) {
            return Err(ConfigError::Invalid {
                name: LOGIN_PATH_ENV,
                reason: format!("'{login_path}' is already routed"),
            });
        }

        let access_header = header_var(&lookup, JWT_ACCESS_HEADER_ENV, DEFAULT_ACCESS_HEADER)?;
        let refresh_header = header_var(&lookup, JWT_REFRESH_HEADER_ENV, DEFAULT_REFRESH_HEADER)?;
        if access_header == refresh_header {
            return Err(ConfigError::Invalid {
                name: JWT_REFRESH_HEADER_ENV,
                reason: "must differ from the access token header".to_string(),
            });
        }

        Ok(Self {
            secret,
            access_ttl: Duration::from_secs(secs_var(
                &lookup,
                JWT_ACCESS_TTL_ENV,
                DEFAULT_ACCESS_TTL_SECS,
            )?),
            refresh_ttl: Duration::from_secs(secs_var(
                &lookup,
                JWT_REFRESH_TTL_ENV,
                DEFAULT_REFRESH_TTL_SECS,
            )?),
            access_header,
            refresh_header,
            scheme: lookup(JWT_SCHEME_ENV).unwrap_or_else(|| DEFAULT_SCHEME.to_string()),
            scheme_policy,
            login_path,
        })
    }
}

/// Top-level service settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub data_dir: Option<PathBuf>,
    pub json_logs: bool,
    pub auth: AuthSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        Ok(Self {
            bind_addr,
            data_dir: lookup(DATA_DIR_ENV).map(PathBuf::from),
            json_logs: lookup(LOG_FORMAT_ENV)
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            auth: AuthSettings::from_lookup(&lookup)?,
        })
    }
}

fn secs_var(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(name) {
        Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn header_var(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<HeaderName, ConfigError> {
    let raw = lookup(name).unwrap_or_else(|| default.to_string());
    HeaderName::from_bytes(raw.as_bytes()).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = AuthSettings::new("x".repeat(MIN_SECRET_LEN));
        assert_eq!(settings.access_header.as_str(), "authorization");
        assert_eq!(settings.refresh_header.as_str(), "authorization-refresh");
        assert_eq!(settings.access_ttl, Duration::from_secs(3600));
        assert_eq!(settings.refresh_ttl, Duration::from_secs(1_209_600));
        assert_eq!(settings.scheme, "Bearer");
        assert_eq!(settings.scheme_policy, SchemePolicy::Optional);
        assert_eq!(settings.login_path, "/login");
    }

    #[test]
    fn mixed_case_header_names_are_accepted() {
        let header = HeaderName::from_bytes(DEFAULT_REFRESH_HEADER.as_bytes()).unwrap();
        assert_eq!(header.as_str(), "authorization-refresh");
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const SECRET: &str = "config-test-secret-that-is-long-enough";

    fn auth_with(extra: &[(&str, &str)]) -> Result<AuthSettings, ConfigError> {
        let mut vars = vec![(JWT_SECRET_ENV, SECRET)];
        vars.extend_from_slice(extra);
        AuthSettings::from_lookup(lookup_from(&vars))
    }

    fn invalid_name(result: Result<AuthSettings, ConfigError>) -> &'static str {
        match result {
            Err(ConfigError::Invalid { name, .. }) => name,
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn only_secret_required() {
        let settings = auth_with(&[]).unwrap();
        assert_eq!(settings.secret, SECRET);
        assert_eq!(settings.login_path, "/login");
        assert_eq!(settings.scheme_policy, SchemePolicy::Optional);
        assert_eq!(settings.access_ttl, Duration::from_secs(DEFAULT_ACCESS_TTL_SECS));
    }

    #[test]
    fn variables_override_defaults() {
        let settings = auth_with(&[
            (JWT_ACCESS_TTL_ENV, "60"),
            (JWT_REFRESH_TTL_ENV, "120"),
            (JWT_ACCESS_HEADER_ENV, "X-Access"),
            (JWT_REFRESH_HEADER_ENV, "X-Refresh"),
            (JWT_SCHEME_ENV, "Token"),
            (JWT_SCHEME_POLICY_ENV, "required"),
            (LOGIN_PATH_ENV, "/auth/login"),
        ])
        .unwrap();
        assert_eq!(settings.access_ttl, Duration::from_secs(60));
        assert_eq!(settings.refresh_ttl, Duration::from_secs(120));
        assert_eq!(settings.access_header.as_str(), "x-access");
        assert_eq!(settings.refresh_header.as_str(), "x-refresh");
        assert_eq!(settings.scheme, "Token");
        assert_eq!(settings.scheme_policy, SchemePolicy::Required);
        assert_eq!(settings.login_path, "/auth/login");
    }

    #[test]
    fn missing_secret_is_rejected() {
        assert!(matches!(
            AuthSettings::from_lookup(lookup_from(&[])),
            Err(ConfigError::Missing(JWT_SECRET_ENV))
        ));
    }

    #[test]
    fn short_secret_is_rejected() {
        let result = AuthSettings::from_lookup(lookup_from(&[(JWT_SECRET_ENV, "short")]));
        assert_eq!(invalid_name(result), JWT_SECRET_ENV);
    }

    #[test]
    fn unknown_scheme_policy_is_rejected() {
        let result = auth_with(&[(JWT_SCHEME_POLICY_ENV, "sometimes")]);
        assert_eq!(invalid_name(result), JWT_SCHEME_POLICY_ENV);
    }

    #[test]
    fn relative_login_path_is_rejected() {
        let result = auth_with(&[(LOGIN_PATH_ENV, "login")]);
        assert_eq!(invalid_name(result), LOGIN_PATH_ENV);
    }

    #[test]
    fn login_path_cannot_shadow_fixed_routes() {
        for path in ["/logout", "/signUp", "/member", "/health"] {
            let result = auth_with(&[(LOGIN_PATH_ENV, path)]);
            assert_eq!(invalid_name(result), LOGIN_PATH_ENV, "{path}");
        }
    }

    #[test]
    fn identical_headers_are_rejected() {
        let result = auth_with(&[
            (JWT_ACCESS_HEADER_ENV, "X-Token"),
            (JWT_REFRESH_HEADER_ENV, "x-token"),
        ]);
        assert_eq!(invalid_name(result), JWT_REFRESH_HEADER_ENV);
    }

    #[test]
    fn malformed_header_name_is_rejected() {
        let result = auth_with(&[(JWT_ACCESS_HEADER_ENV, "bad header")]);
        assert_eq!(invalid_name(result), JWT_ACCESS_HEADER_ENV);
    }

    #[test]
    fn non_numeric_ttl_is_rejected() {
        let result = auth_with(&[(JWT_ACCESS_TTL_ENV, "an hour")]);
        assert_eq!(invalid_name(result), JWT_ACCESS_TTL_ENV);
    }

    #[test]
    fn service_settings_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[(JWT_SECRET_ENV, SECRET)])).unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert!(settings.data_dir.is_none());
        assert!(!settings.json_logs);
    }

    #[test]
    fn service_settings_from_variables() {
        let settings = Settings::from_lookup(lookup_from(&[
            (JWT_SECRET_ENV, SECRET),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (DATA_DIR_ENV, "/var/lib/board"),
            (LOG_FORMAT_ENV, "JSON"),
        ]))
        .unwrap();
        assert_eq!(settings.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(settings.data_dir, Some(PathBuf::from("/var/lib/board")));
        assert!(settings.json_logs);
    }

    #[test]
    fn bad_port_is_rejected() {
        let result = Settings::from_lookup(lookup_from(&[
            (JWT_SECRET_ENV, SECRET),
            (PORT_ENV, "70000"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: PORT_ENV, .. })));
    }

    #[test]
    fn bad_host_is_rejected() {
        let result = Settings::from_lookup(lookup_from(&[
            (JWT_SECRET_ENV, SECRET),
            (HOST_ENV, "not a host"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: HOST_ENV, .. })));
    }

    #[test]
    fn auth_errors_surface_from_service_settings() {
        assert!(matches!(
            Settings::from_lookup(lookup_from(&[])),
            Err(ConfigError::Missing(JWT_SECRET_ENV))
        ));
    }
}
