// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Reasons a token failed to decode.
///
/// Only used for logging and branch selection inside the gate; a client
/// never sees these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not a structurally valid JWT.
    #[error("token is malformed")]
    Malformed,
    /// Signature does not match the signing secret.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Current time is at or past the token's expiry.
    #[error("token has expired")]
    Expired,
    /// Subject tag is neither an access nor a refresh tag.
    #[error("token subject '{0}' is not recognised")]
    UnknownSubject(String),
    /// Token could not be produced.
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Authentication error type.
///
/// Produced by handlers and extractors downstream of the gate. The gate
/// itself never rejects a request on token grounds.
#[derive(Debug)]
pub enum AuthError {
    /// The request carries no authenticated identity
    Unauthenticated,
    /// Username or password did not match at login
    InvalidCredentials,
    /// Internal error
    InternalError(String),
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
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated => StatusCode::FORBIDDEN,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Unauthenticated => write!(f, "Authentication is required"),
            AuthError::InvalidCredentials => write!(f, "Username or password is incorrect"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

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
