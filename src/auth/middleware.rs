// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication gate for Axum.
//!
//! Every request passes through [`auth_gate`] before its handler. The gate
//! inspects the token headers and reaches exactly one [`GateDecision`]:
//!
//! 1. **Bypass**: the path is the login path. Nothing is inspected.
//! 2. **Reissue**: a valid refresh token matching the one on record. A new
//!    access token is returned in the access header and the request goes
//!    no further.
//! 3. **Access**: a valid access token carrying a username. The member is
//!    looked up and, if found, becomes the request's principal.
//! 4. **Anonymous**: no usable token. The request continues without a
//!    principal; handlers that need one reject it.
//!
//! A refresh token that is invalid, of the wrong kind, or no longer on
//! record is treated as absent, so evaluation falls through to the access
//! branch. Token values are never logged.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::bearer::extract_token;
use super::claims::{DecodedToken, TokenKind, USERNAME_CLAIM};
use super::error::TokenError;
use super::identity::{AuthenticatedMember, IdentityContext};
use super::token::TokenCodec;
use crate::config::AuthSettings;
use crate::error::ApiError;
use crate::storage::{MemberStore, StoreResult};

/// Outcome of inspecting one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Login path; continue without inspecting tokens.
    Bypass,
    /// Refresh token on record; respond with a new access token and halt.
    Reissue { username: String },
    /// Valid access token; continue with this identity, which is empty when
    /// the member no longer exists.
    Access(IdentityContext),
    /// No usable token; continue unauthenticated.
    Anonymous,
}

/// Token issuance and per-request token inspection.
pub struct AuthGate {
    codec: TokenCodec,
    store: Arc<dyn MemberStore>,
    settings: Arc<AuthSettings>,
}

impl AuthGate {
    pub fn new(codec: TokenCodec, store: Arc<dyn MemberStore>, settings: Arc<AuthSettings>) -> Self {
        Self {
            codec,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Issue an access token naming `username`.
    pub fn issue_access_token(&self, username: &str) -> Result<String, TokenError> {
        self.codec.encode(
            TokenKind::Access,
            self.settings.access_ttl,
            &[(USERNAME_CLAIM, username)],
        )
    }

    /// Issue a refresh token. It carries no identity; it only means
    /// something while it is the token on record for a member.
    pub fn issue_refresh_token(&self) -> Result<String, TokenError> {
        self.codec
            .encode(TokenKind::Refresh, self.settings.refresh_ttl, &[])
    }

    /// Decide what to do with a request to `path` carrying `headers`.
    ///
    /// Only store failures are errors; every token problem degrades to a
    /// less privileged decision.
    pub fn decide(&self, path: &str, headers: &HeaderMap) -> StoreResult<GateDecision> {
        if path == self.settings.login_path {
            debug!(path, "login path, skipping token inspection");
            return Ok(GateDecision::Bypass);
        }

        if let Some(username) = self.check_refresh(headers)? {
            return Ok(GateDecision::Reissue { username });
        }

        self.check_access(headers)
    }

    fn check_refresh(&self, headers: &HeaderMap) -> StoreResult<Option<String>> {
        let Some(raw) = self.read_token(headers, TokenKind::Refresh) else {
            return Ok(None);
        };
        if self.verify(raw, TokenKind::Refresh).is_none() {
            return Ok(None);
        }

        match self.store.find_by_refresh_token(raw)? {
            Some(member) => {
                debug!(username = %member.username, "refresh token on record, reissuing access token");
                Ok(Some(member.username))
            }
            None => {
                debug!("refresh token valid but not on record");
                Ok(None)
            }
        }
    }

    fn check_access(&self, headers: &HeaderMap) -> StoreResult<GateDecision> {
        let Some(raw) = self.read_token(headers, TokenKind::Access) else {
            return Ok(GateDecision::Anonymous);
        };
        let Some(decoded) = self.verify(raw, TokenKind::Access) else {
            return Ok(GateDecision::Anonymous);
        };
        let Some(username) = decoded.username() else {
            debug!("access token has no username claim");
            return Ok(GateDecision::Anonymous);
        };

        let identity = match self.store.find_by_username(username)? {
            Some(member) => IdentityContext::authenticated(AuthenticatedMember::from(&member)),
            None => {
                debug!(username, "access token names an unknown member");
                IdentityContext::anonymous()
            }
        };
        Ok(GateDecision::Access(identity))
    }

    fn read_token<'a>(&self, headers: &'a HeaderMap, kind: TokenKind) -> Option<&'a str> {
        let header = match kind {
            TokenKind::Access => &self.settings.access_header,
            TokenKind::Refresh => &self.settings.refresh_header,
        };
        extract_token(headers, header, &self.settings.scheme, self.settings.scheme_policy)
    }

    fn verify(&self, raw: &str, expected: TokenKind) -> Option<DecodedToken> {
        match self.codec.decode(raw) {
            Ok(decoded) if decoded.kind == expected => Some(decoded),
            Ok(decoded) => {
                debug!(expected = ?expected, found = ?decoded.kind, "token of the wrong kind");
                None
            }
            Err(e) => {
                debug!(kind = ?expected, error = %e, "token rejected");
                None
            }
        }
    }

    fn reissue(&self, username: &str) -> Response {
        let token = match self.issue_access_token(username) {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "failed to issue access token");
                return ApiError::internal("Failed to issue access token").into_response();
            }
        };
        let value = match HeaderValue::from_str(&token) {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "issued token is not a valid header value");
                return ApiError::internal("Failed to issue access token").into_response();
            }
        };

        let mut response = StatusCode::OK.into_response();
        response
            .headers_mut()
            .insert(self.settings.access_header.clone(), value);
        response
    }
}

/// Router-wide authentication middleware.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/member", get(my_info))
///     .layer(axum::middleware::from_fn_with_state(gate, auth_gate));
/// ```
pub async fn auth_gate(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let decision = match gate.decide(request.uri().path(), request.headers()) {
        Ok(decision) => decision,
        Err(e) => {
            error!(error = %e, "member store failed during authentication");
            return ApiError::internal("Authentication is temporarily unavailable").into_response();
        }
    };

    match decision {
        GateDecision::Bypass => next.run(request).await,
        GateDecision::Reissue { username } => gate.reissue(&username),
        GateDecision::Access(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        GateDecision::Anonymous => {
            request.extensions_mut().insert(IdentityContext::anonymous());
            next.run(request).await
        }
    }
}
