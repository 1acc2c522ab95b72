// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and logout endpoints.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, info};

use crate::auth::{Auth, AuthError};
use crate::error::ApiError;
use crate::models::LoginRequest;
use crate::state::AppState;

fn internal(context: &str, e: impl std::fmt::Display) -> AuthError {
    error!(error = %e, "{context}");
    AuthError::InternalError(context.to_string())
}

/// Exchange credentials for a token pair.
///
/// The access token is written to the access header and the refresh token
/// to the refresh header, both without a scheme marker. The refresh token
/// replaces any earlier one on record.
///
/// Served at `LOGIN_PATH`; the documented `/login` is its default.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; tokens in the Authorization and Authorization-refresh headers"),
        (status = 401, description = "Unknown username or wrong password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let rejected = || {
        debug!("login rejected");
        AuthError::InvalidCredentials
    };
    let member = state
        .store
        .find_by_username(&request.username)
        .map_err(|e| internal("member lookup failed", e))?
        .ok_or_else(rejected)?;
    if !state
        .passwords
        .matches_blocking(request.password, member.password.clone())
        .await
    {
        return Err(rejected());
    }

    let access = state
        .gate
        .issue_access_token(&member.username)
        .map_err(|e| internal("failed to issue access token", e))?;
    let refresh = state
        .gate
        .issue_refresh_token()
        .map_err(|e| internal("failed to issue refresh token", e))?;

    state
        .store
        .set_refresh_token(&member.username, &refresh)
        .map_err(|e| internal("failed to store refresh token", e))?;

    let access = HeaderValue::from_str(&access).map_err(|e| internal("invalid token header", e))?;
    let refresh =
        HeaderValue::from_str(&refresh).map_err(|e| internal("invalid token header", e))?;

    info!(username = %member.username, "member logged in");

    let settings = state.settings();
    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert(settings.access_header.clone(), access);
    headers.insert(settings.refresh_header.clone(), refresh);
    Ok(response)
}

/// Revoke the caller's refresh token.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 403, description = "Not authenticated"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Auth(member): Auth,
) -> Result<StatusCode, ApiError> {
    state.store.clear_refresh_token(&member.username)?;
    info!(username = %member.username, "member logged out");
    Ok(StatusCode::NO_CONTENT)
}
