// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member endpoints: sign-up, profile, password change and withdrawal.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{
    MemberInfo, MemberUpdateRequest, SignUpRequest, UpdatePasswordRequest, WithdrawRequest,
};
use crate::state::AppState;
use crate::storage::StoredMember;

/// Load a member by username, treating a vanished record as 404.
fn load_member(state: &AppState, username: &str) -> Result<StoredMember, ApiError> {
    state
        .store
        .find_by_username(username)?
        .ok_or_else(|| ApiError::not_found("Member not found"))
}

async fn hash_password(state: &AppState, raw: &str) -> Result<String, ApiError> {
    state
        .passwords
        .encode_blocking(raw.to_string())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            ApiError::internal("Failed to hash password")
        })
}

async fn check_password(
    state: &AppState,
    member: &StoredMember,
    raw: &str,
) -> Result<(), ApiError> {
    if state
        .passwords
        .matches_blocking(raw.to_string(), member.password.clone())
        .await
    {
        Ok(())
    } else {
        Err(ApiError::bad_request("Password does not match"))
    }
}

/// Register a new member.
#[utoipa::path(
    post,
    path = "/signUp",
    tag = "Members",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Member created", body = MemberInfo),
        (status = 400, description = "A required field is blank"),
        (status = 409, description = "Username is already taken"),
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<MemberInfo>), ApiError> {
    if let Some(field) = request.blank_field() {
        return Err(ApiError::bad_request(format!("{field} must not be blank")));
    }

    let hash = hash_password(&state, &request.password).await?;
    let member = StoredMember::new(
        request.username,
        hash,
        request.name,
        request.nick_name,
        request.age,
    );
    state.store.create(&member)?;

    info!(username = %member.username, member_id = %member.id, "member signed up");
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/member",
    tag = "Members",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = MemberInfo),
        (status = 403, description = "Not authenticated"),
    )
)]
pub async fn my_info(
    State(state): State<AppState>,
    Auth(member): Auth,
) -> Result<Json<MemberInfo>, ApiError> {
    Ok(Json(load_member(&state, &member.username)?.into()))
}

/// Another member's profile by ID.
#[utoipa::path(
    get,
    path = "/member/{id}",
    tag = "Members",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member profile", body = MemberInfo),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "No member with this ID"),
    )
)]
pub async fn member_info(
    State(state): State<AppState>,
    Auth(_caller): Auth,
    Path(id): Path<String>,
) -> Result<Json<MemberInfo>, ApiError> {
    let member = state
        .store
        .find_by_id(&id)?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;
    Ok(Json(member.into()))
}

/// Update the caller's name, nickname or age.
#[utoipa::path(
    put,
    path = "/member",
    tag = "Members",
    security(("bearer" = [])),
    request_body = MemberUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = MemberInfo),
        (status = 403, description = "Not authenticated"),
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(request): Json<MemberUpdateRequest>,
) -> Result<Json<MemberInfo>, ApiError> {
    let mut member = load_member(&state, &caller.username)?;
    request.apply(&mut member);
    member.updated_at = chrono::Utc::now();
    state.store.update(&member)?;

    info!(username = %member.username, "member profile updated");
    Ok(Json(member.into()))
}

/// Change the caller's password.
#[utoipa::path(
    put,
    path = "/member/password",
    tag = "Members",
    security(("bearer" = [])),
    request_body = UpdatePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Current password does not match"),
        (status = 403, description = "Not authenticated"),
    )
)]
pub async fn update_password(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let mut member = load_member(&state, &caller.username)?;
    check_password(&state, &member, &request.check_password).await?;
    if request.to_be_password.trim().is_empty() {
        return Err(ApiError::bad_request("password must not be blank"));
    }

    member.password = hash_password(&state, &request.to_be_password).await?;
    member.updated_at = chrono::Utc::now();
    state.store.update(&member)?;

    info!(username = %member.username, "member password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete the caller's account, and with it their refresh token.
#[utoipa::path(
    delete,
    path = "/member",
    tag = "Members",
    security(("bearer" = [])),
    request_body = WithdrawRequest,
    responses(
        (status = 204, description = "Member deleted"),
        (status = 400, description = "Password does not match"),
        (status = 403, description = "Not authenticated"),
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(request): Json<WithdrawRequest>,
) -> Result<StatusCode, ApiError> {
    let member = load_member(&state, &caller.username)?;
    check_password(&state, &member, &request.check_password).await?;
    state.store.delete(&member.username)?;

    info!(username = %member.username, member_id = %member.id, "member withdrew");
    Ok(StatusCode::NO_CONTENT)
}
