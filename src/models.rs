// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the member endpoints. Field names follow
//! the board's JSON convention (`nickName`, `checkPassword`, ...).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::StoredMember;

// =============================================================================
// Authentication
// =============================================================================

/// Credentials posted to the login path.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Member Models
// =============================================================================

/// Sign-up form.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub nick_name: String,
    pub age: u32,
}

impl SignUpRequest {
    /// Name of the first required field left blank, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        [
            ("username", &self.username),
            ("password", &self.password),
            ("name", &self.name),
            ("nickName", &self.nick_name),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

impl MemberUpdateRequest {
    /// Apply the provided fields to `member`.
    pub fn apply(self, member: &mut StoredMember) {
        if let Some(name) = self.name {
            member.name = name;
        }
        if let Some(nick_name) = self.nick_name {
            member.nickname = nick_name;
        }
        if let Some(age) = self.age {
            member.age = age;
        }
    }
}

/// Password change, confirmed with the current password.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub check_password: String,
    pub to_be_password: String,
}

/// Account withdrawal, confirmed with the current password.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub check_password: String,
}

/// Public view of a member.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub name: String,
    pub nick_name: String,
    pub username: String,
    pub age: u32,
}

impl From<StoredMember> for MemberInfo {
    fn from(member: StoredMember) -> Self {
        Self {
            name: member.name,
            nick_name: member.nickname,
            username: member.username,
            age: member.age,
        }
    }
}
