// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request identity.
//!
//! The gate builds one [`IdentityContext`] per request and stores it in the
//! request's extensions; handlers read it back through the extractors in
//! `extractor.rs`. Nothing here is shared between requests.

use serde::Serialize;
use utoipa::ToSchema;

use super::roles::Role;
use crate::storage::StoredMember;

/// The authenticated principal of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthenticatedMember {
    /// Member ID
    pub member_id: String,
    /// Unique login name
    pub username: String,
    /// Member's role
    pub role: Role,
}

impl From<&StoredMember> for AuthenticatedMember {
    fn from(member: &StoredMember) -> Self {
        Self {
            member_id: member.id.clone(),
            username: member.username.clone(),
            role: member.role,
        }
    }
}

/// Holder of the request's principal, empty until the gate populates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityContext {
    principal: Option<AuthenticatedMember>,
}

impl IdentityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: AuthenticatedMember) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&AuthenticatedMember> {
        self.principal.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.username.as_str())
    }
}
