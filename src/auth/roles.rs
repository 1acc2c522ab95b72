// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member roles.
//!
//! A role is recorded on each member and carried in the request identity.
//! Nothing in this service makes access decisions from it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Member roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular board member
    #[default]
    User,
    /// Board administrator
    Admin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""ADMIN""#);
        assert_eq!(serde_json::from_str::<Role>(r#""USER""#).unwrap(), Role::User);
    }
}
