// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims carried by access and refresh tokens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Subject tag of an access token.
pub const ACCESS_TOKEN_SUBJECT: &str = "AccessToken";

/// Subject tag of a refresh token.
pub const REFRESH_TOKEN_SUBJECT: &str = "RefreshToken";

/// Private claim holding the owning member's username (access tokens only).
pub const USERNAME_CLAIM: &str = "username";

/// The two kinds of token, distinguished by their subject tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived, carries the username claim
    Access,
    /// Long-lived, no private claims, validated against the member store
    Refresh,
}

impl TokenKind {
    /// The subject tag written to `sub`.
    pub fn subject(self) -> &'static str {
        match self {
            TokenKind::Access => ACCESS_TOKEN_SUBJECT,
            TokenKind::Refresh => REFRESH_TOKEN_SUBJECT,
        }
    }

    pub fn from_subject(subject: &str) -> Option<Self> {
        match subject {
            ACCESS_TOKEN_SUBJECT => Some(TokenKind::Access),
            REFRESH_TOKEN_SUBJECT => Some(TokenKind::Refresh),
            _ => None,
        }
    }
}

/// Claims serialized into every token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject tag (see [`TokenKind`])
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Unique token ID, so two tokens issued within the same second differ
    pub jti: String,

    /// Private claims, flattened next to the registered ones
    #[serde(flatten)]
    pub private: BTreeMap<String, serde_json::Value>,
}

/// A token that passed signature, structure, subject and expiry checks.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub kind: TokenKind,
    pub claims: TokenClaims,
}

impl DecodedToken {
    /// Read a string-valued private claim. Absent or non-string claims yield `None`.
    pub fn claim(&self, name: &str) -> Option<&str> {
        self.claims.private.get(name).and_then(|v| v.as_str())
    }

    /// Shortcut for the username claim of an access token.
    pub fn username(&self) -> Option<&str> {
        self.claim(USERNAME_CLAIM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> TokenClaims {
        let mut private = BTreeMap::new();
        private.insert(USERNAME_CLAIM.to_string(), serde_json::json!("alice"));
        TokenClaims {
            sub: ACCESS_TOKEN_SUBJECT.to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            jti: "jti-1".to_string(),
            private,
        }
    }

    #[test]
    fn subject_tags_round_trip() {
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            assert_eq!(TokenKind::from_subject(kind.subject()), Some(kind));
        }
        assert_eq!(TokenKind::from_subject("IdToken"), None);
    }

    #[test]
    fn private_claims_are_flattened() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["sub"], "AccessToken");
        assert!(json.get("private").is_none());
    }

    #[test]
    fn claim_lookup_ignores_missing_and_non_string_values() {
        let mut claims = sample_claims();
        claims.private.insert("count".to_string(), serde_json::json!(3));
        let decoded = DecodedToken {
            kind: TokenKind::Access,
            claims,
        };

        assert_eq!(decoded.username(), Some("alice"));
        assert_eq!(decoded.claim("count"), None);
        assert_eq!(decoded.claim("missing"), None);
    }
}
