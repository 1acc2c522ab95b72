// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed, time-limited token encoding and decoding.
//!
//! Tokens are HS512 JWTs. The codec keeps only the immutable key material,
//! so a single instance is shared by every request.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use super::claims::{DecodedToken, TokenClaims, TokenKind};
use super::error::TokenError;

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// Encodes and decodes access and refresh tokens.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<Keys>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        // Expiry is checked against our own clock below, without leeway.
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                validation,
            }),
        }
    }

    /// Issue a token of `kind` that expires `ttl` from now.
    pub fn encode(
        &self,
        kind: TokenKind,
        ttl: Duration,
        claims: &[(&str, &str)],
    ) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        let private: BTreeMap<String, serde_json::Value> = claims
            .iter()
            .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
            .collect();

        let claims = TokenClaims {
            sub: kind.subject().to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
            jti: Uuid::new_v4().to_string(),
            private,
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.keys.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify `token` and return its kind and claims.
    ///
    /// Fails on a bad signature, a malformed token, an unknown subject tag,
    /// or when the current time is at or past `exp`.
    pub fn decode(&self, token: &str) -> Result<DecodedToken, TokenError> {
        let data = decode::<TokenClaims>(token, &self.keys.decoding, &self.keys.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        let claims = data.claims;
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        let kind = TokenKind::from_subject(&claims.sub)
            .ok_or_else(|| TokenError::UnknownSubject(claims.sub.clone()))?;

        Ok(DecodedToken { kind, claims })
    }

    /// Decode `token` and read the string claim `name`.
    ///
    /// An invalid token and an absent claim both yield `None`.
    pub fn extract_claim(&self, token: &str, name: &str) -> Option<String> {
        self.decode(token)
            .ok()
            .and_then(|decoded| decoded.claim(name).map(str::to_string))
    }
}
