// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing with Argon2id.
//!
//! Hashing is deliberately slow, so request handlers go through the
//! `*_blocking` variants, which run on tokio's blocking pool.

use argon2::{
    password_hash::{Error as HashError, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use tokio::task::JoinError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("password task failed: {0}")]
    Task(#[from] JoinError),
}

/// Hashes and verifies member passwords. Hashes are PHC strings.
#[derive(Clone, Default)]
pub struct PasswordEncoder {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for PasswordEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordEncoder").finish_non_exhaustive()
    }
}

impl PasswordEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `raw` with a random 16-byte salt.
    pub fn encode(&self, raw: &str) -> Result<String, HashError> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())?;
        Ok(self.argon2.hash_password(raw.as_bytes(), &salt)?.to_string())
    }

    /// Check `raw` against a stored hash. An unparseable hash never matches.
    pub fn matches(&self, raw: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| self.argon2.verify_password(raw.as_bytes(), &parsed).is_ok())
            .unwrap_or(false)
    }

    /// [`encode`](Self::encode) on the blocking pool.
    pub async fn encode_blocking(&self, raw: String) -> Result<String, PasswordError> {
        let encoder = self.clone();
        tokio::task::spawn_blocking(move || encoder.encode(&raw))
            .await?
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// [`matches`](Self::matches) on the blocking pool. A check that could
    /// not run never matches.
    pub async fn matches_blocking(&self, raw: String, hash: String) -> bool {
        let encoder = self.clone();
        tokio::task::spawn_blocking(move || encoder.matches(&raw, &hash))
            .await
            .unwrap_or(false)
    }
}
