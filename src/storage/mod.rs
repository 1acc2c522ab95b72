// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Member Storage
//!
//! Members and their single live refresh token live behind the
//! [`MemberStore`] trait. Two implementations exist:
//!
//! - [`InMemoryMemberStore`]: process-local, used by tests and when no
//!   `DATA_DIR` is configured
//! - [`MemberDatabase`]: durable, backed by an embedded redb file
//!
//! ## Refresh Token Authority
//!
//! A member record holds at most one refresh token. Storing a new one
//! overwrites the old, and clearing it revokes it immediately. Lookups by
//! refresh token only match the value currently on record.
//!
//! Each call is atomic on its own, but callers get no transaction spanning
//! several calls. Two concurrent refreshes for the same member race and the
//! later write wins.

pub mod database;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

pub use database::MemberDatabase;
pub use memory::InMemoryMemberStore;

/// Member record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMember {
    /// Unique member identifier (UUID)
    pub id: String,
    /// Unique, stable login name
    pub username: String,
    /// Argon2 PHC hash of the password
    pub password: String,
    pub name: String,
    pub nickname: String,
    pub age: u32,
    pub role: Role,
    /// The one refresh token currently honoured for this member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredMember {
    /// A new member with a fresh ID, the default role and no refresh token.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
        nickname: impl Into<String>,
        age: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            password: password_hash.into(),
            name: name.into(),
            nickname: nickname.into(),
            age,
            role: Role::default(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Member persistence, including the refresh token on record.
///
/// Calls are synchronous and expected to be fast.
pub trait MemberStore: Send + Sync {
    fn find_by_id(&self, id: &str) -> StoreResult<Option<StoredMember>>;

    fn find_by_username(&self, username: &str) -> StoreResult<Option<StoredMember>>;

    /// Exact match against the refresh token currently on record.
    fn find_by_refresh_token(&self, token: &str) -> StoreResult<Option<StoredMember>>;

    /// Replace the member's refresh token. Fails with `NotFound` for an
    /// unknown username.
    fn set_refresh_token(&self, username: &str, token: &str) -> StoreResult<()>;

    /// Remove the member's refresh token, revoking it.
    fn clear_refresh_token(&self, username: &str) -> StoreResult<()>;

    /// Insert a new member. Fails with `AlreadyExists` on a taken username.
    fn create(&self, member: &StoredMember) -> StoreResult<()>;

    /// Overwrite an existing member record, matched by username. The
    /// refresh token on record is kept as stored; only
    /// `set_refresh_token` and `clear_refresh_token` change it.
    fn update(&self, member: &StoredMember) -> StoreResult<()>;

    /// Delete a member and with it any refresh token on record.
    fn delete(&self, username: &str) -> StoreResult<()>;

    /// Check the store can serve requests.
    fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
