// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded member database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `members`: username → serialized StoredMember
//! - `member_ids`: member id → username
//! - `refresh_tokens`: refresh token → username
//!
//! The `refresh_tokens` index is rewritten in the same write transaction as
//! the member record, and a lookup only matches when the record still holds
//! that token. Plain record updates never touch either.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{MemberStore, StoreError, StoreResult, StoredMember};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: username → serialized StoredMember (JSON bytes).
const MEMBERS: TableDefinition<&str, &[u8]> = TableDefinition::new("members");

/// Index: member id → username.
const MEMBER_IDS: TableDefinition<&str, &str> = TableDefinition::new("member_ids");

/// Index: refresh token on record → username.
const REFRESH_TOKENS: TableDefinition<&str, &str> = TableDefinition::new("refresh_tokens");

fn read_member<T>(table: &T, username: &str) -> StoreResult<Option<StoredMember>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(username)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn read_username<T>(table: &T, key: &str) -> StoreResult<Option<String>>
where
    T: ReadableTable<&'static str, &'static str>,
{
    Ok(table.get(key)?.map(|v| v.value().to_string()))
}

// =============================================================================
// MemberDatabase
// =============================================================================

/// Durable member store.
pub struct MemberDatabase {
    db: Database,
}

impl MemberDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("cannot create {}: {e}", parent.display())))?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(MEMBERS)?;
            let _ = write_txn.open_table(MEMBER_IDS)?;
            let _ = write_txn.open_table(REFRESH_TOKENS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn replace_refresh_token(&self, username: &str, token: Option<&str>) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut members = write_txn.open_table(MEMBERS)?;
            let mut tokens = write_txn.open_table(REFRESH_TOKENS)?;

            let mut member = read_member(&members, username)?
                .ok_or_else(|| StoreError::NotFound(format!("Member {username}")))?;

            if let Some(old) = member.refresh_token.take() {
                tokens.remove(old.as_str())?;
            }
            if let Some(token) = token {
                tokens.insert(token, username)?;
            }

            member.refresh_token = token.map(str::to_string);
            member.updated_at = Utc::now();
            let json = serde_json::to_vec(&member)?;
            members.insert(username, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl MemberStore for MemberDatabase {
    fn find_by_id(&self, id: &str) -> StoreResult<Option<StoredMember>> {
        let read_txn = self.db.begin_read()?;
        let ids = read_txn.open_table(MEMBER_IDS)?;
        let Some(username) = read_username(&ids, id)? else {
            return Ok(None);
        };
        let members = read_txn.open_table(MEMBERS)?;
        read_member(&members, &username)
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Option<StoredMember>> {
        let read_txn = self.db.begin_read()?;
        let members = read_txn.open_table(MEMBERS)?;
        read_member(&members, username)
    }

    fn find_by_refresh_token(&self, token: &str) -> StoreResult<Option<StoredMember>> {
        let read_txn = self.db.begin_read()?;
        let tokens = read_txn.open_table(REFRESH_TOKENS)?;
        let Some(username) = read_username(&tokens, token)? else {
            return Ok(None);
        };

        let members = read_txn.open_table(MEMBERS)?;
        let member = read_member(&members, &username)?;
        Ok(member.filter(|m| m.refresh_token.as_deref() == Some(token)))
    }

    fn set_refresh_token(&self, username: &str, token: &str) -> StoreResult<()> {
        self.replace_refresh_token(username, Some(token))
    }

    fn clear_refresh_token(&self, username: &str) -> StoreResult<()> {
        self.replace_refresh_token(username, None)
    }

    fn create(&self, member: &StoredMember) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut members = write_txn.open_table(MEMBERS)?;
            if members.get(member.username.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("Member {}", member.username)));
            }

            let json = serde_json::to_vec(member)?;
            members.insert(member.username.as_str(), json.as_slice())?;

            let mut ids = write_txn.open_table(MEMBER_IDS)?;
            ids.insert(member.id.as_str(), member.username.as_str())?;

            if let Some(token) = member.refresh_token.as_deref() {
                let mut tokens = write_txn.open_table(REFRESH_TOKENS)?;
                tokens.insert(token, member.username.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn update(&self, member: &StoredMember) -> StoreResult<()> {
        let username = member.username.as_str();
        let write_txn = self.db.begin_write()?;
        {
            let mut members = write_txn.open_table(MEMBERS)?;
            let existing = read_member(&members, username)?
                .ok_or_else(|| StoreError::NotFound(format!("Member {username}")))?;

            let record = StoredMember {
                refresh_token: existing.refresh_token,
                ..member.clone()
            };
            let json = serde_json::to_vec(&record)?;
            members.insert(username, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete(&self, username: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut members = write_txn.open_table(MEMBERS)?;
            let existing = read_member(&members, username)?
                .ok_or_else(|| StoreError::NotFound(format!("Member {username}")))?;
            members.remove(username)?;

            let mut ids = write_txn.open_table(MEMBER_IDS)?;
            ids.remove(existing.id.as_str())?;

            if let Some(token) = existing.refresh_token.as_deref() {
                let mut tokens = write_txn.open_table(REFRESH_TOKENS)?;
                tokens.remove(token)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(MEMBERS)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (MemberDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = MemberDatabase::open(&dir.path().join("members.redb")).unwrap();
        (db, dir)
    }

    fn member(username: &str) -> StoredMember {
        StoredMember::new(username, "hash", "Member", "nick", 22)
    }

    #[test]
    fn create_and_lookup() {
        let (db, _dir) = temp_db();
        let alice = member("alice");
        db.create(&alice).unwrap();

        assert_eq!(db.find_by_username("alice").unwrap(), Some(alice.clone()));
        assert_eq!(db.find_by_id(&alice.id).unwrap(), Some(alice));
        assert!(db.find_by_id("missing").unwrap().is_none());
        assert!(matches!(
            db.create(&member("alice")),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn refresh_token_last_write_wins() {
        let (db, _dir) = temp_db();
        db.create(&member("alice")).unwrap();

        db.set_refresh_token("alice", "refresh-a").unwrap();
        db.set_refresh_token("alice", "refresh-b").unwrap();

        assert!(db.find_by_refresh_token("refresh-a").unwrap().is_none());
        assert_eq!(
            db.find_by_refresh_token("refresh-b").unwrap().unwrap().username,
            "alice"
        );
    }

    #[test]
    fn clear_refresh_token_revokes() {
        let (db, _dir) = temp_db();
        db.create(&member("alice")).unwrap();
        db.set_refresh_token("alice", "refresh-a").unwrap();

        db.clear_refresh_token("alice").unwrap();

        assert!(db.find_by_refresh_token("refresh-a").unwrap().is_none());
        assert!(db.find_by_username("alice").unwrap().unwrap().refresh_token.is_none());
    }

    #[test]
    fn update_leaves_refresh_token_alone() {
        let (db, _dir) = temp_db();
        let mut alice = member("alice");
        db.create(&alice).unwrap();
        db.set_refresh_token("alice", "refresh-a").unwrap();

        alice.refresh_token = Some("refresh-z".to_string());
        alice.age = 23;
        db.update(&alice).unwrap();

        assert!(db.find_by_refresh_token("refresh-z").unwrap().is_none());
        let found = db.find_by_refresh_token("refresh-a").unwrap().unwrap();
        assert_eq!(found.age, 23);
    }

    #[test]
    fn update_from_stale_copy_keeps_revocation() {
        let (db, _dir) = temp_db();
        db.create(&member("alice")).unwrap();
        db.set_refresh_token("alice", "refresh-a").unwrap();

        let mut stale = db.find_by_username("alice").unwrap().unwrap();
        db.clear_refresh_token("alice").unwrap();
        stale.age = 31;
        db.update(&stale).unwrap();

        assert!(db.find_by_refresh_token("refresh-a").unwrap().is_none());
        assert!(db.find_by_username("alice").unwrap().unwrap().refresh_token.is_none());
    }

    #[test]
    fn update_from_stale_copy_keeps_newer_refresh_token() {
        let (db, _dir) = temp_db();
        db.create(&member("alice")).unwrap();
        db.set_refresh_token("alice", "refresh-a").unwrap();

        let mut stale = db.find_by_username("alice").unwrap().unwrap();
        db.set_refresh_token("alice", "refresh-b").unwrap();
        stale.age = 40;
        db.update(&stale).unwrap();

        assert!(db.find_by_refresh_token("refresh-a").unwrap().is_none());
        assert_eq!(db.find_by_refresh_token("refresh-b").unwrap().unwrap().age, 40);
    }

    #[test]
    fn delete_drops_indexes() {
        let (db, _dir) = temp_db();
        let alice = member("alice");
        db.create(&alice).unwrap();
        db.set_refresh_token("alice", "refresh-a").unwrap();

        db.delete("alice").unwrap();

        assert!(db.find_by_username("alice").unwrap().is_none());
        assert!(db.find_by_id(&alice.id).unwrap().is_none());
        assert!(db.find_by_refresh_token("refresh-a").unwrap().is_none());
        assert!(matches!(db.delete("alice"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.redb");
        {
            let db = MemberDatabase::open(&path).unwrap();
            db.create(&member("alice")).unwrap();
            db.set_refresh_token("alice", "refresh-a").unwrap();
        }

        let db = MemberDatabase::open(&path).unwrap();
        assert!(db.health_check().is_ok());
        assert_eq!(
            db.find_by_refresh_token("refresh-a").unwrap().unwrap().username,
            "alice"
        );
    }
}
