// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory member store.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::{MemberStore, StoreError, StoreResult, StoredMember};

/// Members keyed by username, behind a lock.
#[derive(Debug, Default)]
pub struct InMemoryMemberStore {
    members: RwLock<HashMap<String, StoredMember>>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, StoredMember>>> {
        self.members
            .read()
            .map_err(|_| StoreError::Unavailable("member store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, StoredMember>>> {
        self.members
            .write()
            .map_err(|_| StoreError::Unavailable("member store lock poisoned".to_string()))
    }
}

impl MemberStore for InMemoryMemberStore {
    fn find_by_id(&self, id: &str) -> StoreResult<Option<StoredMember>> {
        Ok(self.read()?.values().find(|m| m.id == id).cloned())
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Option<StoredMember>> {
        Ok(self.read()?.get(username).cloned())
    }

    fn find_by_refresh_token(&self, token: &str) -> StoreResult<Option<StoredMember>> {
        Ok(self
            .read()?
            .values()
            .find(|m| m.refresh_token.as_deref() == Some(token))
            .cloned())
    }

    fn set_refresh_token(&self, username: &str, token: &str) -> StoreResult<()> {
        let mut members = self.write()?;
        let member = members
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(format!("Member {username}")))?;
        member.refresh_token = Some(token.to_string());
        member.updated_at = Utc::now();
        Ok(())
    }

    fn clear_refresh_token(&self, username: &str) -> StoreResult<()> {
        let mut members = self.write()?;
        let member = members
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(format!("Member {username}")))?;
        member.refresh_token = None;
        member.updated_at = Utc::now();
        Ok(())
    }

    fn create(&self, member: &StoredMember) -> StoreResult<()> {
        let mut members = self.write()?;
        if members.contains_key(&member.username) {
            return Err(StoreError::AlreadyExists(format!("Member {}", member.username)));
        }
        members.insert(member.username.clone(), member.clone());
        Ok(())
    }

    fn update(&self, member: &StoredMember) -> StoreResult<()> {
        let mut members = self.write()?;
        let Some(existing) = members.get_mut(&member.username) else {
            return Err(StoreError::NotFound(format!("Member {}", member.username)));
        };
        let refresh_token = existing.refresh_token.take();
        *existing = StoredMember {
            refresh_token,
            ..member.clone()
        };
        Ok(())
    }

    fn delete(&self, username: &str) -> StoreResult<()> {
        if self.write()?.remove(username).is_some() {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("Member {username}")))
        }
    }
}
