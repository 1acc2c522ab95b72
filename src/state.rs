// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthGate, PasswordEncoder, TokenCodec};
use crate::config::AuthSettings;
use crate::storage::{InMemoryMemberStore, MemberStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MemberStore>,
    pub gate: Arc<AuthGate>,
    pub passwords: PasswordEncoder,
    /// Whether members persist across restarts (a data directory is set).
    pub persistent: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn MemberStore>, settings: AuthSettings) -> Self {
        let codec = TokenCodec::new(settings.secret.as_bytes());
        let gate = Arc::new(AuthGate::new(codec, store.clone(), Arc::new(settings)));
        Self {
            store,
            gate,
            passwords: PasswordEncoder::new(),
            persistent: false,
        }
    }

    pub fn with_persistence(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(settings: AuthSettings) -> Self {
        Self::new(Arc::new(InMemoryMemberStore::new()), settings)
    }

    pub fn settings(&self) -> &AuthSettings {
        self.gate.settings()
    }
}
