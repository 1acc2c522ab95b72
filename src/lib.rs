// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! MyBoard - Message Board Backend
//!
//! Member accounts behind a dual-token authentication gate. Every request
//! is inspected for a short-lived access token and a long-lived refresh
//! token; a refresh token on record trades for a new access token.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, authentication gate and extractors
//! - `config` - Environment configuration
//! - `storage` - Member store (in-memory or redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
