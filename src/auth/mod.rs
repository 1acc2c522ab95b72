// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless JWT authentication for the board API, with a refresh token
//! that the member store can revoke.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to the login path
//! 2. Server answers with an access token and a refresh token in the
//!    response headers, and stores the refresh token on the member record
//! 3. Client sends `Authorization: Bearer <access token>` on each request
//! 4. When the access token expires, client sends
//!    `Authorization-refresh: Bearer <refresh token>` and receives a new
//!    access token; the request itself is not processed
//!
//! ## Security
//!
//! - Tokens are HS512-signed with a shared secret
//! - No clock skew tolerance on expiry
//! - Only the refresh token on record is honoured; logout clears it
//! - Unauthenticated access to protected handlers yields 403

pub mod bearer;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;

pub use bearer::SchemePolicy;
pub use claims::{DecodedToken, TokenKind};
pub use error::{AuthError, TokenError};
pub use extractor::{Auth, Identity};
pub use identity::{AuthenticatedMember, IdentityContext};
pub use middleware::{auth_gate, AuthGate, GateDecision};
pub use password::{PasswordEncoder, PasswordError};
pub use roles::Role;
pub use token::TokenCodec;
