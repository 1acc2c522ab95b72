// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the request identity.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(member): Auth) -> impl IntoResponse {
//!     // member is AuthenticatedMember
//! }
//! ```
//!
//! Both extractors read the [`IdentityContext`] placed in the request
//! extensions by the auth gate. A request that never passed the gate has
//! no principal.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedMember, IdentityContext};

/// Extractor for authenticated members.
///
/// Rejects with [`AuthError::Unauthenticated`] (403) when the request has
/// no principal.
pub struct Auth(pub AuthenticatedMember);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .and_then(|ctx| ctx.principal().cloned())
            .map(Auth)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extractor for the identity context, authenticated or not.
pub struct Identity(pub IdentityContext);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Identity(
            parts
                .extensions
                .get::<IdentityContext>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    fn parts_with(ctx: Option<IdentityContext>) -> Parts {
        let mut request = Request::builder().uri("/member").body(()).unwrap();
        if let Some(ctx) = ctx {
            request.extensions_mut().insert(ctx);
        }
        request.into_parts().0
    }

    fn alice() -> AuthenticatedMember {
        AuthenticatedMember {
            member_id: "m-1".to_string(),
            username: "alice".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn auth_returns_principal() {
        let mut parts = parts_with(Some(IdentityContext::authenticated(alice())));
        let Auth(member) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(member, alice());
    }

    #[tokio::test]
    async fn auth_rejects_empty_identity_with_403() {
        let mut parts = parts_with(Some(IdentityContext::anonymous()));
        let rejection = Auth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn auth_rejects_request_that_skipped_gate() {
        let mut parts = parts_with(None);
        assert!(matches!(
            Auth::from_request_parts(&mut parts, &()).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn identity_defaults_to_anonymous() {
        let mut parts = parts_with(None);
        let Identity(ctx) = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(ctx.principal().is_none());

        let mut parts = parts_with(Some(IdentityContext::authenticated(alice())));
        let Identity(ctx) = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.username(), Some("alice"));
    }
}
