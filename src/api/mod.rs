// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::Request,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{auth_gate, AuthenticatedMember, Role},
    models::{
        LoginRequest, MemberInfo, MemberUpdateRequest, SignUpRequest, UpdatePasswordRequest,
        WithdrawRequest,
    },
    state::AppState,
};

pub mod health;
pub mod login;
pub mod members;

pub fn router(state: AppState) -> Router {
    let gate = state.gate.clone();
    let login_path = state.settings().login_path.clone();

    let routes = Router::new()
        .route(&login_path, post(login::login))
        .route("/logout", post(login::logout))
        .route("/signUp", post(members::sign_up))
        .route(
            "/member",
            get(members::my_info)
                .put(members::update_member)
                .delete(members::withdraw),
        )
        .route("/member/password", put(members::update_password))
        .route("/member/{id}", get(members::member_info))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    // Outermost first: the request ID exists before the trace span opens,
    // and the gate sees requests only after CORS preflights are answered.
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id,
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(gate, auth_gate));

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(layers)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        login::login,
        login::logout,
        members::sign_up,
        members::my_info,
        members::member_info,
        members::update_member,
        members::update_password,
        members::withdraw,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            LoginRequest,
            SignUpRequest,
            MemberUpdateRequest,
            UpdatePasswordRequest,
            WithdrawRequest,
            MemberInfo,
            AuthenticatedMember,
            Role,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Login and logout"),
        (name = "Members", description = "Member accounts"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::Request,
        response::Response,
        Router,
    };

    use super::router;
    use crate::auth::PasswordEncoder;
    use crate::config::AuthSettings;
    use crate::state::AppState;
    use crate::storage::{MemberStore, StoreError, StoreResult, StoredMember};

    pub const SECRET: &str = "board-api-test-secret-which-is-32-bytes-plus";

    /// Router and state over an in-memory store holding `alice`
    /// (password `alice-password`).
    pub fn seeded_app() -> (Router, AppState) {
        let state = AppState::in_memory(AuthSettings::new(SECRET));
        let hash = PasswordEncoder::new().encode("alice-password").unwrap();
        state
            .store
            .create(&StoredMember::new("alice", hash, "Alice", "al", 30))
            .unwrap();
        (router(state.clone()), state)
    }

    /// Router over a store whose every call fails.
    pub fn failing_app() -> Router {
        router(AppState::new(Arc::new(FailingStore), AuthSettings::new(SECRET)))
    }

    pub fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    pub fn request(method: &str, uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    pub fn json_request(
        method: &str,
        uri: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub struct FailingStore;

    fn down<T>() -> StoreResult<T> {
        Err(StoreError::Unavailable("store is down".into()))
    }

    impl MemberStore for FailingStore {
        fn find_by_id(&self, _: &str) -> StoreResult<Option<StoredMember>> {
            down()
        }
        fn find_by_username(&self, _: &str) -> StoreResult<Option<StoredMember>> {
            down()
        }
        fn find_by_refresh_token(&self, _: &str) -> StoreResult<Option<StoredMember>> {
            down()
        }
        fn set_refresh_token(&self, _: &str, _: &str) -> StoreResult<()> {
            down()
        }
        fn clear_refresh_token(&self, _: &str) -> StoreResult<()> {
            down()
        }
        fn create(&self, _: &StoredMember) -> StoreResult<()> {
            down()
        }
        fn update(&self, _: &StoredMember) -> StoreResult<()> {
            down()
        }
        fn delete(&self, _: &str) -> StoreResult<()> {
            down()
        }
        fn health_check(&self) -> StoreResult<()> {
            down()
        }
    }
}
