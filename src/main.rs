// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, sync::Arc};

use myboard_server::{
    api::router,
    config::{Settings, DEFAULT_LOG_FILTER, MEMBER_DB_FILE},
    state::AppState,
    storage::{InMemoryMemberStore, MemberDatabase, MemberStore},
};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    init_tracing(settings.json_logs);

    let store: Arc<dyn MemberStore> = match &settings.data_dir {
        Some(dir) => {
            let path = dir.join(MEMBER_DB_FILE);
            tracing::info!(path = %path.display(), "Opening member database");
            Arc::new(MemberDatabase::open(&path)?)
        }
        None => {
            tracing::warn!("DATA_DIR not set, members are kept in memory only");
            Arc::new(InMemoryMemberStore::new())
        }
    };

    let state =
        AppState::new(store, settings.auth.clone()).with_persistence(settings.data_dir.is_some());
    let app = router(state);

    tracing::info!(
        addr = %settings.bind_addr,
        login_path = %settings.auth.login_path,
        scheme_policy = ?settings.auth.scheme_policy,
        "MyBoard server listening (docs at /docs)"
    );

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
