/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (PgPool, ObjectStore, IdentityVerifier) → Router 組み立て
 * - Middleware の適用 (gate → Accept 判定 → security headers → CORS → HTTP 共通)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware::{auth::gate, cors, http, negotiate, security_headers},
    services::{identity::build_identity_verifier, storage::LocalObjectStore},
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,customer_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash the whole process. production: stderr and keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let objects = Arc::new(LocalObjectStore::new(
        config.storage_root.clone(),
        config.storage_bucket.clone(),
    ));
    tracing::info!(
        root = %config.storage_root.display(),
        bucket = %config.storage_bucket,
        "object store ready"
    );

    let verifier = build_identity_verifier(config)?;

    Ok(AppState::new(db, objects, verifier))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = gate::apply(api::routes(), state.verifier.clone()).with_state(state);
    let router = negotiate::apply(router);
    let router = security_headers::apply(router);
    let router = cors::apply(router, config);
    http::apply(router, config)
}
