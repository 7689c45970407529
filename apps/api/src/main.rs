mod auth;
mod config;
mod db;
mod document;
mod editor;
mod errors;
mod generation;
mod imports;
mod llm_client;
mod models;
mod persistence;
mod resumes;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::CookieSessionAuthenticator;
use crate::config::Config;
use crate::db::create_pool;
use crate::editor::EditorRegistry;
use crate::generation::LlmTextGenerator;
use crate::llm_client::LlmClient;
use crate::persistence::repository::PgResumeRepository;
use crate::persistence::session_store::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::persistence::PersistenceGateway;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvforge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (migrations run here)
    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize Redis-backed session slots. Without Redis, staging and backups
    // only live as long as this process.
    let sessions: Arc<dyn SessionStore> =
        match RedisSessionStore::connect(&config.redis_url, config.session_ttl_secs).await {
            Ok(store) => {
                info!("Redis session store connected");
                Arc::new(store)
            }
            Err(e) => {
                warn!("Redis unavailable ({e}), using in-process session store");
                Arc::new(InMemorySessionStore::new())
            }
        };

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Open editors are dropped after sitting idle as long as a session slot lives
    let idle_ttl = Duration::from_secs(config.session_ttl_secs);
    let editors = EditorRegistry::new(idle_ttl);
    editors.spawn_eviction(idle_ttl.clamp(Duration::from_secs(1), Duration::from_secs(60)));

    // Build app state
    let state = AppState {
        db: db.clone(),
        gateway: PersistenceGateway::new(Arc::new(PgResumeRepository::new(db)), sessions),
        authenticator: Arc::new(CookieSessionAuthenticator),
        generator: Arc::new(LlmTextGenerator::new(llm)),
        editors,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
