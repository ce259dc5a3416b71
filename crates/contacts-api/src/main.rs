//! Contacts API - Entry point.

use anyhow::{Context, Result};
use contacts_api::{
    api::{create_router_with_origins, AppState},
    auth::{CredentialHasher, TokenIssuer},
    config::{Config, LogConfig, LogFormat},
};
use contacts_store::{Database, Store};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use twilio_client::TwilioClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.log);

    info!("Starting Contacts API");

    // Initialize storage
    let store = if config.store.persist {
        info!(path = %config.store.path.display(), "Using snapshot storage");
        Store::file(config.store.path.clone())
    } else {
        info!("Persistence disabled, using in-memory storage");
        Store::memory()
    };

    let db = Database::open(store, config.contacts.default_country_code.clone())
        .await
        .context("Failed to open contact store")?;

    let stats = db.stats().await;
    info!(
        users = stats.users,
        contacts = stats.contacts,
        messages = stats.messages,
        "Store loaded"
    );

    // Initialize Twilio client
    let twilio = TwilioClient::new(
        &config.twilio.api_url,
        &config.twilio.account_sid,
        config.twilio.auth_token.clone(),
        &config.twilio.from_number,
        config.twilio.timeout,
    )
    .context("Failed to create Twilio client")?;

    if twilio.health_check().await {
        info!(from = %twilio.from_number(), "Twilio credentials accepted");
    } else {
        warn!("Twilio health check failed - sends may fail");
    }

    let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl)
        .context("Failed to create token issuer")?;
    let hasher = CredentialHasher::new(config.auth.hash_memory_kib, config.auth.hash_iterations)
        .context("Failed to create password hasher")?;

    // Create application state
    let state = AppState::new(
        db,
        Arc::new(twilio),
        tokens,
        hasher,
        config.contacts.max_page_size,
    );

    let app = create_router_with_origins(state, &config.server.allowed_origins());

    // Bind to address
    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address {}", config.server.listen_addr))?,
        config.server.port,
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on {}", addr);

    // Run server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&log.level));

    let registry = tracing_subscriber::registry().with(filter);

    match log.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
