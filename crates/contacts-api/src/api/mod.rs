//! HTTP API for contacts and messaging.

mod extract;
mod handlers;
mod middleware;
mod types;

pub use extract::{ApiJson, ApiQuery};
pub use handlers::*;
pub use middleware::{cors_layer, logging_middleware, require_auth, AuthUser};
pub use types::*;

use crate::auth::{CredentialHasher, TokenIssuer};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use contacts_store::Database;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use twilio_client::SmsGateway;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Users, contacts and messages
    pub db: Database,
    /// SMS provider
    pub gateway: Arc<dyn SmsGateway>,
    /// Bearer token signer
    pub tokens: Arc<TokenIssuer>,
    /// Password hasher
    pub hasher: Arc<CredentialHasher>,
    /// Largest page size served
    pub max_page_size: u64,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        gateway: Arc<dyn SmsGateway>,
        tokens: TokenIssuer,
        hasher: CredentialHasher,
        max_page_size: u64,
    ) -> Self {
        Self {
            db,
            gateway,
            tokens: Arc::new(tokens),
            hasher: Arc::new(hasher),
            max_page_size: max_page_size.max(1),
        }
    }
}

/// Create the API router with CORS open to any origin.
pub fn create_router(state: AppState) -> Router {
    create_router_with_origins(state, &[])
}

/// Create the API router with CORS limited to `origins`.
pub fn create_router_with_origins(state: AppState, origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/api/contacts", get(handlers::list_contacts).post(handlers::create_contact))
        .route("/api/contacts/bulk", post(handlers::create_contacts_bulk))
        .route("/api/contacts/send-otp", post(handlers::send_otp))
        .route(
            "/api/contacts/:id",
            get(handlers::get_contact).delete(handlers::delete_contact),
        )
        .route("/api/messages", get(handlers::list_messages))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .merge(protected)
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(origins))
        .with_state(state)
}
