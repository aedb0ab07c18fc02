//! # Turnos API
//!
//! HTTP surface of the clinic scheduling service: the public booking calendar,
//! slot and reservation management for administrators, and patient records.
//!
//! ## Architecture
//!
//! - **Routes**: URL structure, grouped by resource
//! - **Handlers**: translate requests into calls on the `turnos-core` services
//! - **Middleware**: administrator authentication and error mapping
//! - **Config**: environment configuration
//!
//! Handlers never touch the database directly. They receive the store and the
//! clock through [`ApiState`], which lets tests run the full router against the
//! in-memory store with a fixed clock.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method, StatusCode, header},
};
use chrono_tz::Tz;
use eyre::Result;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;
use turnos_core::{
    clock::{Clock, SystemClock},
    store::Store,
};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub store: Arc<dyn Store>,
    pub clock: Arc<dyn Clock>,
    /// Timezone for calendar days and recurrence
    pub timezone: Tz,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
}

impl ApiState {
    pub fn new(store: Arc<dyn Store>, config: &config::ApiConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            timezone: config.timezone,
            jwt_secret: config.jwt_secret.clone(),
            token_ttl: chrono::Duration::hours(config.token_ttl_hours),
        }
    }
}

/// Builds the application router with every route and request tracing
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Administrator login
        .merge(routes::admin::routes())
        // Slots, reservations and public calendar
        .merge(routes::turnos::routes())
        // Patient records
        .merge(routes::pacientes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true)
}

/// Starts the API server with the provided configuration and store
///
/// Initializes logging, builds the router, applies CORS and the request
/// timeout, and serves until the process is stopped.
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn Store>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState::new(store, &config));
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: BoxError| async {
                StatusCode::REQUEST_TIMEOUT
            }))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        "Server listening on http://{} (clinic timezone {})",
        addr,
        config.timezone.name()
    );
    axum::serve(listener, app).await?;

    Ok(())
}
