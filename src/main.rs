// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calshare API Server
//!
//! Serves shared calendar categories for members signed in with Google.

use calshare::{
    config::Config,
    db::Db,
    services::{GoogleOAuthClient, RandomColorPicker},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Calshare API");

    // Open database and apply migrations
    let db = Db::connect(&config.database_url).await?;

    let google = GoogleOAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );
    tracing::info!(client_id = %config.google_client_id, "Google OAuth client initialized");

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        db,
        Arc::new(google),
        Arc::new(RandomColorPicker),
    ));

    // Build router
    let app = calshare::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("calshare=debug,info")),
        )
        .with(format)
        .init();
}
