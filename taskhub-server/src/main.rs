//! `TaskHub` API server — in-memory REST backend for development and tests.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:5000
//! cargo run --bin taskhub-server
//!
//! # Run on custom address with a seeded admin account
//! cargo run --bin taskhub-server -- \
//!     --bind 127.0.0.1:8080 \
//!     --admin-email root@example.com --admin-password changeme
//!
//! # Or via environment variables
//! TASKHUB_ADDR=127.0.0.1:8080 cargo run --bin taskhub-server
//! ```

use std::sync::Arc;

use clap::Parser;
use taskhub_api::user::Role;
use taskhub_server::config::{ServerCliArgs, ServerConfig};
use taskhub_server::state::ServerState;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting taskhub server");

    let state = Arc::new(ServerState::new());
    if let Some(admin) = &config.admin {
        let id = state
            .seed_account(&admin.email, &admin.password, Role::Admin)
            .await;
        tracing::info!(email = %admin.email, id = %id, "seeded admin account");
    }

    match taskhub_server::start_server(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "taskhub server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    }
}
