// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bearer_gate::api::router;
use bearer_gate::config::{Config, LogFormat, DEFAULT_LOG_FILTER};
use bearer_gate::state::AppState;

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    let addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::from_config(&config);
    tracing::info!(
        stages = ?state.security.stage_names(),
        protected_paths = ?config.protected_paths,
        mapped_paths = config.role_map.len(),
        clock_skew_secs = config.clock_skew.as_secs(),
        "security chain configured"
    );

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%addr, "Bearer Gate listening");

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
