// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use casting_agency_server::{
    api::router,
    config::Settings,
    state::AppState,
    store::InMemoryStore,
    telemetry,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init(settings.log_format);

    let authorizer = match settings.auth.build_authorizer() {
        Ok(authorizer) => authorizer,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize authorization");
            return ExitCode::FAILURE;
        }
    };

    // Warm the key set; a failure here is not fatal, the first request retries.
    match authorizer.key_set().refresh().await {
        Ok(count) => tracing::info!(keys = count, "Signing keys loaded"),
        Err(e) => tracing::warn!(error = %e, "Signing keys not loaded yet"),
    }

    let state = AppState::new(InMemoryStore::new(), authorizer);
    let app = router(state);

    let listener = match TcpListener::bind(settings.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %settings.bind_addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    tracing::info!(
        addr = %settings.bind_addr,
        issuer = %settings.auth.issuer,
        jwks_url = %settings.auth.jwks_url,
        "Casting agency server listening (docs at /docs)"
    );

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await;

    match result {
        Ok(()) => {
            tracing::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
    shutdown.cancel();
}
