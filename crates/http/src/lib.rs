//! HTTP server facade for the bookshelf service with Axum, error handling,
//! and OpenAPI support.

use std::time::Duration;

use anyhow::Context;
use axum::{routing::get, Router};
use tokio::signal;

use bookshelf_kernel::settings::Settings;
use bookshelf_kernel::ModuleRegistry;

pub mod error;
pub mod router;

use router::RouterBuilder;

/// How long in-flight requests get to finish after a termination signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Start the HTTP server with the given module registry.
///
/// Blocks until a termination signal arrives, then stops accepting new
/// connections and drains in-flight requests for at most [`SHUTDOWN_GRACE`].
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let app = build_router(registry, settings);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", settings.server.host, settings.server.port))
            .await
            .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    tracing::info!("shutdown signal received, draining in-flight requests");
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(joined) => joined
            .context("HTTP server task panicked")?
            .context("HTTP server failed")?,
        Err(_) => {
            tracing::warn!(
                grace_seconds = SHUTDOWN_GRACE.as_secs(),
                "in-flight requests did not drain in time, terminating"
            );
        }
    }

    Ok(())
}

/// Build the main HTTP router with all module routes mounted
fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let mut router_builder = RouterBuilder::new().route("/", get(liveness));

    // Mount module routes
    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            path = module.base_path(),
            "mounting module routes"
        );
        router_builder = router_builder.mount_module(module.base_path(), module.routes());
    }

    // Middlewares wrap everything registered above
    router_builder = router_builder
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms);

    router_builder.with_openapi(registry).build()
}

/// Liveness probe; the root path answers a literal "OK"
async fn liveness() -> &'static str {
    "OK"
}

/// Resolves when SIGINT or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
