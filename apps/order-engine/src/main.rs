//! Order Engine Binary
//!
//! Starts the order engine with its reconciliation pump and position
//! projector.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-engine
//! ```
//!
//! # Environment Variables
//!
//! - `SESSION_MODE`: OFFLINE | SIMULATED (default: OFFLINE)
//! - `SESSION_EVENT_CAPACITY`: simulated session channel size (default: 256)
//! - `ORDER_UPDATES_CAPACITY`: order update channel size (default: 1000)
//! - `CONNECTION_STATUS_CAPACITY`: status channel size (default: 64)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Result;
use order_engine::application::bus::NotificationBus;
use order_engine::application::positions::PositionProjector;
use order_engine::application::ports::FixSessionPort;
use order_engine::application::store::OrderStore;
use order_engine::application::OrderLifecycleEngine;
use order_engine::config::{EngineConfig, SessionMode};
use order_engine::infrastructure::session::{OfflineFixSession, SimulatedFixSession};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    init_tracing();

    tracing::info!("Starting order engine");

    let config = EngineConfig::from_env();
    tracing::info!(
        session_mode = config.session_mode_name(),
        order_updates_capacity = config.bus.order_updates_capacity,
        "Configuration loaded"
    );

    let session = create_session(&config);
    let store = Arc::new(OrderStore::new());
    let bus = Arc::new(NotificationBus::new(config.bus));
    let projector = Arc::new(PositionProjector::new());

    let engine = Arc::new(OrderLifecycleEngine::new(
        session,
        Arc::clone(&store),
        Arc::clone(&bus),
    ));

    let pump_handle = tokio::spawn(Arc::clone(&engine).run());
    let projector_handle = tokio::spawn(Arc::clone(&projector).run(bus.order_updates_rx()));

    tracing::info!("Order engine ready");

    shutdown_signal().await;

    // Dropping the engine and bus closes the channels, which ends both
    // background tasks.
    pump_handle.abort();
    projector_handle.abort();

    tracing::info!(orders = store.len(), "Order engine stopped");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Initialize the tracing subscriber with environment filter.
///
/// Uses a static directive string that is a compile-time constant guaranteed to parse.
#[allow(clippy::expect_used)]
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "order_engine=info"
                    .parse()
                    .expect("static directive 'order_engine=info' is valid"),
            ),
        )
        .init();
}

/// Create the configured session adapter.
fn create_session(config: &EngineConfig) -> Arc<dyn FixSessionPort> {
    match config.session_mode {
        SessionMode::Offline => {
            tracing::info!("Running with offline session, orders park locally");
            Arc::new(OfflineFixSession::new())
        }
        SessionMode::Simulated => {
            tracing::info!("Running with simulated session");
            Arc::new(SimulatedFixSession::new(config.session_event_capacity))
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed. A process that cannot
/// respond to termination signals is worse than one that fails at
/// startup.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
