//! # Vigil Client
//!
//! Runs the client core until Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics
//! 2. Load configuration from the environment
//! 3. Run the bootstrap sequence (aborts on a CRITICAL step failure)
//! 4. Resolve identity and start sync in the background
//! 5. Wait for Ctrl+C, then shut down gracefully

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use client_runtime::{ClientConfig, ClientRuntime, StartupError};
use vc_01_identity_resolver::IdentityApi;
use vigil_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config = ClientConfig::from_env().context("Invalid configuration")?;
    info!(data_dir = %config.storage.data_dir.display(), "Configuration loaded");

    let runtime = ClientRuntime::new(config).context("Invalid configuration")?;

    match runtime.start().await {
        Ok(report) => {
            for (step, failure) in &report.failed {
                warn!(step = %step, error = %failure, "Running without subsystem");
            }
        }
        Err(StartupError::Bootstrap(e)) => {
            error!(step = e.step(), error = %e, "Startup aborted");
            runtime.shutdown().await;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    }

    let identity_runtime = runtime.container();
    tokio::spawn(async move {
        let mut updates = identity_runtime.identity.watch();
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            info!(identity = state.label(), "Identity changed");
        }
    });

    info!("Client is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
