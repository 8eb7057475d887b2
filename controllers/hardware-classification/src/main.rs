//! Hardware Classification Controller
//!
//! Matches inspected `BareMetalHost` hardware against
//! `HardwareClassification` profiles and labels the hosts that fit:
//! - HardwareClassification: reconciled for finalizers, labels and status
//! - BareMetalHost: reconciled so its labels follow every profile

mod backoff;
mod config;
mod controller;
mod error;
mod labels;
mod reconciler;
mod status;
#[cfg(test)]
mod test_utils;
mod validation;
mod watcher;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use kube::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Hardware Classification Controller");

    let config = ControllerConfig::from_env()?;
    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Concurrency: {}", config.concurrency);
    info!("  Debounce: {:?}", config.debounce);
    info!("  Error backoff: {}s..{}s", config.backoff_min_secs, config.backoff_max_secs);

    let client = Client::try_default().await?;
    let controller = Controller::new(client, config);
    controller.run().await?;

    Ok(())
}
