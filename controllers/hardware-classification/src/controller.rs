//! Main controller implementation.
//!
//! Builds the shared [`Reconciler`] and runs the profile and host
//! watchers side by side until one of them exits.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use crds::{BareMetalHost, HardwareClassification};
use kube::{Api, Client};
use metal3_client::Metal3Client;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Hardware classification controller.
pub struct Controller {
    profile_watcher: JoinHandle<Result<(), ControllerError>>,
    host_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates the controller and starts both watchers.
    pub fn new(client: Client, config: ControllerConfig) -> Self {
        info!("Initializing Hardware Classification Controller");

        let (profile_api, host_api): (Api<HardwareClassification>, Api<BareMetalHost>) =
            match config.namespace.as_deref() {
                Some(ns) => (Api::namespaced(client.clone(), ns), Api::namespaced(client.clone(), ns)),
                None => (Api::all(client.clone()), Api::all(client.clone())),
            };

        let reconciler = Arc::new(Reconciler::new(Box::new(Metal3Client::new(client)), &config));
        let watcher = Watcher::new(reconciler, profile_api, host_api, config);

        let profile_watcher = {
            let watcher = watcher.clone();
            tokio::spawn(async move { watcher.watch_profiles().await })
        };
        let host_watcher = tokio::spawn(async move { watcher.watch_hosts().await });

        Self {
            profile_watcher,
            host_watcher,
        }
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Hardware Classification Controller running");

        // Watchers run forever; whichever exits first ends the process.
        tokio::select! {
            result = &mut self.profile_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("HardwareClassification watcher panicked: {}", e)))??;
            }
            result = &mut self.host_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("BareMetalHost watcher panicked: {}", e)))??;
            }
        }

        Ok(())
    }
}
