//! Controller-specific error types.

use kube::Error as KubeError;
use metal3_client::Metal3Error;
use thiserror::Error;

/// Errors that can occur in the hardware classification controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes client setup or watch error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Object store read or write failed
    #[error("Metal3 error: {0}")]
    Metal3(#[from] Metal3Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// One or more host label writes failed
    #[error("Label sync failed: {0}")]
    LabelSync(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
