//! Metal3 client errors

use thiserror::Error;

/// Errors returned by [`crate::Metal3ClientTrait`] operations.
#[derive(Debug, Error)]
pub enum Metal3Error {
    /// Any Kubernetes API failure not covered below
    #[error("Kubernetes error: {0}")]
    Kube(#[source] kube::Error),

    /// The object does not exist (any more)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The object changed since it was read
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The API server refused the write (forbidden or invalid)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Patch body could not be built
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Metal3Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<kube::Error> for Metal3Error {
    fn from(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(response) if response.code == 404 => Self::NotFound(response.message),
            kube::Error::Api(response) if response.code == 409 => Self::Conflict(response.message),
            kube::Error::Api(response) if response.code == 403 || response.code == 422 => {
                Self::Rejected(response.message)
            }
            other => Self::Kube(other),
        }
    }
}
