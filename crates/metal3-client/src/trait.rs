//! Metal3ClientTrait for mocking
//!
//! The reconcilers only talk to the object store through this trait, so
//! unit tests can swap in [`crate::MockMetal3Client`].

use crate::error::Metal3Error;
use crds::{BareMetalHost, HardwareClassification, HardwareClassificationStatus};
use std::collections::BTreeMap;

/// Label edits for one host: `Some(value)` sets a label, `None` removes it.
pub type LabelChanges = BTreeMap<String, Option<String>>;

/// Object store operations used by the hardware classification controller.
///
/// Write operations take the object as last read and fail with
/// [`Metal3Error::Conflict`] when it has changed since.
#[async_trait::async_trait]
pub trait Metal3ClientTrait: Send + Sync {
    /// Fetch one profile. `Ok(None)` when it does not exist.
    async fn get_profile(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<HardwareClassification>, Metal3Error>;

    async fn list_profiles(&self, namespace: &str)
    -> Result<Vec<HardwareClassification>, Metal3Error>;

    /// Replace the profile's finalizer list.
    async fn set_profile_finalizers(
        &self,
        profile: &HardwareClassification,
        finalizers: Vec<String>,
    ) -> Result<(), Metal3Error>;

    /// Write the whole status block of a profile.
    async fn patch_profile_status(
        &self,
        profile: &HardwareClassification,
        status: &HardwareClassificationStatus,
    ) -> Result<(), Metal3Error>;

    /// Fetch one host. `Ok(None)` when it does not exist.
    async fn get_host(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BareMetalHost>, Metal3Error>;

    async fn list_hosts(&self, namespace: &str) -> Result<Vec<BareMetalHost>, Metal3Error>;

    /// Apply label edits to a host in a single write.
    async fn patch_host_labels(
        &self,
        host: &BareMetalHost,
        changes: &LabelChanges,
    ) -> Result<(), Metal3Error>;
}
