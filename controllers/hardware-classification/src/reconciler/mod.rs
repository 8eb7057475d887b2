//! Reconciliation logic for HardwareClassification profiles.
//!
//! Two reconcilers share one [`Reconciler`]:
//! - `profile`: keyed by profile; finalizer handling, matching, label
//!   synchronization and status.
//! - `host`: keyed by host; applies every profile's label decision to one
//!   host, and strips labels of profiles being deleted.
//!
//! Neither keeps host state between passes; every pass re-reads the store.

pub mod host;
pub mod profile;

#[cfg(test)]
mod host_test;

use crate::backoff::FibonacciBackoff;
use crate::config::ControllerConfig;
use crate::validation::validate;
use crds::{BareMetalHost, HardwareClassification};
use metal3_client::Metal3ClientTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub(crate) const PROFILE_KIND: &str = "HardwareClassification";
pub(crate) const HOST_KIND: &str = "BareMetalHost";

/// Key used for per-object backoff tracking.
pub(crate) fn backoff_key(kind: &str, namespace: &str, name: &str) -> String {
    format!("{kind}/{namespace}/{name}")
}

/// Reconciles HardwareClassification profiles and BareMetalHost labels.
pub struct Reconciler {
    pub(crate) client: Box<dyn Metal3ClientTrait + Send + Sync>,
    /// Requeue backoff per failing object (kind/namespace/name)
    backoff_states: Arc<Mutex<HashMap<String, FibonacciBackoff>>>,
    backoff_min_secs: u64,
    backoff_max_secs: u64,
}

impl Reconciler {
    pub fn new(client: Box<dyn Metal3ClientTrait + Send + Sync>, config: &ControllerConfig) -> Self {
        Self {
            client,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
            backoff_min_secs: config.backoff_min_secs,
            backoff_max_secs: config.backoff_max_secs,
        }
    }

    fn backoff_states(&self) -> MutexGuard<'_, HashMap<String, FibonacciBackoff>> {
        // A panic while holding the lock leaves the map usable.
        self.backoff_states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Delay before retrying `key` after another failure.
    pub fn next_backoff(&self, key: &str) -> Duration {
        let (min, max) = (self.backoff_min_secs, self.backoff_max_secs);
        self.backoff_states()
            .entry(key.to_string())
            .or_insert_with(|| FibonacciBackoff::new(min, max))
            .next_backoff()
    }

    /// Forgets the failure history of `key` after a clean pass.
    pub fn reset_backoff(&self, key: &str) {
        self.backoff_states().remove(key);
    }

    /// Drops the backoff state of an object that no longer exists.
    fn forget(&self, kind: &str, namespace: &str, name: &str) {
        self.reset_backoff(&backoff_key(kind, namespace, name));
    }
}

/// Whether a profile may change labels at all: it carries the finalizer,
/// is not being deleted and passes validation.
pub(crate) fn is_active(profile: &HardwareClassification) -> bool {
    profile.has_finalizer()
        && !profile.is_terminating()
        && validate(&profile.spec.hardware_characteristics).is_ok()
}

/// Match result for a host that takes part in matching, `None` for hosts
/// that are not ready or have not been inspected.
pub(crate) fn evaluate_host(profile: &HardwareClassification, host: &BareMetalHost) -> Option<bool> {
    if !host.is_ready() || host.hardware_details().is_none() {
        return None;
    }
    Some(classifier::profile_matches_host(profile, host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use metal3_client::MockMetal3Client;

    #[test]
    fn test_backoff_per_key() {
        let reconciler = test_reconciler(&MockMetal3Client::new());
        assert_eq!(reconciler.next_backoff("profile/metal3/a"), Duration::from_secs(15));
        assert_eq!(reconciler.next_backoff("profile/metal3/a"), Duration::from_secs(15));
        assert_eq!(reconciler.next_backoff("profile/metal3/a"), Duration::from_secs(30));
        assert_eq!(reconciler.next_backoff("profile/metal3/b"), Duration::from_secs(15));

        reconciler.reset_backoff("profile/metal3/a");
        assert_eq!(reconciler.next_backoff("profile/metal3/a"), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_backoff_pruned_for_deleted_objects() {
        let reconciler = test_reconciler(&MockMetal3Client::new());
        let profile_key = backoff_key(PROFILE_KIND, NAMESPACE, "gold");
        let host_key = backoff_key(HOST_KIND, NAMESPACE, "worker-0");
        for key in [&profile_key, &host_key] {
            for _ in 0..3 {
                let _ = reconciler.next_backoff(key);
            }
        }

        // Neither object exists in the store.
        reconciler.reconcile_profile(NAMESPACE, "gold").await.unwrap();
        reconciler.reconcile_host(NAMESPACE, "worker-0").await.unwrap();

        assert_eq!(reconciler.next_backoff(&profile_key), Duration::from_secs(15));
        assert_eq!(reconciler.next_backoff(&host_key), Duration::from_secs(15));
    }

    #[test]
    fn test_evaluate_host_skips_unready_and_uninspected() {
        let profile = active_profile("gold", valid_characteristics());
        assert_eq!(evaluate_host(&profile, &test_host("a", "ready", Some(matching_details()))), Some(true));
        assert_eq!(evaluate_host(&profile, &test_host("b", "available", Some(small_details()))), Some(false));
        assert_eq!(evaluate_host(&profile, &test_host("c", "provisioned", Some(matching_details()))), None);
        assert_eq!(evaluate_host(&profile, &test_host("d", "ready", None)), None);
    }

    #[test]
    fn test_is_active() {
        assert!(is_active(&active_profile("gold", valid_characteristics())));
        assert!(!is_active(&test_profile("gold", valid_characteristics())));
        assert!(!is_active(&terminating(active_profile("gold", valid_characteristics()))));
        assert!(!is_active(&active_profile("gold", Default::default())));
    }
}
