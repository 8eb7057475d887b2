//! Mock Metal3 client for unit testing
//!
//! Keeps profiles and hosts in memory and behaves like the API server
//! where the reconcilers depend on it:
//!
//! - every write bumps `metadata.resourceVersion`
//! - a write based on an outdated `resourceVersion` fails with a conflict
//! - a terminating profile disappears once its last finalizer is removed
//!
//! Failures can be injected per host or per operation, and every write is
//! counted so tests can assert that a pass was a no-op. Injected host
//! failures are rejections; a conflict is simulated by a concurrent write
//! racing the next label patch.

use crate::error::Metal3Error;
use crate::metal3_trait::{LabelChanges, Metal3ClientTrait};
use crds::{BareMetalHost, HardwareClassification, HardwareClassificationStatus};
use kube::{Resource, ResourceExt};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

type Key = (String, String);

fn key_of<K: Resource>(object: &K) -> Key {
    (object.namespace().unwrap_or_default(), object.name_any())
}

/// Counts of successful writes, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub finalizer_writes: usize,
    pub status_writes: usize,
    pub label_writes: usize,
}

impl WriteCounts {
    pub fn total(&self) -> usize {
        self.finalizer_writes + self.status_writes + self.label_writes
    }
}

#[derive(Debug, Default)]
struct State {
    profiles: BTreeMap<Key, HardwareClassification>,
    hosts: BTreeMap<Key, BareMetalHost>,
    next_version: u64,
    writes: WriteCounts,
    failing_hosts: HashSet<String>,
    racing_hosts: HashSet<String>,
    fail_list_hosts: bool,
    fail_status_writes: bool,
}

impl State {
    fn bump_version(&mut self) -> String {
        self.next_version += 1;
        self.next_version.to_string()
    }
}

/// In-memory [`Metal3ClientTrait`] implementation.
#[derive(Debug, Clone, Default)]
pub struct MockMetal3Client {
    state: Arc<Mutex<State>>,
}

/// Rejects writes whose read version is no longer current.
fn check_version<K: Resource>(stored: &K, written: &K) -> Result<(), Metal3Error> {
    match written.resource_version() {
        Some(version) if Some(&version) != stored.resource_version().as_ref() => {
            Err(Metal3Error::Conflict(format!(
                "{} was modified (read version {version})",
                written.name_any()
            )))
        }
        _ => Ok(()),
    }
}

impl MockMetal3Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile (for test setup).
    pub fn add_profile(&self, mut profile: HardwareClassification) {
        let mut state = self.state.lock().unwrap();
        profile.metadata.resource_version = Some(state.bump_version());
        state.profiles.insert(key_of(&profile), profile);
    }

    /// Insert or replace a host (for test setup).
    pub fn add_host(&self, mut host: BareMetalHost) {
        let mut state = self.state.lock().unwrap();
        host.metadata.resource_version = Some(state.bump_version());
        state.hosts.insert(key_of(&host), host);
    }

    pub fn profile(&self, namespace: &str, name: &str) -> Option<HardwareClassification> {
        let state = self.state.lock().unwrap();
        state
            .profiles
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn host(&self, namespace: &str, name: &str) -> Option<BareMetalHost> {
        let state = self.state.lock().unwrap();
        state
            .hosts
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Label value on a stored host.
    pub fn host_label(&self, namespace: &str, name: &str, key: &str) -> Option<String> {
        self.host(namespace, name)
            .and_then(|host| host.labels().get(key).cloned())
    }

    pub fn writes(&self) -> WriteCounts {
        self.state.lock().unwrap().writes
    }

    pub fn reset_writes(&self) {
        self.state.lock().unwrap().writes = WriteCounts::default();
    }

    /// Make every label write to the named host fail with a rejection.
    pub fn fail_label_writes_for(&self, host: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_hosts
            .insert(host.to_string());
    }

    /// The next label write to the named host loses a race against
    /// another writer: the host is modified and the write conflicts.
    pub fn conflict_next_label_write(&self, host: &str) {
        self.state
            .lock()
            .unwrap()
            .racing_hosts
            .insert(host.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing_hosts.clear();
        state.racing_hosts.clear();
        state.fail_list_hosts = false;
        state.fail_status_writes = false;
    }

    pub fn fail_list_hosts(&self, fail: bool) {
        self.state.lock().unwrap().fail_list_hosts = fail;
    }

    pub fn fail_status_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_status_writes = fail;
    }

    /// Simulate a concurrent writer touching a host.
    pub fn touch_host(&self, namespace: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        let version = state.bump_version();
        if let Some(host) = state
            .hosts
            .get_mut(&(namespace.to_string(), name.to_string()))
        {
            host.metadata.resource_version = Some(version);
        }
    }
}

#[async_trait::async_trait]
impl Metal3ClientTrait for MockMetal3Client {
    async fn get_profile(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<HardwareClassification>, Metal3Error> {
        Ok(self.profile(namespace, name))
    }

    async fn list_profiles(
        &self,
        namespace: &str,
    ) -> Result<Vec<HardwareClassification>, Metal3Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, profile)| profile.clone())
            .collect())
    }

    async fn set_profile_finalizers(
        &self,
        profile: &HardwareClassification,
        finalizers: Vec<String>,
    ) -> Result<(), Metal3Error> {
        let mut state = self.state.lock().unwrap();
        let key = key_of(profile);
        let version = state.bump_version();
        let stored = state
            .profiles
            .get_mut(&key)
            .ok_or_else(|| Metal3Error::NotFound(key.1.clone()))?;
        check_version(&*stored, profile)?;

        let release = finalizers.is_empty() && stored.metadata.deletion_timestamp.is_some();
        stored.metadata.finalizers = Some(finalizers);
        stored.metadata.resource_version = Some(version);
        if release {
            state.profiles.remove(&key);
        }
        state.writes.finalizer_writes += 1;
        Ok(())
    }

    async fn patch_profile_status(
        &self,
        profile: &HardwareClassification,
        status: &HardwareClassificationStatus,
    ) -> Result<(), Metal3Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_status_writes {
            return Err(Metal3Error::Conflict("injected status write failure".to_string()));
        }
        let key = key_of(profile);
        let version = state.bump_version();
        let stored = state
            .profiles
            .get_mut(&key)
            .ok_or_else(|| Metal3Error::NotFound(key.1.clone()))?;
        check_version(&*stored, profile)?;

        stored.status = Some(status.clone());
        stored.metadata.resource_version = Some(version);
        state.writes.status_writes += 1;
        Ok(())
    }

    async fn get_host(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BareMetalHost>, Metal3Error> {
        Ok(self.host(namespace, name))
    }

    async fn list_hosts(&self, namespace: &str) -> Result<Vec<BareMetalHost>, Metal3Error> {
        let state = self.state.lock().unwrap();
        if state.fail_list_hosts {
            return Err(Metal3Error::Conflict("injected list failure".to_string()));
        }
        Ok(state
            .hosts
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, host)| host.clone())
            .collect())
    }

    async fn patch_host_labels(
        &self,
        host: &BareMetalHost,
        changes: &LabelChanges,
    ) -> Result<(), Metal3Error> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut state = self.state.lock().unwrap();
        let key = key_of(host);
        if state.failing_hosts.contains(&key.1) {
            return Err(Metal3Error::Rejected(format!(
                "injected label write failure for {}",
                key.1
            )));
        }
        if state.racing_hosts.remove(&key.1) {
            let version = state.bump_version();
            if let Some(stored) = state.hosts.get_mut(&key) {
                stored.metadata.resource_version = Some(version);
            }
        }
        let version = state.bump_version();
        let stored = state
            .hosts
            .get_mut(&key)
            .ok_or_else(|| Metal3Error::NotFound(key.1.clone()))?;
        check_version(&*stored, host)?;

        let labels = stored.metadata.labels.get_or_insert_with(BTreeMap::new);
        for (label, value) in changes {
            match value {
                Some(value) => {
                    labels.insert(label.clone(), value.clone());
                }
                None => {
                    labels.remove(label);
                }
            }
        }
        stored.metadata.resource_version = Some(version);
        state.writes.label_writes += 1;
        Ok(())
    }
}
