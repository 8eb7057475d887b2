//! HardwareClassification profile reconciler.
//!
//! A profile moves between two states. While active, each pass validates
//! it, matches it against every host in its namespace, synchronizes the
//! profile label and persists the aggregated status. Once deleted, the
//! finalizer is held until no host carries the profile label.

use super::{PROFILE_KIND, evaluate_host, Reconciler};
use crate::error::ControllerError;
use crate::labels::sync_labels;
use crate::status::{self, ErrorHostCounts};
use crate::validation::validate;
use crds::{BareMetalHost, HardwareClassification, HardwareClassificationStatus, FINALIZER};
use kube::ResourceExt;
use tracing::{debug, info, warn};

impl Reconciler {
    /// Runs one pass for the profile `namespace/name`.
    pub async fn reconcile_profile(&self, namespace: &str, name: &str) -> Result<(), ControllerError> {
        let Some(profile) = self.client.get_profile(namespace, name).await? else {
            debug!("HardwareClassification {}/{} not found, nothing to do", namespace, name);
            self.forget(PROFILE_KIND, namespace, name);
            return Ok(());
        };

        match (profile.is_terminating(), profile.has_finalizer()) {
            (true, false) => {
                debug!("HardwareClassification {}/{} is being deleted and already released", namespace, name);
                return Ok(());
            }
            (false, false) => return self.add_finalizer(&profile).await,
            (true, true) => return self.release_when_unlabelled(&profile).await,
            (false, true) => {}
        }

        if let Err(error) = validate(&profile.spec.hardware_characteristics) {
            warn!("HardwareClassification {}/{} is misconfigured: {}", namespace, name, error);
            return self.write_status(&profile, status::misconfigured(&error)).await;
        }

        let hosts = self.client.list_hosts(namespace).await?;
        if hosts.is_empty() {
            info!("No BareMetalHost in namespace {} for HardwareClassification {}", namespace, name);
            return self.write_status(&profile, status::no_hosts(Some(namespace))).await;
        }

        let evaluations: Vec<(&BareMetalHost, bool)> = hosts
            .iter()
            .filter_map(|host| evaluate_host(&profile, host).map(|matched| (host, matched)))
            .collect();
        let matched = evaluations.iter().filter(|(_, matched)| *matched).count();
        debug!(
            "HardwareClassification {}/{}: {} of {} evaluated hosts match ({} hosts in namespace)",
            namespace,
            name,
            matched,
            evaluations.len(),
            hosts.len()
        );

        // A conflict leaves the status alone; the retried pass re-reads.
        let report = sync_labels(&*self.client, &profile, &evaluations).await?;

        let errors = ErrorHostCounts::from_hosts(&hosts);
        let aggregated = status::aggregate(count(matched), &errors, count(hosts.len()));
        let desired = status::with_label_failures(aggregated, &report);
        self.write_status(&profile, desired).await?;

        if !report.is_clean() {
            return Err(ControllerError::LabelSync(report.failure_message()));
        }
        Ok(())
    }

    async fn add_finalizer(&self, profile: &HardwareClassification) -> Result<(), ControllerError> {
        let mut finalizers = profile.finalizers().to_vec();
        finalizers.push(FINALIZER.to_string());
        self.client.set_profile_finalizers(profile, finalizers).await?;
        info!("Added finalizer to HardwareClassification {}", key_of(profile));
        Ok(())
    }

    /// Removes the finalizer once no host in the namespace carries the
    /// profile label. Labels are stripped by the host reconciler.
    async fn release_when_unlabelled(
        &self,
        profile: &HardwareClassification,
    ) -> Result<(), ControllerError> {
        let namespace = profile.namespace().unwrap_or_default();
        let label_key = profile.label_key();
        let holders = self
            .client
            .list_hosts(&namespace)
            .await?
            .iter()
            .filter(|host| host.labels().contains_key(&label_key))
            .count();

        if holders > 0 {
            info!(
                "HardwareClassification {} is being deleted, waiting for {} host(s) to drop label {}",
                key_of(profile),
                holders,
                label_key
            );
            return Ok(());
        }

        let finalizers: Vec<String> = profile
            .finalizers()
            .iter()
            .filter(|f| f.as_str() != FINALIZER)
            .cloned()
            .collect();
        self.client.set_profile_finalizers(profile, finalizers).await?;
        info!("Removed finalizer from HardwareClassification {}", key_of(profile));
        Ok(())
    }

    async fn write_status(
        &self,
        profile: &HardwareClassification,
        desired: HardwareClassificationStatus,
    ) -> Result<(), ControllerError> {
        if !status::needs_update(profile.status.as_ref(), &desired) {
            debug!("HardwareClassification {} status unchanged", key_of(profile));
            return Ok(());
        }
        match self.client.patch_profile_status(profile, &desired).await {
            Ok(()) => {}
            Err(error) if error.is_not_found() => {
                debug!("HardwareClassification {} deleted before its status was written", key_of(profile));
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        }
        info!(
            "Updated HardwareClassification {} status: {:?} (matched {}, unmatched {}, error hosts {})",
            key_of(profile),
            desired.profile_match_status,
            desired.matched_count,
            desired.unmatched_count,
            desired.error_hosts
        );
        Ok(())
    }
}

fn key_of(profile: &HardwareClassification) -> String {
    format!("{}/{}", profile.namespace().unwrap_or_default(), profile.name_any())
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
