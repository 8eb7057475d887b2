//! BareMetalHost reconciler.
//!
//! Computes every profile's label decision for one host and applies them
//! in a single write.

use super::{HOST_KIND, evaluate_host, is_active, Reconciler};
use crate::error::ControllerError;
use crate::labels::LabelIntent;
use crds::{BareMetalHost, HardwareClassification};
use kube::ResourceExt;
use metal3_client::LabelChanges;
use tracing::{debug, info};

impl Reconciler {
    /// Runs one pass for the host `namespace/name`.
    pub async fn reconcile_host(&self, namespace: &str, name: &str) -> Result<(), ControllerError> {
        let Some(host) = self.client.get_host(namespace, name).await? else {
            debug!("BareMetalHost {}/{} not found, nothing to do", namespace, name);
            self.forget(HOST_KIND, namespace, name);
            return Ok(());
        };

        let profiles = self.client.list_profiles(namespace).await?;
        let changes = label_changes(&profiles, &host);
        if changes.is_empty() {
            debug!("BareMetalHost {}/{} labels up to date", namespace, name);
            return Ok(());
        }

        self.client.patch_host_labels(&host, &changes).await?;
        info!(
            "Updated {} classification label(s) on BareMetalHost {}/{}",
            changes.len(),
            namespace,
            name
        );
        Ok(())
    }
}

/// What `profile` wants for its label on `host`.
///
/// Profiles being deleted always lose their label. Otherwise only active
/// profiles decide, and only for hosts that take part in matching.
pub(crate) fn intent_for(profile: &HardwareClassification, host: &BareMetalHost) -> LabelIntent {
    if profile.is_terminating() {
        return LabelIntent::Remove;
    }
    if !is_active(profile) {
        return LabelIntent::Keep;
    }
    match evaluate_host(profile, host) {
        Some(matched) => LabelIntent::from_match(profile, matched),
        None => LabelIntent::Keep,
    }
}

fn label_changes(profiles: &[HardwareClassification], host: &BareMetalHost) -> LabelChanges {
    profiles
        .iter()
        .filter_map(|profile| {
            let key = profile.label_key();
            let change = intent_for(profile, host).change_for(host, &key)?;
            debug!(
                "BareMetalHost {}: label {} -> {:?} for profile {}",
                host.name_any(),
                key,
                change,
                profile.name_any()
            );
            Some((key, change))
        })
        .collect()
}
