//! Kubernetes-backed Metal3 client

use crate::error::Metal3Error;
use crate::metal3_trait::{LabelChanges, Metal3ClientTrait};
use crds::{BareMetalHost, HardwareClassification, HardwareClassificationStatus};
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::{Value, json};
use tracing::debug;

/// [`Metal3ClientTrait`] implementation talking to the API server.
#[derive(Clone)]
pub struct Metal3Client {
    client: Client,
}

impl std::fmt::Debug for Metal3Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metal3Client").finish_non_exhaustive()
    }
}

impl Metal3Client {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn profiles(&self, namespace: &str) -> Api<HardwareClassification> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn hosts(&self, namespace: &str) -> Api<BareMetalHost> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Namespace and name of a stored object.
fn locate<K>(object: &K) -> Result<(String, String), Metal3Error>
where
    K: Resource,
{
    let name = object.name_any();
    let namespace = object
        .namespace()
        .ok_or_else(|| Metal3Error::NotFound(format!("{name} has no namespace")))?;
    Ok((namespace, name))
}

/// Merge patch replacing `metadata.finalizers`.
pub fn finalizers_patch(resource_version: Option<&str>, finalizers: &[String]) -> Value {
    json!({
        "metadata": {
            "resourceVersion": resource_version,
            "finalizers": finalizers,
        }
    })
}

/// Merge patch replacing the status block. Cleared optional fields are sent
/// as `null` so stale values are removed.
pub fn status_patch(
    resource_version: Option<&str>,
    status: &HardwareClassificationStatus,
) -> Result<Value, Metal3Error> {
    Ok(json!({
        "metadata": {
            "resourceVersion": resource_version,
        },
        "status": serde_json::to_value(status)?,
    }))
}

/// Merge patch setting or removing individual labels; other labels are
/// left untouched.
pub fn labels_patch(resource_version: Option<&str>, changes: &LabelChanges) -> Value {
    json!({
        "metadata": {
            "resourceVersion": resource_version,
            "labels": changes,
        }
    })
}

#[async_trait::async_trait]
impl Metal3ClientTrait for Metal3Client {
    async fn get_profile(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<HardwareClassification>, Metal3Error> {
        Ok(self.profiles(namespace).get_opt(name).await?)
    }

    async fn list_profiles(
        &self,
        namespace: &str,
    ) -> Result<Vec<HardwareClassification>, Metal3Error> {
        let list = self.profiles(namespace).list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn set_profile_finalizers(
        &self,
        profile: &HardwareClassification,
        finalizers: Vec<String>,
    ) -> Result<(), Metal3Error> {
        let (namespace, name) = locate(profile)?;
        let patch = finalizers_patch(profile.resource_version().as_deref(), &finalizers);
        debug!(%namespace, %name, ?finalizers, "patching profile finalizers");
        self.profiles(&namespace)
            .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }

    async fn patch_profile_status(
        &self,
        profile: &HardwareClassification,
        status: &HardwareClassificationStatus,
    ) -> Result<(), Metal3Error> {
        let (namespace, name) = locate(profile)?;
        let patch = status_patch(profile.resource_version().as_deref(), status)?;
        debug!(%namespace, %name, "patching profile status");
        self.profiles(&namespace)
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }

    async fn get_host(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BareMetalHost>, Metal3Error> {
        Ok(self.hosts(namespace).get_opt(name).await?)
    }

    async fn list_hosts(&self, namespace: &str) -> Result<Vec<BareMetalHost>, Metal3Error> {
        let list = self.hosts(namespace).list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn patch_host_labels(
        &self,
        host: &BareMetalHost,
        changes: &LabelChanges,
    ) -> Result<(), Metal3Error> {
        if changes.is_empty() {
            return Ok(());
        }
        let (namespace, name) = locate(host)?;
        let patch = labels_patch(host.resource_version().as_deref(), changes);
        debug!(%namespace, %name, ?changes, "patching host labels");
        self.hosts(&namespace)
            .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{ErrorType, ProfileMatchStatus};

    #[test]
    fn test_labels_patch_sets_and_removes() {
        let changes = LabelChanges::from([
            ("hardwareclassification.metal3.io/gold".to_string(), Some("matches".to_string())),
            ("hardwareclassification.metal3.io/silver".to_string(), None),
        ]);
        let patch = labels_patch(Some("42"), &changes);

        assert_eq!(patch["metadata"]["resourceVersion"], "42");
        let labels = &patch["metadata"]["labels"];
        assert_eq!(labels["hardwareclassification.metal3.io/gold"], "matches");
        assert!(labels["hardwareclassification.metal3.io/silver"].is_null());
        assert!(labels.as_object().unwrap().contains_key("hardwareclassification.metal3.io/silver"));
    }

    #[test]
    fn test_finalizers_patch_replaces_list() {
        let patch = finalizers_patch(Some("7"), &[]);
        assert_eq!(patch["metadata"]["finalizers"], json!([]));
        assert_eq!(patch["metadata"]["resourceVersion"], "7");
    }

    #[test]
    fn test_status_patch_clears_error_type() {
        let status = HardwareClassificationStatus {
            profile_match_status: ProfileMatchStatus::Matched,
            matched_count: 3,
            ..Default::default()
        };
        let patch = status_patch(None, &status).unwrap();
        assert_eq!(patch["status"]["profileMatchStatus"], "matched");
        assert_eq!(patch["status"]["matchedCount"], 3);
        assert!(patch["status"].as_object().unwrap().contains_key("errorType"));
        assert!(patch["status"]["errorType"].is_null());

        let failed = HardwareClassificationStatus {
            error_type: Some(ErrorType::LabelUpdateFailure),
            ..Default::default()
        };
        let patch = status_patch(Some("3"), &failed).unwrap();
        assert_eq!(patch["status"]["errorType"], "label update error");
    }
}
