//! Host label synchronization.
//!
//! Turns match results into the desired state of one profile's label on
//! each host and issues only the writes needed to get there. Hosts are
//! independent: a rejected write is recorded and the remaining hosts are
//! still processed. A conflict means the pass worked from a stale read and
//! aborts it; a host deleted mid-pass is skipped.

use crds::{BareMetalHost, ErrorType, HardwareClassification};
use kube::ResourceExt;
use metal3_client::{LabelChanges, Metal3ClientTrait, Metal3Error};
use tracing::{debug, info, warn};

/// What a profile wants for its label on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelIntent {
    Set(String),
    Remove,
    /// Leave whatever is there.
    Keep,
}

impl LabelIntent {
    /// Intent for a host that was evaluated against `profile`.
    pub fn from_match(profile: &HardwareClassification, matched: bool) -> Self {
        if matched && !profile.is_terminating() {
            Self::Set(profile.label_value())
        } else {
            Self::Remove
        }
    }

    /// The label edit needed on `host`, if any.
    pub fn change_for(&self, host: &BareMetalHost, key: &str) -> Option<Option<String>> {
        let current = host.labels().get(key);
        match self {
            Self::Set(value) if current != Some(value) => Some(Some(value.clone())),
            Self::Remove if current.is_some() => Some(None),
            _ => None,
        }
    }
}

/// A label write that failed.
#[derive(Debug)]
pub struct LabelFailure {
    pub host: String,
    pub removing: bool,
    pub error: Metal3Error,
}

/// Outcome of one synchronization pass.
#[derive(Debug, Default)]
pub struct LabelSyncReport {
    pub writes: usize,
    pub failures: Vec<LabelFailure>,
}

impl LabelSyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Status error type for the failures, `None` when there were none.
    pub fn error_type(&self) -> Option<ErrorType> {
        if self.failures.is_empty() {
            None
        } else if self.failures.iter().all(|f| f.removing) {
            Some(ErrorType::LabelDeleteFailure)
        } else {
            Some(ErrorType::LabelUpdateFailure)
        }
    }

    pub fn failure_message(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.host, f.error))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Brings `profile`'s label on each evaluated host in line with its match
/// result. `evaluations` pairs a host with whether it matched.
///
/// Returns the conflict error as soon as one host write conflicts.
pub async fn sync_labels(
    client: &dyn Metal3ClientTrait,
    profile: &HardwareClassification,
    evaluations: &[(&BareMetalHost, bool)],
) -> Result<LabelSyncReport, Metal3Error> {
    let key = profile.label_key();
    let mut report = LabelSyncReport::default();

    for (host, matched) in evaluations {
        let intent = LabelIntent::from_match(profile, *matched);
        let Some(change) = intent.change_for(host, &key) else {
            continue;
        };
        let removing = change.is_none();
        let changes = LabelChanges::from([(key.clone(), change)]);

        match client.patch_host_labels(host, &changes).await {
            Ok(()) => {
                info!(
                    profile = %profile.name_any(),
                    host = %host.name_any(),
                    label = %key,
                    removed = removing,
                    "updated host label"
                );
                report.writes += 1;
            }
            Err(error) if error.is_conflict() => {
                warn!(
                    profile = %profile.name_any(),
                    host = %host.name_any(),
                    %error,
                    "host changed since it was read, abandoning pass"
                );
                return Err(error);
            }
            Err(error) if error.is_not_found() => {
                debug!(
                    profile = %profile.name_any(),
                    host = %host.name_any(),
                    "host deleted during pass, skipping"
                );
            }
            Err(error) => {
                warn!(
                    profile = %profile.name_any(),
                    host = %host.name_any(),
                    label = %key,
                    %error,
                    "failed to update host label"
                );
                report.failures.push(LabelFailure {
                    host: host.name_any(),
                    removing,
                    error,
                });
            }
        }
    }

    Ok(report)
}
