//! Kubernetes resource watchers.
//!
//! Two `kube_runtime::Controller`s share one [`Reconciler`]:
//! - profiles, re-triggered by any host event in the profile's namespace
//! - hosts, re-triggered by any profile event in the host's namespace
//!
//! The reflector stores are only used to decide which keys to enqueue.
//! Reconcilers always re-read the object store.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::{HOST_KIND, PROFILE_KIND, Reconciler, backoff_key};
use crds::{BareMetalHost, HardwareClassification};
use futures::StreamExt;
use kube::{Api, Resource, ResourceExt};
use kube_runtime::controller::{Action, Config as RuntimeConfig};
use kube_runtime::reflector::{ObjectRef, Store};
use kube_runtime::{watcher, Controller};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Every object in `store` that lives in `namespace`.
fn refs_in_namespace<K>(store: &Store<K>, namespace: Option<String>) -> Vec<ObjectRef<K>>
where
    K: Resource<DynamicType = ()> + Clone + 'static,
{
    store
        .state()
        .into_iter()
        .filter(|obj| obj.namespace() == namespace)
        .map(|obj| ObjectRef::from_obj(&*obj))
        .collect()
}

/// Drives `controller` until its stream ends.
///
/// `reconcile_fn` runs one pass for a namespace/name pair. A clean pass
/// resets the object's backoff and waits for the next change; a failed
/// one is requeued with Fibonacci backoff.
async fn run_controller<K, F, Fut>(
    controller: Controller<K>,
    reconciler: Arc<Reconciler>,
    config: &ControllerConfig,
    kind: &'static str,
    reconcile_fn: F,
) where
    K: Resource<DynamicType = ()> + Clone + Debug + serde::de::DeserializeOwned + Send + Sync + 'static,
    F: Fn(Arc<Reconciler>, String, String) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Result<(), ControllerError>> + Send + 'static,
{
    info!("Starting {} watcher", kind);

    let error_policy = move |obj: Arc<K>, error: &ControllerError, ctx: Arc<Reconciler>| {
        let key = backoff_key(kind, &obj.namespace().unwrap_or_default(), &obj.name_any());
        let delay = ctx.next_backoff(&key);
        error!("Reconciliation failed for {}: {} (retrying in {:?})", key, error, delay);
        Action::requeue(delay)
    };

    let reconcile = move |obj: Arc<K>, ctx: Arc<Reconciler>| {
        let reconcile_fn = reconcile_fn.clone();
        let namespace = obj.namespace().unwrap_or_default();
        let name = obj.name_any();
        let key = backoff_key(kind, &namespace, &name);
        async move {
            debug!("Reconciling {}", key);
            reconcile_fn(ctx.clone(), namespace, name).await?;
            ctx.reset_backoff(&key);
            Ok::<_, ControllerError>(Action::await_change())
        }
    };

    let runtime_config = RuntimeConfig::default()
        .debounce(config.debounce)
        .concurrency(config.concurrency);

    controller
        .with_config(runtime_config)
        .run(reconcile, error_policy, reconciler)
        .for_each(|res| async move {
            if let Err(e) = res {
                error!("Controller error for {}: {}", kind, e);
            }
        })
        .await;
}

/// Watches HardwareClassification and BareMetalHost resources.
#[derive(Clone)]
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    profile_api: Api<HardwareClassification>,
    host_api: Api<BareMetalHost>,
    config: ControllerConfig,
}

impl Watcher {
    pub fn new(
        reconciler: Arc<Reconciler>,
        profile_api: Api<HardwareClassification>,
        host_api: Api<BareMetalHost>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            reconciler,
            profile_api,
            host_api,
            config,
        }
    }

    /// Reconciles profiles; host changes re-trigger every profile in the
    /// host's namespace.
    pub async fn watch_profiles(&self) -> Result<(), ControllerError> {
        let controller = Controller::new(self.profile_api.clone(), watcher::Config::default());
        let profiles = controller.store();
        let controller = controller.watches(
            self.host_api.clone(),
            watcher::Config::default(),
            move |host: BareMetalHost| refs_in_namespace(&profiles, host.namespace()),
        );

        run_controller(
            controller,
            self.reconciler.clone(),
            &self.config,
            PROFILE_KIND,
            |ctx: Arc<Reconciler>, namespace: String, name: String| async move {
                ctx.reconcile_profile(&namespace, &name).await
            },
        )
        .await;

        Err(ControllerError::Watch(
            "HardwareClassification controller stream ended".to_string(),
        ))
    }

    /// Reconciles host labels; profile changes re-trigger every host in
    /// the profile's namespace.
    pub async fn watch_hosts(&self) -> Result<(), ControllerError> {
        let controller = Controller::new(self.host_api.clone(), watcher::Config::default());
        let hosts = controller.store();
        let controller = controller.watches(
            self.profile_api.clone(),
            watcher::Config::default(),
            move |profile: HardwareClassification| refs_in_namespace(&hosts, profile.namespace()),
        );

        run_controller(
            controller,
            self.reconciler.clone(),
            &self.config,
            HOST_KIND,
            |ctx: Arc<Reconciler>, namespace: String, name: String| async move {
                ctx.reconcile_host(&namespace, &name).await
            },
        )
        .await;

        Err(ControllerError::Watch("BareMetalHost controller stream ended".to_string()))
    }
}
