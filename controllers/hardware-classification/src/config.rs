//! Controller configuration from environment variables.

use crate::error::ControllerError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONCURRENCY: u16 = 3;
const DEFAULT_DEBOUNCE_SECS: u64 = 5;
const DEFAULT_BACKOFF_MIN_SECS: u64 = 15;
const DEFAULT_BACKOFF_MAX_SECS: u64 = 600;

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch; all namespaces when `None`.
    pub namespace: Option<String>,
    /// Maximum reconciliations running at once, per controller.
    pub concurrency: u16,
    /// Quiet period after the last event before a key is reconciled.
    pub debounce: Duration,
    pub backoff_min_secs: u64,
    pub backoff_max_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            concurrency: DEFAULT_CONCURRENCY,
            debounce: Duration::from_secs(DEFAULT_DEBOUNCE_SECS),
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
        }
    }
}

impl ControllerConfig {
    /// Reads `WATCH_NAMESPACE`, `RECONCILE_CONCURRENCY`,
    /// `RECONCILE_DEBOUNCE_SECS`, `ERROR_BACKOFF_MIN_SECS` and
    /// `ERROR_BACKOFF_MAX_SECS`.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());
        let concurrency = parse(&lookup, "RECONCILE_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        let debounce_secs = parse(&lookup, "RECONCILE_DEBOUNCE_SECS", DEFAULT_DEBOUNCE_SECS)?;
        let backoff_min_secs = parse(&lookup, "ERROR_BACKOFF_MIN_SECS", DEFAULT_BACKOFF_MIN_SECS)?;
        let backoff_max_secs = parse(&lookup, "ERROR_BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS)?;

        if concurrency == 0 {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        if backoff_min_secs == 0 || backoff_min_secs > backoff_max_secs {
            return Err(ControllerError::InvalidConfig(format!(
                "ERROR_BACKOFF_MIN_SECS ({backoff_min_secs}) must be between 1 and ERROR_BACKOFF_MAX_SECS ({backoff_max_secs})"
            )));
        }

        Ok(Self {
            namespace,
            concurrency,
            debounce: Duration::from_secs(debounce_secs),
            backoff_min_secs,
            backoff_max_secs,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            ControllerError::InvalidConfig(format!("{key}={raw:?} is not valid: {e}"))
        }),
    }
}
