//! Configuration for the geometry caches

use crate::cache::snapshot::SnapshotPolicy;
use crate::error::{GeometryCacheError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Number of node queries between two sweeps of detached nodes
pub const DEFAULT_SWEEP_INTERVAL: usize = 1000;

pub const ENV_SWEEP_INTERVAL: &str = "GEOMETRY_CACHE_SWEEP_INTERVAL";
pub const ENV_SNAPSHOT_POLICY: &str = "GEOMETRY_CACHE_SNAPSHOT_POLICY";
pub const ENV_START_ACTIVE: &str = "GEOMETRY_CACHE_START_ACTIVE";
pub const ENV_ENABLE_METRICS: &str = "GEOMETRY_CACHE_ENABLE_METRICS";

/// Configuration shared by the node and edge caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Node queries between two sweeps of detached nodes.
    /// Ignored by the edge cache, which is only ever cleared as a whole.
    pub sweep_interval: usize,

    /// What the node cache compares to decide an entry is stale
    pub snapshot_policy: SnapshotPolicy,

    /// Whether a freshly built cache memoizes before `activate` is called
    pub start_active: bool,

    /// Count hits, misses and recomputations
    pub enable_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::node_default()
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Node cache defaults: always on, full structural snapshots
    pub fn node_default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            snapshot_policy: SnapshotPolicy::Structural,
            start_active: true,
            enable_metrics: true,
        }
    }

    /// Starts inactive; meant to be switched on around one layout pass.
    /// This is what the edge cache uses unless told otherwise.
    pub fn layout_pass() -> Self {
        Self {
            start_active: false,
            ..Self::node_default()
        }
    }

    /// Only movement invalidates node geometry. Renames and other edits are
    /// not detected, so this only suits element kinds whose geometry depends
    /// on position alone.
    pub fn position_only() -> Self {
        Self {
            snapshot_policy: SnapshotPolicy::Position,
            ..Self::node_default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval == 0 {
            return Err(GeometryCacheError::InvalidConfig(
                "sweep_interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Node defaults overridden by `GEOMETRY_CACHE_*` environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::node_default();
        let config = Self {
            sweep_interval: env_override(ENV_SWEEP_INTERVAL, defaults.sweep_interval)?,
            snapshot_policy: env_override(ENV_SNAPSHOT_POLICY, defaults.snapshot_policy)?,
            start_active: env_override(ENV_START_ACTIVE, defaults.start_active)?,
            enable_metrics: env_override(ENV_ENABLE_METRICS, defaults.enable_metrics)?,
        };
        config.validate()?;

        debug!("Loaded cache config from environment: {:?}", config);
        Ok(config)
    }
}

fn env_override<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| GeometryCacheError::EnvVar {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    sweep_interval: Option<usize>,
    snapshot_policy: Option<SnapshotPolicy>,
    start_active: Option<bool>,
    enable_metrics: Option<bool>,
}

impl CacheConfigBuilder {
    /// Set the number of node queries between sweeps
    pub fn sweep_interval(mut self, calls: usize) -> Self {
        self.sweep_interval = Some(calls);
        self
    }

    /// Set the staleness detection policy
    pub fn snapshot_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.snapshot_policy = Some(policy);
        self
    }

    /// Set whether the cache starts active
    pub fn start_active(mut self, active: bool) -> Self {
        self.start_active = Some(active);
        self
    }

    /// Enable or disable metrics collection
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            sweep_interval: self.sweep_interval.unwrap_or(defaults.sweep_interval),
            snapshot_policy: self.snapshot_policy.unwrap_or(defaults.snapshot_policy),
            start_active: self.start_active.unwrap_or(defaults.start_active),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
        }
    }

    /// Build and validate in one step
    pub fn try_build(self) -> Result<CacheConfig> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
