//! Bridge configuration loaded from TOML, with environment overrides.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use dlink_fabric::FixedDelay;
use dlink_lanes::LaneConfig;
use dlink_types::{CurveKind, Identity};

use crate::error::{SdkError, SdkResult};

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    /// Identity that owns the delegated-access relationship.
    #[serde(default)]
    pub owner: IdentityConfig,

    /// Identity that receives launch commands and signs state datalogs.
    #[serde(default)]
    pub admin: IdentityConfig,

    #[serde(default)]
    pub lanes: LaneSettings,

    #[serde(default)]
    pub subscription: SubscriptionSettings,

    #[serde(default)]
    pub worker: WorkerSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Seed material and curve flag for one signing identity.
#[derive(Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Secret seed: `0x`-prefixed hex or a passphrase.
    #[serde(default)]
    pub seed: String,

    /// Use the ed25519 curve instead of the default sr25519.
    #[serde(default)]
    pub ed25519: bool,
}

impl IdentityConfig {
    pub fn curve(&self) -> CurveKind {
        CurveKind::from_ed_flag(self.ed25519)
    }

    pub fn to_identity(&self) -> SdkResult<Identity> {
        Ok(Identity::new(self.seed.clone(), self.curve())?)
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("seed", &"<redacted>")
            .field("ed25519", &self.ed25519)
            .finish()
    }
}

/// Lane timing, in whole seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct LaneSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,

    #[serde(default = "default_cooldown")]
    pub credential_cooldown_secs: u64,
}

impl LaneSettings {
    pub fn to_lane_config(&self) -> LaneConfig {
        LaneConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            settle_delay: Duration::from_secs(self.settle_delay_secs),
            cooldown: Duration::from_secs(self.credential_cooldown_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionSettings {
    /// Delay before re-opening a failed or closed subscription.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl SubscriptionSettings {
    pub fn retry_strategy(&self) -> FixedDelay {
        FixedDelay(Duration::from_secs(self.retry_delay_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// Upper bound on concurrent blocking ledger calls.
    #[serde(default = "default_max_blocking")]
    pub max_blocking: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `dlink_lanes=debug,info`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_settle_delay() -> u64 {
    10
}

fn default_cooldown() -> u64 {
    300
}

fn default_retry_delay() -> u64 {
    FixedDelay::DEFAULT.as_secs()
}

fn default_max_blocking() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LaneSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            settle_delay_secs: default_settle_delay(),
            credential_cooldown_secs: default_cooldown(),
        }
    }
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            retry_delay_secs: default_retry_delay(),
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            max_blocking: default_max_blocking(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file, then apply environment
    /// overrides:
    ///
    /// - `DLINK_OWNER_SEED` / `DLINK_ADMIN_SEED` override the seeds
    /// - `DLINK_LOG_LEVEL` overrides `logging.level`
    /// - `DLINK_LOG_JSON` overrides `logging.json` ("true" or "1")
    ///
    /// The result is not validated; call [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_toml_str(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Apply the `DLINK_*` overrides, reading variables through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(seed) = lookup("DLINK_OWNER_SEED") {
            self.owner.seed = seed;
        }
        if let Some(seed) = lookup("DLINK_ADMIN_SEED") {
            self.admin.seed = seed;
        }
        if let Some(level) = lookup("DLINK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("DLINK_LOG_JSON") {
            self.logging.json = json == "true" || json == "1";
        }
    }

    /// Reject configurations the bridge cannot run with.
    pub fn validate(&self) -> SdkResult<()> {
        for (name, identity) in [("owner", &self.owner), ("admin", &self.admin)] {
            if identity.seed.trim().is_empty() {
                return Err(SdkError::Config(format!("{name}.seed is empty")));
            }
        }
        if self.lanes.poll_interval_secs == 0 {
            return Err(SdkError::Config("lanes.poll_interval_secs must be > 0".into()));
        }
        if self.subscription.retry_delay_secs == 0 {
            return Err(SdkError::Config(
                "subscription.retry_delay_secs must be > 0".into(),
            ));
        }
        if self.worker.max_blocking == 0 {
            return Err(SdkError::Config("worker.max_blocking must be > 0".into()));
        }
        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            SdkError::Config(format!("logging.level {:?}: {e}", self.logging.level))
        })?;
        Ok(())
    }

    /// Owner and admin identities, in that order.
    pub fn identities(&self) -> SdkResult<(Identity, Identity)> {
        Ok((self.owner.to_identity()?, self.admin.to_identity()?))
    }
}
