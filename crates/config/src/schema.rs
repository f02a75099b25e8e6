//! Config schema: ledger defaults, storage, roster resolution, auth and the
//! static member directory.

use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootsplitConfig {
    pub ledger: LedgerConfig,
    pub storage: StorageConfig,
    pub roster: RosterConfig,
    pub auth: AuthConfig,
    /// Display names keyed by user id, used by drivers without a live
    /// member directory.
    pub members: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Tax applied when `start` is called without one.
    pub default_tax_percent: u8,
    /// Digit group separator for rendered amounts.
    pub thousands_separator: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_tax_percent: 0,
            thousands_separator: ".".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Session snapshot file. Relative paths resolve against the data dir.
    pub sessions_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sessions_path: PathBuf::from("sessions.json"),
        }
    }
}

impl StorageConfig {
    /// Absolute snapshot path, resolving relative paths against `data_dir`.
    pub fn resolve_sessions_path(&self, data_dir: &std::path::Path) -> PathBuf {
        if self.sessions_path.is_absolute() {
            self.sessions_path.clone()
        } else {
            data_dir.join(&self.sessions_path)
        }
    }
}

/// What `start` does with mentions that cannot be resolved to members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterPolicy {
    /// Start with whoever resolved and report the rest.
    #[default]
    SkipUnresolved,
    /// Refuse to start unless every mention resolved.
    RejectUnresolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub policy: RosterPolicy,
    /// Per-mention lookup timeout; 0 disables it.
    pub resolve_timeout_secs: u64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            policy: RosterPolicy::default(),
            resolve_timeout_secs: 10,
        }
    }
}

impl RosterConfig {
    pub fn resolve_timeout(&self) -> Option<Duration> {
        (self.resolve_timeout_secs > 0).then(|| Duration::from_secs(self.resolve_timeout_secs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// User ids allowed to start, finalize and cancel. Empty allows everyone.
    pub admins: Vec<String>,
}

impl AuthConfig {
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.is_empty() || self.admins.iter().any(|a| a == user_id)
    }
}
