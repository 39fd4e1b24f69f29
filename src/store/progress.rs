//! Onboarding progress persistence, scoped by deployment, user and platform.
//!
//! Three slots live under each identity:
//! - `…:<platform>:progress`: the [`ProgressRecord`]
//! - `…:<platform>:session` : the [`SessionSlot`] resume index
//! - `…:platform`           : the last selected platform
//!
//! Every failure is absorbed here. Reads of missing or malformed data yield
//! the default value; failed writes are logged and dropped so the caller's
//! in-memory state stays authoritative.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::identity::Identity;
use crate::platform::PlatformId;
use crate::store::traits::KeyValueStore;

const KEY_PREFIX: &str = "tak-onboarding";
const KEY_VERSION: &str = "v1";

/// Durable per-platform onboarding progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Ids of completed steps. A set, so reordering the catalog keeps it valid.
    #[serde(default)]
    pub completed_step_ids: BTreeSet<String>,
    #[serde(default)]
    pub finished: bool,
    /// Step shown when the record was last written.
    #[serde(default)]
    pub last_viewed_step_index: usize,
}

impl ProgressRecord {
    pub fn is_completed(&self, step_id: &str) -> bool {
        self.completed_step_ids.contains(step_id)
    }

    /// Mark a step completed. Returns `false` if it already was.
    pub fn mark_completed(&mut self, step_id: &str) -> bool {
        self.completed_step_ids.insert(step_id.to_string())
    }
}

/// Lightweight resume pointer written on every step change.
///
/// Signed so that garbage written by older clients parses and is then
/// rejected by range checks instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSlot {
    pub step_index: i64,
}

impl SessionSlot {
    pub fn at(step_index: usize) -> Self {
        Self {
            step_index: i64::try_from(step_index).unwrap_or(i64::MAX),
        }
    }

    /// The index if it addresses one of `len` steps.
    pub fn index_within(&self, len: usize) -> Option<usize> {
        usize::try_from(self.step_index).ok().filter(|i| *i < len)
    }
}

/// Escape a key component so `:` always acts as a separator.
fn escape_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}

/// Identity half of a storage key: `tak-onboarding:v1:<deployment>:<user>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// `None` until both deployment and user ids are known.
    pub fn from_identity(identity: Option<&Identity>) -> Option<Self> {
        let identity = identity.filter(|id| id.is_complete())?;
        Some(Self(format!(
            "{KEY_PREFIX}:{KEY_VERSION}:{}:{}",
            escape_component(&identity.deployment_id),
            escape_component(&identity.user_id)
        )))
    }

    /// Key of the platform-preference slot.
    pub fn platform_preference(&self) -> String {
        format!("{}:platform", self.0)
    }

    /// Narrow to one platform.
    pub fn scope(&self, platform: PlatformId) -> ScopeKey {
        ScopeKey {
            base: format!("{}:{}", self.0, platform.as_str()),
        }
    }
}

/// Fully scoped key prefix for one (deployment, user, platform) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    base: String,
}

impl ScopeKey {
    pub fn new(identity: Option<&Identity>, platform: PlatformId) -> Option<Self> {
        IdentityKey::from_identity(identity).map(|k| k.scope(platform))
    }

    pub fn progress_key(&self) -> String {
        format!("{}:progress", self.base)
    }

    pub fn session_key(&self) -> String {
        format!("{}:session", self.base)
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

/// Typed, failure-absorbing view over a [`KeyValueStore`].
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the progress record. Missing or unreadable data is an empty record.
    pub async fn load(&self, scope: &ScopeKey) -> ProgressRecord {
        self.read_json::<ProgressRecord>(&scope.progress_key())
            .await
            .unwrap_or_default()
    }

    /// Overwrite the progress record.
    pub async fn save(&self, scope: &ScopeKey, record: &ProgressRecord) {
        self.write_json(&scope.progress_key(), record).await;
    }

    /// Load the session-resume slot, if one was written and is readable.
    pub async fn load_session(&self, scope: &ScopeKey) -> Option<SessionSlot> {
        self.read_json::<SessionSlot>(&scope.session_key()).await
    }

    pub async fn save_session(&self, scope: &ScopeKey, slot: SessionSlot) {
        self.write_json(&scope.session_key(), &slot).await;
    }

    /// Last platform the user picked.
    pub async fn load_platform(&self, identity: &IdentityKey) -> Option<PlatformId> {
        let key = identity.platform_preference();
        let raw = self.read_raw(&key).await?;
        match raw.parse::<PlatformId>() {
            Ok(platform) => Some(platform),
            Err(reason) => {
                warn!(key = %key, %reason, "Ignoring unreadable platform preference");
                None
            }
        }
    }

    pub async fn save_platform(&self, identity: &IdentityKey, platform: PlatformId) {
        let key = identity.platform_preference();
        if let Err(e) = self.kv.set(&key, platform.as_str()).await {
            warn!(key = %key, error = %e, "Failed to persist platform preference");
        }
    }

    async fn read_raw(&self, key: &str) -> Option<String> {
        match self.kv.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Storage read failed, treating as empty");
                None
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key).await?;
        match decode::<T>(key, &raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Discarding malformed stored value");
                None
            }
        }
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        let encoded = match encode(value) {
            Ok(s) => s,
            Err(e) => {
                warn!(key = %key, error = %e, "Progress value not written");
                return;
            }
        };
        match self.kv.set(key, &encoded).await {
            Ok(()) => debug!(key = %key, "Progress value persisted"),
            Err(e) => warn!(key = %key, error = %e, "Failed to persist progress value"),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Malformed {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
