use serde::{Deserialize, Serialize};

/// When a slot's dirty baseline is re-captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// Re-snapshot after every completed write, so a saved record reads clean.
    #[default]
    RefreshAfterWrite,
    /// Only hydration from storage re-snapshots; changes stay dirty until the
    /// record is loaded again.
    KeepUntilReload,
}

/// Synchronizer configuration.
///
/// # Examples
///
/// ```
/// use valueobjects::{BaselinePolicy, SyncConfig};
///
/// let config = SyncConfig::new()
///     .baseline_policy(BaselinePolicy::KeepUntilReload)
///     .capture_old_values(false);
/// assert_eq!(config.baseline_policy, BaselinePolicy::KeepUntilReload);
///
/// let loaded: SyncConfig = serde_json::from_str(r#"{"baseline_policy":"keep_until_reload"}"#).unwrap();
/// assert!(loaded.capture_old_values);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub baseline_policy: BaselinePolicy,

    /// Register slot data as the record's old column values on load.
    pub capture_old_values: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            baseline_policy: BaselinePolicy::default(),
            capture_old_values: true,
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn baseline_policy(mut self, policy: BaselinePolicy) -> Self {
        self.baseline_policy = policy;
        self
    }

    pub fn capture_old_values(mut self, enabled: bool) -> Self {
        self.capture_old_values = enabled;
        self
    }
}
