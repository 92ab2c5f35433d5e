//! Store configuration

use std::time::Duration;

/// Configuration for the view-state store.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::store::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_key_prefix("grids:")
///     .with_retention(Duration::from_secs(30 * 24 * 3600));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Prefix for every backend key; the table id follows it.
    ///
    /// Default: `table-settings:`
    pub key_prefix: String,

    /// How long a record lives after its last write. `None` keeps it forever.
    ///
    /// Default: 7 days
    pub retention: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: "table-settings:".to_string(),
            retention: Some(Duration::from_secs(7 * 24 * 3600)), // 7 days
        }
    }
}

impl StoreConfig {
    /// Sets the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Sets the retention period.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }
}
