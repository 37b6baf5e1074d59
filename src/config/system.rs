//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::axis::AxisConfig;

/// Maximum number of axes in one configuration.
pub const MAX_AXES: usize = 8;

/// Root configuration structure from TOML.
///
/// Each axis is driven by its own independent stepper; nothing here
/// coordinates axes with each other.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Named axis configurations.
    #[serde(default)]
    pub axes: FnvIndexMap<String<32>, AxisConfig, MAX_AXES>,
}

impl SystemConfig {
    /// Get an axis configuration by name.
    pub fn axis(&self, name: &str) -> Option<&AxisConfig> {
        self.axes
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// List all axis names.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(|s| s.as_str())
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            axes: FnvIndexMap::new(),
        }
    }
}
