//! # Configuration Management
//!
//! Configuration for the flattening layout and the storage backend.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub layout: LayoutConfig,
    pub store: StoreConfig,
}

/// Path layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Omit the identifier/index segment for collections with exactly one
    /// element. Matches the historical archive layout, at the cost of path
    /// instability when a collection later grows past one element. Turn off
    /// to always emit a segment per element.
    pub collapse_singletons: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            collapse_singletons: true,
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Call fsync after each container save.
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { sync_writes: false }
    }
}
