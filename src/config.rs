//! Configuration for SlotLog
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SlotLogError};

/// Default number of slots a single partition file may hold
pub const DEFAULT_PARTITION_CAPACITY: u64 = 500_000;

/// Configuration for a partitioned slot array
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding every partition file of the dataset
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {name}-0.bin
    ///     ├── {name}-500000.bin
    ///     └── ...
    pub data_dir: PathBuf,

    /// Dataset name, used as the partition file prefix
    pub name: String,

    // -------------------------------------------------------------------------
    // Partition Configuration
    // -------------------------------------------------------------------------
    /// Max number of slots per partition file
    pub partition_capacity: u64,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// fsync the active partition after every append
    pub sync_on_append: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./slotlog_data"),
            name: "log".to_string(),
            partition_capacity: DEFAULT_PARTITION_CAPACITY,
            sync_on_append: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration can back a dataset
    pub fn validate(&self) -> Result<()> {
        if self.partition_capacity == 0 {
            return Err(SlotLogError::Config(
                "partition capacity must be at least 1".to_string(),
            ));
        }

        if self.name.is_empty() {
            return Err(SlotLogError::Config("dataset name is empty".to_string()));
        }

        // The name becomes a file prefix; a separator would escape the directory
        if self.name.contains(|c: char| c == '/' || c == '\\') {
            return Err(SlotLogError::Config(format!(
                "dataset name {:?} contains a path separator",
                self.name
            )));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (holds all partition files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the dataset name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the number of slots per partition
    pub fn partition_capacity(mut self, capacity: u64) -> Self {
        self.config.partition_capacity = capacity;
        self
    }

    /// Enable or disable fsync after every append
    pub fn sync_on_append(mut self, enabled: bool) -> Self {
        self.config.sync_on_append = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
