//! Error types for SlotLog
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using SlotLogError
pub type Result<T> = std::result::Result<T, SlotLogError>;

/// Unified error type for SlotLog operations
#[derive(Debug, Error)]
pub enum SlotLogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Short read/write or a platform error from the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Not open: {}", .path.display())]
    NotOpen { path: PathBuf },

    // -------------------------------------------------------------------------
    // Access Errors
    // -------------------------------------------------------------------------
    #[error("Index {index} out of bounds (length {length})")]
    IndexOutOfBounds { index: u64, length: u64 },

    #[error("Payload of {size} bytes exceeds slot capacity of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    // -------------------------------------------------------------------------
    // Integrity Errors
    // -------------------------------------------------------------------------
    #[error("Slot {index} corrupted: {reason}")]
    Corrupted { index: u64, reason: String },

    #[error("Malformed partition file name: {}", .0.display())]
    MalformedPartitionFile(PathBuf),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
