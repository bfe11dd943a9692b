//! # SlotLog
//!
//! A persistent, append-friendly array of byte records with:
//! - Fixed-size 523-byte slots addressed by index
//! - Per-record CRC32 checksums for corruption detection
//! - Transparent partitioning of the logical array across bounded files
//! - Cheap suffix truncation (trailing partitions are simply deleted)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PartitionManager                          │
//! │        (logical index space: append / get / truncate)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  idx - start
//!          ┌────────────┼────────────┬─────────────┐
//!          ▼            ▼            ▼             ▼
//!   ┌────────────┐ ┌────────────┐ ┌────────────┐
//!   │ SlotStore  │ │ SlotStore  │ │ SlotStore  │   ...
//!   │ log-0.bin  │ │ log-N.bin  │ │ log-2N.bin │
//!   └────────────┘ └────────────┘ └────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SlotLogError, Result};
pub use config::Config;
pub use storage::{PartitionManager, SlotStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SlotLog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
