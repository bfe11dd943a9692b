//! Storage Module
//!
//! Fixed-size slot files and the partition layer on top of them.
//!
//! ## Responsibilities
//! - Encode records into checksummed fixed-size slots
//! - Positional read/write/truncate of a single slot file
//! - Split one logical index space across bounded partition files
//!
//! ## Slot Format (523 bytes)
//! ```text
//! ┌──────────────┬────────────┬──────────────────────────────────┐
//! │ Checksum (8) │ Length (3) │ Data (512)                       │
//! │ ASCII hex    │ ASCII dec  │ payload ++ zero padding          │
//! │ abs(CRC32)   │ "000"-"512"│                                  │
//! └──────────────┴────────────┴──────────────────────────────────┘
//! slot i starts at byte i × 523
//! ```
//!
//! ## Partition Layout
//! ```text
//! {data_dir}/
//!   ├── {name}-0.bin         logical [0, N)
//!   ├── {name}-N.bin         logical [N, 2N)
//!   └── {name}-2N.bin        logical [2N, ...)
//! ```

mod io;
mod manager;
pub mod slot;
mod store;

pub use manager::{PartitionInfo, PartitionManager};
pub use store::SlotStore;

// =============================================================================
// Shared Constants (used by codec, store, manager)
// =============================================================================

/// Width of the ASCII hex checksum field
pub const CHECKSUM_SIZE: usize = 8;

/// Width of the ASCII decimal length field
pub const LENGTH_SIZE: usize = 3;

/// Data region per slot: payload plus zero padding
pub const DATA_SIZE: usize = 512;

/// Header size: Checksum (8) + Length (3) = 11 bytes
pub const HEADER_SIZE: usize = CHECKSUM_SIZE + LENGTH_SIZE;

/// Bytes occupied by every slot regardless of payload size
pub const SLOT_SIZE: usize = HEADER_SIZE + DATA_SIZE;

/// Largest payload a slot can hold
pub const MAX_PAYLOAD: usize = DATA_SIZE;
