//! Slot Store
//!
//! A single file of fixed-size slots addressed by local index.
//!
//! ## Responsibilities
//! - Create or reopen the backing file, never truncating on open
//! - Positional slot reads with checksum verification
//! - Positional slot writes that may arrive out of order
//! - Shrinking the file to a slot boundary

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::{Result, SlotLogError};

use super::io::{read_exact_at, write_all_at};
use super::slot::{self, SlotHeader};
use super::{HEADER_SIZE, SLOT_SIZE};

/// One on-disk file of 523-byte slots
///
/// ## Concurrency:
/// - `file`: RwLock. Reads and writes are positional, so `get`/`set`/`sync`
///   share the read lock; `open`/`close`/`truncate` take the write lock
/// - `size`: cached file size in bytes, grown with `fetch_max` so concurrent
///   writers to disjoint indices never shrink it regardless of finish order
/// - All methods use `&self`
pub struct SlotStore {
    /// Backing file path
    path: PathBuf,

    /// Open handle, `None` while closed
    file: RwLock<Option<File>>,

    /// Cached file size in bytes, refreshed on open and truncate
    size: AtomicU64,
}

impl SlotStore {
    /// Create a closed store bound to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: RwLock::new(None),
            size: AtomicU64::new(0),
        }
    }

    /// Open the backing file, creating it if missing.
    ///
    /// Calling `open` on an open store does nothing.
    pub fn open(&self) -> Result<()> {
        let mut file = self.file.write();
        if file.is_some() {
            return Ok(());
        }

        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        let size = handle.metadata()?.len();

        let torn = size % SLOT_SIZE as u64;
        if torn != 0 {
            tracing::warn!(
                "Slot store {} ends with {} bytes of a partial slot; ignoring them",
                self.path.display(),
                torn
            );
        }

        self.size.store(size, Ordering::SeqCst);
        *file = Some(handle);

        tracing::debug!(
            "Opened slot store {} ({} slots)",
            self.path.display(),
            size / SLOT_SIZE as u64
        );
        Ok(())
    }

    /// Flush to stable storage and release the file handle
    pub fn close(&self) -> Result<()> {
        let mut file = self.file.write();
        let handle = file.take().ok_or_else(|| self.not_open())?;
        handle.sync_all()?;

        tracing::debug!("Closed slot store {}", self.path.display());
        Ok(())
    }

    /// Whether the store currently holds an open handle
    pub fn is_open(&self) -> bool {
        self.file.read().is_some()
    }

    /// Number of slots, derived from the cached file size
    pub fn length(&self) -> Result<u64> {
        let file = self.file.read();
        if file.is_none() {
            return Err(self.not_open());
        }
        Ok(self.slot_count())
    }

    /// Read and verify the payload stored at `index`
    pub fn get(&self, index: u64) -> Result<Vec<u8>> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or_else(|| self.not_open())?;

        let length = self.slot_count();
        if index >= length {
            return Err(SlotLogError::IndexOutOfBounds { index, length });
        }
        let offset = slot::slot_offset(index)
            .ok_or(SlotLogError::IndexOutOfBounds { index, length })?;

        let mut raw = [0u8; HEADER_SIZE];
        read_exact_at(file, &mut raw, offset)?;
        let header = SlotHeader::parse(index, &raw)?;

        let mut payload = vec![0u8; header.length];
        read_exact_at(file, &mut payload, offset + HEADER_SIZE as u64)?;

        if let Err(e) = header.verify(index, &payload) {
            tracing::warn!("{} in {}", e, self.path.display());
            return Err(e);
        }

        tracing::trace!("Read slot {} ({} bytes)", index, header.length);
        Ok(payload)
    }

    /// Write `payload` into slot `index`.
    ///
    /// Writing past the current end extends the store; the gap (if any) is
    /// left as zeroed slots that read back as corrupted.
    pub fn set(&self, index: u64, payload: &[u8]) -> Result<()> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or_else(|| self.not_open())?;

        let image = slot::encode(payload)?;
        let span = slot::slot_offset(index)
            .and_then(|offset| offset.checked_add(SLOT_SIZE as u64).map(|end| (offset, end)));
        let (offset, end) = span.ok_or(SlotLogError::IndexOutOfBounds {
            index,
            length: self.slot_count(),
        })?;

        write_all_at(file, &image, offset)?;

        // Grow, never shrink
        self.size.fetch_max(end, Ordering::SeqCst);

        tracing::trace!("Wrote slot {} ({} bytes)", index, payload.len());
        Ok(())
    }

    /// Shrink the store so that it holds exactly `index` slots.
    ///
    /// Never grows the file: does nothing when `index` is beyond the current
    /// length. At `index == length` only a partial trailing slot is cut off.
    pub fn truncate(&self, index: u64) -> Result<()> {
        let guard = self.file.write();
        let file = guard.as_ref().ok_or_else(|| self.not_open())?;

        let length = self.slot_count();
        if index > length {
            return Ok(());
        }

        // index <= length, so the product fits
        let new_size = index * SLOT_SIZE as u64;
        if self.size.load(Ordering::SeqCst) == new_size {
            return Ok(());
        }
        file.set_len(new_size)?;
        self.size.store(new_size, Ordering::SeqCst);

        tracing::debug!(
            "Truncated slot store {} from {} to {} slots",
            self.path.display(),
            length,
            index
        );
        Ok(())
    }

    /// Flush written slots to stable storage without closing
    pub fn sync(&self) -> Result<()> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or_else(|| self.not_open())?;
        file.sync_data()?;
        Ok(())
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn slot_count(&self) -> u64 {
        self.size.load(Ordering::SeqCst) / SLOT_SIZE as u64
    }

    fn not_open(&self) -> SlotLogError {
        SlotLogError::NotOpen {
            path: self.path.clone(),
        }
    }
}

impl std::fmt::Debug for SlotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotStore")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("size", &self.size.load(Ordering::SeqCst))
            .finish()
    }
}
