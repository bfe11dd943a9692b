//! Partition Manager
//!
//! Presents a sequence of slot store files as one logical array.
//!
//! ## Responsibilities
//! - Discover existing partitions on open from file names alone
//! - Route reads to the partition covering a logical index
//! - Create a new partition when the active one fills up
//! - Delete whole trailing partitions on truncation

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, SlotLogError};

use super::{SlotStore, MAX_PAYLOAD};

/// A slot store responsible for `[start, start + len)` of the logical array
#[derive(Debug)]
struct Partition {
    /// Logical index of the partition's first slot
    start: u64,
    store: SlotStore,
}

/// Snapshot of one partition, for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    /// Logical index of the first slot
    pub start: u64,
    /// Number of slots currently stored
    pub slots: u64,
    /// Backing file
    pub path: PathBuf,
}

/// Manages the partitions of one dataset
///
/// ## Invariants:
/// - `partitions` is sorted by `start` and covers `[0, next_index)` without
///   gaps or overlaps
/// - A partition never holds more than `partition_capacity` slots
/// - Partition stores stay closed until first touched
pub struct PartitionManager {
    config: Config,

    /// Ordered by start index, ascending
    partitions: Vec<Partition>,

    /// Logical index the next append writes to
    next_index: u64,

    is_open: bool,
}

impl PartitionManager {
    /// Create a closed manager for the dataset described by `config`
    pub fn new(config: Config) -> Self {
        Self {
            config,
            partitions: Vec::new(),
            next_index: 0,
            is_open: false,
        }
    }

    /// Open the dataset, discovering partitions from the directory listing
    ///
    /// On open:
    /// 1. Create directory if it doesn't exist
    /// 2. Parse `<name>-<start>.bin` from every file; anything else is an error
    /// 3. Order partitions by start index (stores left closed)
    /// 4. Derive the logical length from the last partition
    pub fn open(&mut self) -> Result<()> {
        if self.is_open {
            return Ok(());
        }
        self.config.validate()?;

        let dir = &self.config.data_dir;
        fs::create_dir_all(dir)?;

        let mut partitions = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_path = entry.path();

            if !file_path.is_file() {
                continue;
            }

            let (name, start) = Self::parse_partition_file_name(&file_path)
                .ok_or_else(|| SlotLogError::MalformedPartitionFile(file_path.clone()))?;

            // Another dataset sharing the directory
            if name != self.config.name {
                tracing::trace!("Skipping foreign partition file {}", file_path.display());
                continue;
            }

            partitions.push(Partition {
                start,
                store: SlotStore::new(file_path),
            });
        }

        partitions.sort_by_key(|p| p.start);

        // Two spellings of the same start, e.g. "log-7.bin" and "log-07.bin"
        if let Some(pair) = partitions.windows(2).find(|w| w[0].start == w[1].start) {
            return Err(SlotLogError::MalformedPartitionFile(
                pair[1].store.path().to_path_buf(),
            ));
        }

        self.install(partitions)?;

        tracing::debug!(
            "Opened dataset {:?} in {}: {} partitions, {} records",
            self.config.name,
            self.config.data_dir.display(),
            self.partitions.len(),
            self.next_index
        );
        Ok(())
    }

    /// Close every open partition and return to the closed state
    ///
    /// Every partition is attempted even if one fails; the first error is
    /// returned and the manager stays open.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;

        let mut first_error = None;
        for partition in &self.partitions {
            if !partition.store.is_open() {
                continue;
            }
            if let Err(e) = partition.store.close() {
                tracing::warn!(
                    "Failed to close partition {}: {}",
                    partition.store.path().display(),
                    e
                );
                first_error.get_or_insert(e);
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        self.is_open = false;
        tracing::debug!("Closed dataset {:?}", self.config.name);
        Ok(())
    }

    /// Whether `open` has been called without a matching `close`
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Logical length: start of the last partition plus its slot count
    pub fn length(&self) -> Result<u64> {
        self.ensure_open()?;
        Self::tail_length(&self.partitions)
    }

    /// Append a record at the end of the array, returning its logical index
    pub fn append(&mut self, payload: &[u8]) -> Result<u64> {
        self.ensure_open()?;

        // Reject before a partition file could be created for it
        if payload.len() > MAX_PAYLOAD {
            return Err(SlotLogError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD,
            });
        }

        let index = self.next_index;
        let capacity = self.config.partition_capacity;
        let sync_on_append = self.config.sync_on_append;

        let partition = self.active_partition();
        let local = index - partition.start;

        partition.store.open()?;
        partition.store.set(local, payload)?;
        if sync_on_append {
            partition.store.sync()?;
        }

        // Partition is full: the next append starts a new one
        if local == capacity - 1 {
            self.register_partition(index + 1);
        }

        self.next_index = index + 1;
        Ok(index)
    }

    /// Read the record at logical `index`
    pub fn get(&self, index: u64) -> Result<Vec<u8>> {
        self.ensure_open()?;

        let out_of_bounds = SlotLogError::IndexOutOfBounds {
            index,
            length: self.next_index,
        };
        if index >= self.next_index {
            return Err(out_of_bounds);
        }

        let partition = self
            .covering_partition(index)
            .map(|pos| &self.partitions[pos])
            .ok_or(out_of_bounds)?;

        partition.store.open()?;
        partition.store.get(index - partition.start)
    }

    /// Drop every record at logical index `index` and beyond.
    ///
    /// The covering partition is shrunk in place; every later partition is
    /// closed and its file deleted. Does nothing when `index` is at or past
    /// the end.
    pub fn truncate(&mut self, index: u64) -> Result<()> {
        self.ensure_open()?;

        if index >= self.next_index {
            return Ok(());
        }

        let pos = self
            .covering_partition(index)
            .ok_or(SlotLogError::IndexOutOfBounds {
                index,
                length: self.next_index,
            })?;

        let previous = self.next_index;
        let mut trailing = self.partitions.split_off(pos + 1);
        let dropped = trailing.len();

        // Delete from the tail first so a crash leaves a gap-free prefix on disk
        while let Some(partition) = trailing.pop() {
            if let Err(e) = Self::delete_partition(&partition) {
                // Whatever is still on disk stays addressable
                trailing.push(partition);
                self.partitions.append(&mut trailing);
                self.resync_next_index();
                return Err(e);
            }
            self.next_index = self.next_index.min(partition.start);
        }

        let covering = &self.partitions[pos];
        let shrunk = covering
            .store
            .open()
            .and_then(|()| covering.store.truncate(index - covering.start));
        self.resync_next_index();
        shrunk?;

        tracing::debug!(
            "Truncated dataset {:?} from {} to {} records ({} partitions deleted)",
            self.config.name,
            previous,
            index,
            dropped
        );
        Ok(())
    }

    /// Describe every partition, opening each one to count its slots
    pub fn partitions(&self) -> Result<Vec<PartitionInfo>> {
        self.ensure_open()?;

        self.partitions
            .iter()
            .map(|p| {
                p.store.open()?;
                Ok(PartitionInfo {
                    start: p.start,
                    slots: p.store.length()?,
                    path: p.store.path().to_path_buf(),
                })
            })
            .collect()
    }

    /// Number of registered partitions
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Start index of every registered partition, ascending
    pub fn partition_starts(&self) -> Vec<u64> {
        self.partitions.iter().map(|p| p.start).collect()
    }

    /// Dataset name (partition file prefix)
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Directory holding the partition files
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Maximum slots per partition
    pub fn partition_capacity(&self) -> u64 {
        self.config.partition_capacity
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn ensure_open(&self) -> Result<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(SlotLogError::NotOpen {
                path: self.config.data_dir.clone(),
            })
        }
    }

    /// Adopt discovered partitions and mark the manager open. Nothing is
    /// committed unless the tail partition can be read.
    fn install(&mut self, partitions: Vec<Partition>) -> Result<()> {
        let next_index = Self::tail_length(&partitions)?;
        self.partitions = partitions;
        self.next_index = next_index;
        self.is_open = true;
        Ok(())
    }

    /// Start of the last partition plus its slot count
    fn tail_length(partitions: &[Partition]) -> Result<u64> {
        match partitions.last() {
            None => Ok(0),
            Some(last) => {
                last.store.open()?;
                Ok(last.start + last.store.length()?)
            }
        }
    }

    /// Re-derive `next_index` from the tail partition after a failed or
    /// partial truncation. `next_index` is left alone while the tail cannot
    /// be read.
    fn resync_next_index(&mut self) {
        match Self::tail_length(&self.partitions) {
            Ok(length) => self.next_index = length,
            Err(e) => tracing::warn!(
                "Cannot read tail partition of dataset {:?}, keeping length {}: {}",
                self.config.name,
                self.next_index,
                e
            ),
        }
    }

    /// Position of the rightmost partition whose start is `<= index`
    fn covering_partition(&self, index: u64) -> Option<usize> {
        let after = self.partitions.partition_point(|p| p.start <= index);
        after.checked_sub(1)
    }

    /// Partition the next append goes to, starting a new one when there is
    /// none yet or the last one is already full (e.g. after a reopen)
    fn active_partition(&mut self) -> &Partition {
        let capacity = self.config.partition_capacity;
        let next_index = self.next_index;

        let has_room = self
            .partitions
            .last()
            .map_or(false, |p| next_index - p.start < capacity);
        if !has_room {
            self.register_partition(next_index);
        }

        &self.partitions[self.partitions.len() - 1]
    }

    /// Register a closed partition; its file appears on first open
    fn register_partition(&mut self, start: u64) {
        let path = self.partition_path(start);
        tracing::debug!("Registered partition {} at index {}", path.display(), start);

        self.partitions.push(Partition {
            start,
            store: SlotStore::new(path),
        });
    }

    /// "<dir>/<name>-<start>.bin"
    fn partition_path(&self, start: u64) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}-{}.bin", self.config.name, start))
    }

    /// Parse dataset name and start index from a partition file name
    /// "events-500000.bin" → Some(("events", 500000))
    fn parse_partition_file_name(path: &Path) -> Option<(&str, u64)> {
        let file_name = path.file_name()?.to_str()?;
        let stem = file_name.strip_suffix(".bin")?;
        let (name, start) = stem.rsplit_once('-')?;

        if name.is_empty() || start.is_empty() || !start.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some((name, start.parse().ok()?))
    }

    /// Close a partition and delete its file. A registered partition that
    /// was never opened has no file yet.
    fn delete_partition(partition: &Partition) -> Result<()> {
        if partition.store.is_open() {
            partition.store.close()?;
        }

        match fs::remove_file(partition.store.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for PartitionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionManager")
            .field("name", &self.config.name)
            .field("data_dir", &self.config.data_dir)
            .field("partition_starts", &self.partition_starts())
            .field("next_index", &self.next_index)
            .field("is_open", &self.is_open)
            .finish()
    }
}
