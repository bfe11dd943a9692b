//! Slot codec
//!
//! Encodes payloads into fixed-size slot images and validates slot headers.
//! Pure functions only; all file access lives in the store.

use bytes::{BufMut, BytesMut};

use crate::error::{Result, SlotLogError};

use super::{CHECKSUM_SIZE, DATA_SIZE, HEADER_SIZE, LENGTH_SIZE, MAX_PAYLOAD, SLOT_SIZE};

/// Byte offset of slot `index` within a store file.
///
/// Returns `None` when the offset does not fit in a `u64`.
pub fn slot_offset(index: u64) -> Option<u64> {
    index.checked_mul(SLOT_SIZE as u64)
}

/// Compute the ASCII checksum field for a payload.
///
/// The CRC32 is read as a signed 32-bit value and its absolute value is
/// rendered as 8 lowercase hex digits, zero-padded.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let crc = crc32fast::hash(payload) as i32;
    let hex = format!("{:08x}", crc.unsigned_abs());

    let mut field = [0u8; CHECKSUM_SIZE];
    field.copy_from_slice(hex.as_bytes());
    field
}

/// Build the full 523-byte image for a payload:
/// `checksum (8) | length (3) | payload | zero padding`.
pub fn encode(payload: &[u8]) -> Result<BytesMut> {
    if payload.len() > MAX_PAYLOAD {
        return Err(SlotLogError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let mut buf = BytesMut::with_capacity(SLOT_SIZE);
    buf.put_slice(&checksum(payload));
    buf.put_slice(format!("{:03}", payload.len()).as_bytes());
    buf.put_slice(payload);
    buf.put_bytes(0, DATA_SIZE - payload.len());

    debug_assert_eq!(buf.len(), SLOT_SIZE);
    Ok(buf)
}

/// Parsed 11-byte slot header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHeader {
    /// Stored checksum field (ASCII hex)
    pub checksum: [u8; CHECKSUM_SIZE],
    /// Declared payload length in bytes
    pub length: usize,
}

impl SlotHeader {
    /// Parse a raw header read from slot `index`.
    ///
    /// Anything that is not 8 hex digits followed by 3 decimal digits, or a
    /// length beyond the data region, is reported as corruption.
    pub fn parse(index: u64, raw: &[u8; HEADER_SIZE]) -> Result<Self> {
        let (checksum_field, length_field) = raw.split_at(CHECKSUM_SIZE);

        if !checksum_field
            .iter()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b))
        {
            return Err(SlotLogError::Corrupted {
                index,
                reason: format!("invalid checksum field {:?}", checksum_field),
            });
        }

        if length_field.len() != LENGTH_SIZE || !length_field.iter().all(u8::is_ascii_digit) {
            return Err(SlotLogError::Corrupted {
                index,
                reason: format!("invalid length field {:?}", length_field),
            });
        }

        let length = length_field
            .iter()
            .fold(0usize, |acc, b| acc * 10 + usize::from(b - b'0'));

        if length > MAX_PAYLOAD {
            return Err(SlotLogError::Corrupted {
                index,
                reason: format!("declared length {} exceeds {}", length, MAX_PAYLOAD),
            });
        }

        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(checksum_field);

        Ok(Self { checksum, length })
    }

    /// Check a payload read back from slot `index` against the stored checksum
    pub fn verify(&self, index: u64, payload: &[u8]) -> Result<()> {
        let actual = checksum(payload);
        if actual != self.checksum {
            return Err(SlotLogError::Corrupted {
                index,
                reason: format!(
                    "checksum mismatch: stored {}, computed {}",
                    String::from_utf8_lossy(&self.checksum),
                    String::from_utf8_lossy(&actual)
                ),
            });
        }
        Ok(())
    }
}
