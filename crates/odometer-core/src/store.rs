//! Persistence of the last shown distance.
//!
//! The value is kept as decimal text (`120.0`, `87.3`) wrapped in a small
//! checksummed record so a raw flash sector can hold it.

use core::fmt::Write;

use heapless::String as HeaplessString;

use crate::format::DistanceKm;

/// Abstract persistence backend for one distance value.
pub trait DistanceStore {
    type Error: core::fmt::Debug;

    /// `Ok(None)` when nothing has been stored yet.
    fn load(&mut self) -> Result<Option<DistanceKm>, Self::Error>;
    fn save(&mut self, distance: DistanceKm) -> Result<(), Self::Error>;
}

pub const PAYLOAD_BYTES: usize = 32;

pub type DistancePayload = HeaplessString<PAYLOAD_BYTES>;

pub const RECORD_MAGIC: u32 = 0x314B_444F; // "ODK1"
pub const RECORD_VERSION: u8 = 1;
pub const RECORD_LEN: usize = CHECKSUM_OFFSET + 4;

const VERSION_OFFSET: usize = 4;
const LENGTH_OFFSET: usize = 5;
const PAYLOAD_OFFSET: usize = 8;
const CHECKSUM_OFFSET: usize = PAYLOAD_OFFSET + PAYLOAD_BYTES;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RecordError {
    /// Checksum, length, or payload text did not validate.
    Corrupted,
    /// The value does not fit the fixed payload.
    Oversized,
}

/// Shortest round-trip decimal text, always carrying a fractional part.
pub fn encode_distance(distance: DistanceKm) -> Result<DistancePayload, RecordError> {
    let mut out = DistancePayload::new();
    write!(out, "{}", distance.get()).map_err(|_| RecordError::Oversized)?;
    if !out.contains('.') {
        out.push_str(".0").map_err(|_| RecordError::Oversized)?;
    }
    Ok(out)
}

/// Parses stored text; surrounding whitespace is ignored.
///
/// Anything that is not a finite, non-negative decimal is rejected.
pub fn parse_distance(text: &str) -> Option<DistanceKm> {
    let value: f64 = text.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    DistanceKm::new(value)
}

pub fn encode_record(distance: DistanceKm) -> Result<[u8; RECORD_LEN], RecordError> {
    let payload = encode_distance(distance)?;

    let mut buf = [0xFFu8; RECORD_LEN];
    buf[0..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
    buf[VERSION_OFFSET] = RECORD_VERSION;
    buf[LENGTH_OFFSET] = payload.len() as u8;
    buf[6..PAYLOAD_OFFSET].copy_from_slice(&[0u8; 2]);
    buf[PAYLOAD_OFFSET..CHECKSUM_OFFSET].copy_from_slice(&[0u8; PAYLOAD_BYTES]);
    buf[PAYLOAD_OFFSET..PAYLOAD_OFFSET + payload.len()].copy_from_slice(payload.as_bytes());

    let checksum = checksum32(&buf[..CHECKSUM_OFFSET]);
    buf[CHECKSUM_OFFSET..].copy_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

/// Erased flash and records written by something else read as "no value".
pub fn decode_record(buf: &[u8; RECORD_LEN]) -> Result<Option<DistanceKm>, RecordError> {
    if buf.iter().all(|b| *b == 0xFF) {
        return Ok(None);
    }

    let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if magic != RECORD_MAGIC {
        return Ok(None);
    }

    if buf[VERSION_OFFSET] != RECORD_VERSION {
        return Ok(None);
    }

    let expected_checksum = u32::from_le_bytes([
        buf[CHECKSUM_OFFSET],
        buf[CHECKSUM_OFFSET + 1],
        buf[CHECKSUM_OFFSET + 2],
        buf[CHECKSUM_OFFSET + 3],
    ]);
    if checksum32(&buf[..CHECKSUM_OFFSET]) != expected_checksum {
        return Err(RecordError::Corrupted);
    }

    let len = buf[LENGTH_OFFSET] as usize;
    if len > PAYLOAD_BYTES {
        return Err(RecordError::Corrupted);
    }

    let text = core::str::from_utf8(&buf[PAYLOAD_OFFSET..PAYLOAD_OFFSET + len])
        .map_err(|_| RecordError::Corrupted)?;
    parse_distance(text)
        .map(Some)
        .ok_or(RecordError::Corrupted)
}

/// FNV-1a over `bytes`.
pub fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}
