use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use log::debug;
use odometer_core::{
    format::DistanceKm,
    store::{DistanceStore, RECORD_LEN, RecordError, decode_record, encode_record},
};

use super::raw_flash::{RawFlash, RawFlashError, SECTOR_BYTES};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashStoreError {
    PartitionTable,
    PartitionMissing,
    FlashOpFailed(i32),
    Corrupted,
    Unsupported,
}

impl From<RecordError> for FlashStoreError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Corrupted => Self::Corrupted,
            RecordError::Oversized => Self::Unsupported,
        }
    }
}

impl From<RawFlashError> for FlashStoreError {
    fn from(err: RawFlashError) -> Self {
        match err {
            RawFlashError::Rom(rc) => Self::FlashOpFailed(rc),
            RawFlashError::Misaligned | RawFlashError::WriteUnsupported => Self::Unsupported,
        }
    }
}

/// Last shown distance, kept in the final sector of the first writable data
/// partition (an `undefined` subtype is preferred over `nvs`).
#[derive(Debug)]
pub struct FlashDistanceStore {
    flash: RawFlash,
    sector_addr: u32,
}

impl FlashDistanceStore {
    pub fn new() -> Result<Self, FlashStoreError> {
        let mut flash = RawFlash::new()?;
        let (offset, len) = distance_partition(&mut flash)?;

        let sector_addr = offset + len - SECTOR_BYTES;
        debug!("store: distance sector addr={:#x}", sector_addr);
        Ok(Self { flash, sector_addr })
    }
}

/// `(offset, len)` of the partition that holds the record.
fn distance_partition(flash: &mut RawFlash) -> Result<(u32, u32), FlashStoreError> {
    let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
    let table = read_partition_table(flash, &mut table_buf)
        .map_err(|_| FlashStoreError::PartitionTable)?;

    let mut nvs = None;
    for entry in table.iter() {
        if entry.is_read_only() || entry.len() < SECTOR_BYTES {
            continue;
        }

        match entry.partition_type() {
            PartitionType::Data(DataPartitionSubType::Undefined) => {
                return Ok((entry.offset(), entry.len()));
            }
            PartitionType::Data(DataPartitionSubType::Nvs) if nvs.is_none() => {
                nvs = Some((entry.offset(), entry.len()));
            }
            _ => {}
        }
    }

    nvs.ok_or(FlashStoreError::PartitionMissing)
}

impl DistanceStore for FlashDistanceStore {
    type Error = FlashStoreError;

    fn load(&mut self) -> Result<Option<DistanceKm>, Self::Error> {
        let mut buf = [0u8; RECORD_LEN];
        self.flash.read_bytes(self.sector_addr, &mut buf)?;
        Ok(decode_record(&buf)?)
    }

    fn save(&mut self, distance: DistanceKm) -> Result<(), Self::Error> {
        let buf = encode_record(distance)?;
        self.flash.erase_sector(self.sector_addr)?;
        self.flash.program_erased(self.sector_addr, &buf)?;
        Ok(())
    }
}
