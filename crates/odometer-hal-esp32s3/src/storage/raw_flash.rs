//! SPI flash access through the ESP32-S3 ROM routines.
//!
//! The ROM only moves aligned 32-bit words; byte-addressed reads and writes
//! are split into the words they touch.

use core::ops::Range;

use embedded_storage::{ReadStorage, Storage};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};

pub const SECTOR_BYTES: u32 = 4096;
const WORD_BYTES: u32 = 4;
const CAPACITY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RawFlashError {
    /// Non-zero ROM status code.
    Rom(i32),
    /// Address not aligned to what the operation needs.
    Misaligned,
    /// Generic `Storage::write` is not offered; callers erase explicitly.
    WriteUnsupported,
}

fn rom_status(rc: i32) -> Result<(), RawFlashError> {
    if rc == ESP_ROM_SPIFLASH_RESULT_OK {
        Ok(())
    } else {
        Err(RawFlashError::Rom(rc))
    }
}

/// Word addresses covering `len` bytes from `addr`, plus the byte range of
/// each word that falls inside the span.
fn word_span(addr: u32, len: usize) -> impl Iterator<Item = (u32, Range<usize>)> {
    let end = addr + len as u32;
    let first = addr & !(WORD_BYTES - 1);
    (first..end).step_by(WORD_BYTES as usize).map(move |word| {
        let lo = addr.saturating_sub(word).min(WORD_BYTES) as usize;
        let hi = (end - word).min(WORD_BYTES) as usize;
        (word, lo..hi)
    })
}

#[derive(Debug)]
pub struct RawFlash;

impl RawFlash {
    pub fn new() -> Result<Self, RawFlashError> {
        rom_status(unsafe { esp_rom_spiflash_unlock() })?;
        Ok(Self)
    }

    pub fn erase_sector(&mut self, addr: u32) -> Result<(), RawFlashError> {
        if !addr.is_multiple_of(SECTOR_BYTES) {
            return Err(RawFlashError::Misaligned);
        }
        rom_status(unsafe { esp_rom_spiflash_erase_sector(addr / SECTOR_BYTES) })
    }

    fn read_word(&mut self, addr: u32) -> Result<[u8; 4], RawFlashError> {
        let mut word = 0u32;
        rom_status(unsafe {
            esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4)
        })?;
        Ok(word.to_le_bytes())
    }

    fn write_word(&mut self, addr: u32, bytes: [u8; 4]) -> Result<(), RawFlashError> {
        let word = u32::from_le_bytes(bytes);
        rom_status(unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) })
    }

    pub fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), RawFlashError> {
        let mut filled = 0;
        for (word, range) in word_span(addr, out.len()) {
            let bytes = self.read_word(word)?;
            let chunk = &bytes[range];
            out[filled..filled + chunk.len()].copy_from_slice(chunk);
            filled += chunk.len();
        }
        Ok(())
    }

    /// Programs `data` into erased flash; bytes around it in a shared word stay 0xFF.
    pub fn program_erased(&mut self, addr: u32, data: &[u8]) -> Result<(), RawFlashError> {
        let mut taken = 0;
        for (word, range) in word_span(addr, data.len()) {
            let mut bytes = [0xFFu8; 4];
            let len = range.len();
            bytes[range].copy_from_slice(&data[taken..taken + len]);
            taken += len;
            self.write_word(word, bytes)?;
        }
        Ok(())
    }
}

impl ReadStorage for RawFlash {
    type Error = RawFlashError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    fn capacity(&self) -> usize {
        CAPACITY_BYTES
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(RawFlashError::WriteUnsupported)
    }
}
