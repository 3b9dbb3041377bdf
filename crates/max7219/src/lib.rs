#![cfg_attr(not(test), no_std)]

//! MAX7219 LED matrix (chained 8x8 modules) driver primitives.

mod framebuffer;
pub mod protocol;

pub use framebuffer::FrameBuffer;

use embedded_hal::spi::SpiDevice;

use crate::protocol::{ChainPacket, HEIGHT, MAX_INTENSITY, MAX_MODULES, register};

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Number of chained 8x8 modules.
    pub modules: usize,
    /// Initial brightness, 0..=15.
    pub intensity: u8,
    /// Number of scanned rows minus one.
    pub scan_limit: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modules: 4,
            intensity: 1,
            scan_limit: 7,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr> {
    /// SPI transaction failed.
    Spi(SpiErr),
    /// Input parameters are outside supported bounds.
    InvalidInput,
}

pub type DriverResult<SpiErr> = Result<(), Error<SpiErr>>;

/// MAX7219 chain driver.
#[derive(Debug)]
pub struct Max7219<SPI> {
    spi: SPI,
    config: Config,
}

impl<SPI> Max7219<SPI>
where
    SPI: SpiDevice<u8>,
{
    /// Creates a new driver instance.
    pub fn new(spi: SPI, config: Config) -> Self {
        Self { spi, config }
    }

    /// Returns current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases the owned bus.
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Leaves shutdown with decoding off, all rows scanned, and the configured
    /// brightness.
    pub fn initialize(&mut self) -> DriverResult<SPI::Error> {
        if !(1..=MAX_MODULES).contains(&self.config.modules) || self.config.scan_limit > 7 {
            return Err(Error::InvalidInput);
        }

        self.broadcast(register::SHUTDOWN, 0x00)?;
        self.broadcast(register::DISPLAY_TEST, 0x00)?;
        self.broadcast(register::SCAN_LIMIT, self.config.scan_limit)?;
        self.broadcast(register::DECODE_MODE, 0x00)?;
        self.broadcast(register::SHUTDOWN, 0x01)?;
        self.set_intensity(self.config.intensity)
    }

    /// Sets brightness on every module.
    pub fn set_intensity(&mut self, level: u8) -> DriverResult<SPI::Error> {
        if level > MAX_INTENSITY {
            return Err(Error::InvalidInput);
        }

        self.broadcast(register::INTENSITY, level)?;
        self.config.intensity = level;
        Ok(())
    }

    /// Writes all eight rows of `frame`.
    pub fn flush_full(&mut self, frame: &FrameBuffer) -> DriverResult<SPI::Error> {
        if frame.modules() != self.config.modules {
            return Err(Error::InvalidInput);
        }

        for row in 0..HEIGHT {
            let bytes = frame.row(row).ok_or(Error::InvalidInput)?;
            let packet = protocol::build_row_packet(row, bytes).ok_or(Error::InvalidInput)?;
            self.write_packet(&packet)?;
        }

        Ok(())
    }

    fn broadcast(&mut self, register: u8, data: u8) -> DriverResult<SPI::Error> {
        let packet = protocol::build_broadcast_packet(self.config.modules, register, data)
            .ok_or(Error::InvalidInput)?;
        self.write_packet(&packet)
    }

    fn write_packet(&mut self, packet: &ChainPacket) -> DriverResult<SPI::Error> {
        self.spi.write(packet.as_bytes()).map_err(Error::Spi)
    }
}
