use embedded_hal::spi::SpiDevice;
use log::warn;
use max7219::{Config, DriverResult, Error, FrameBuffer, Max7219};
use odometer_core::render::FrameSink;

/// Board-level adapter presenting a MAX7219 chain as a frame sink.
///
/// Only the first failed flush is logged; later ones are still returned.
#[derive(Debug)]
pub struct MatrixDisplay<SPI> {
    driver: Max7219<SPI>,
    fault_logged: bool,
}

impl<SPI> MatrixDisplay<SPI>
where
    SPI: SpiDevice<u8>,
{
    pub fn new(spi: SPI, config: Config) -> Self {
        Self {
            driver: Max7219::new(spi, config),
            fault_logged: false,
        }
    }

    pub fn modules(&self) -> usize {
        self.driver.config().modules
    }

    /// Wakes the chain and blanks it.
    pub fn initialize(&mut self) -> DriverResult<SPI::Error> {
        self.driver.initialize()?;
        self.driver.flush_full(&FrameBuffer::new(self.modules()))
    }
}

impl<SPI> FrameSink for MatrixDisplay<SPI>
where
    SPI: SpiDevice<u8>,
{
    type Error = Error<SPI::Error>;

    fn show(&mut self, frame: &FrameBuffer) -> Result<(), Self::Error> {
        let result = self.driver.flush_full(frame);
        if let Err(err) = &result
            && !self.fault_logged
        {
            warn!("display: flush failed err={:?}", err);
            self.fault_logged = true;
        }
        result
    }
}
