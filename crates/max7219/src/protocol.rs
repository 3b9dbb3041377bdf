//! Wire-level protocol helpers for daisy-chained MAX7219 8x8 modules.

/// Pixels per module edge.
pub const MODULE_SIZE: usize = 8;
/// Matrix height in pixels (one module tall).
pub const HEIGHT: usize = MODULE_SIZE;
/// Longest supported chain.
pub const MAX_MODULES: usize = 8;
/// Framebuffer size in bytes for the longest chain.
pub const BUFFER_SIZE: usize = MAX_MODULES * HEIGHT;
/// Brightest intensity level accepted by the chip.
pub const MAX_INTENSITY: u8 = 0x0F;

/// Largest packet: one register/data pair per module.
pub const PACKET_SIZE: usize = 2 * MAX_MODULES;

/// Register addresses.
pub mod register {
    /// Row 0; rows 1..=7 follow consecutively.
    pub const DIGIT0: u8 = 0x01;
    pub const DECODE_MODE: u8 = 0x09;
    pub const INTENSITY: u8 = 0x0A;
    pub const SCAN_LIMIT: u8 = 0x0B;
    pub const SHUTDOWN: u8 = 0x0C;
    pub const DISPLAY_TEST: u8 = 0x0F;
}

/// One CS-framed write covering the whole chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChainPacket {
    bytes: [u8; PACKET_SIZE],
    len: usize,
}

impl ChainPacket {
    /// Bytes to shift out while CS is low.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Builds a write of the same register/data pair to every module in the chain.
///
/// Returns `None` when `modules` is zero or above [`MAX_MODULES`].
#[inline]
pub fn build_broadcast_packet(modules: usize, register: u8, data: u8) -> Option<ChainPacket> {
    if !(1..=MAX_MODULES).contains(&modules) {
        return None;
    }

    let mut bytes = [0u8; PACKET_SIZE];
    for pair in bytes.chunks_exact_mut(2).take(modules) {
        pair[0] = register;
        pair[1] = data;
    }

    Some(ChainPacket {
        bytes,
        len: modules * 2,
    })
}

/// Builds the row update for `row` (0..8) from one byte per module.
///
/// The leftmost module's byte is shifted out first, so it ends up in the module
/// farthest from the MCU.
#[inline]
pub fn build_row_packet(row: usize, row_bytes: &[u8]) -> Option<ChainPacket> {
    if row >= HEIGHT || !(1..=MAX_MODULES).contains(&row_bytes.len()) {
        return None;
    }

    let mut bytes = [0u8; PACKET_SIZE];
    for (pair, data) in bytes.chunks_exact_mut(2).zip(row_bytes) {
        pair[0] = register::DIGIT0 + row as u8;
        pair[1] = *data;
    }

    Some(ChainPacket {
        bytes,
        len: row_bytes.len() * 2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_repeats_pair_per_module() {
        let packet = build_broadcast_packet(4, register::INTENSITY, 0x01).unwrap();
        assert_eq!(
            packet.as_bytes(),
            &[0x0A, 0x01, 0x0A, 0x01, 0x0A, 0x01, 0x0A, 0x01]
        );
    }

    #[test]
    fn row_packet_addresses_digit_register() {
        let packet = build_row_packet(0, &[0xAA, 0x55]).unwrap();
        assert_eq!(packet.as_bytes(), &[0x01, 0xAA, 0x01, 0x55]);

        let packet = build_row_packet(7, &[0xFF]).unwrap();
        assert_eq!(packet.as_bytes(), &[0x08, 0xFF]);
    }

    #[test]
    fn invalid_chain_lengths_are_rejected() {
        assert_eq!(build_broadcast_packet(0, register::SHUTDOWN, 1), None);
        assert_eq!(
            build_broadcast_packet(MAX_MODULES + 1, register::SHUTDOWN, 1),
            None
        );
        assert_eq!(build_row_packet(0, &[]), None);
        assert_eq!(build_row_packet(0, &[0u8; MAX_MODULES + 1]), None);
    }

    #[test]
    fn invalid_row_is_rejected() {
        assert_eq!(build_row_packet(HEIGHT, &[0x00]), None);
    }
}
