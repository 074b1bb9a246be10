//! # MCP23S17 Port Expander
//!
//! Register-level driver for the 16-bit SPI port expander at the heart of
//! the PiFace CAD board. Port A carries the eight panel switches, port B
//! carries the LCD's data and control lines plus the backlight transistor.
//!
//! ## Register Map (IOCON.BANK = 0)
//!
//! | Register | Address | Purpose                          |
//! |----------|---------|----------------------------------|
//! | IODIRA   | 0x00    | Port A direction (1 = input)     |
//! | IODIRB   | 0x01    | Port B direction (1 = input)     |
//! | IOCON    | 0x0A    | Chip configuration               |
//! | GPPUA    | 0x0C    | Port A pull-ups (1 = enabled)    |
//! | GPPUB    | 0x0D    | Port B pull-ups (1 = enabled)    |
//! | GPIOA    | 0x12    | Port A pin values                |
//! | GPIOB    | 0x13    | Port B pin values                |
//! | OLATA    | 0x14    | Port A output latch              |
//! | OLATB    | 0x15    | Port B output latch              |
//!
//! ## Wire Framing
//!
//! Every exchange is three bytes under one chip select: a control byte
//! (`0100 A2 A1 A0 R/W`), the register address, then the data byte. On a
//! read the value arrives in the third clocked-in byte.

use std::sync::{Arc, Mutex};

use crate::error::FaroError;
use crate::transport::Spi;

// ============================================================================
// REGISTERS
// ============================================================================

/// Port A direction register (1 = input)
pub const IODIRA: u8 = 0x00;

/// Port B direction register (1 = input)
pub const IODIRB: u8 = 0x01;

/// Chip configuration register
pub const IOCON: u8 = 0x0A;

/// Port A pull-up enable register
pub const GPPUA: u8 = 0x0C;

/// Port B pull-up enable register
pub const GPPUB: u8 = 0x0D;

/// Port A pin-value register
pub const GPIOA: u8 = 0x12;

/// Port B pin-value register
pub const GPIOB: u8 = 0x13;

/// Port A output latch register
pub const OLATA: u8 = 0x14;

/// Port B output latch register
pub const OLATB: u8 = 0x15;

/// IOCON flag: honor the hardware address pins on SPI chips
pub const IOCON_HAEN: u8 = 0x08;

/// Base control byte; bits 1-3 carry the hardware address, bit 0 selects read
const OPCODE_WRITE: u8 = 0x40;

/// Build the control byte for a register write.
#[inline]
pub fn write_opcode(hardware_addr: u8) -> u8 {
    OPCODE_WRITE | ((hardware_addr & 0x07) << 1)
}

/// Build the control byte for a register read.
#[inline]
pub fn read_opcode(hardware_addr: u8) -> u8 {
    write_opcode(hardware_addr) | 0x01
}

/// # MCP23S17 Handle
///
/// Cheap to clone; the display driver and the button listener each hold one
/// and serialize their three-byte exchanges through the shared bus lock.
#[derive(Clone)]
pub struct Mcp23s17 {
    spi: Arc<Mutex<Spi>>,
    hardware_addr: u8,
}

impl Mcp23s17 {
    /// Wrap a shared SPI bus, addressing the chip at hardware address 0
    /// (all address pins grounded, as on the PiFace CAD).
    pub fn new(spi: Arc<Mutex<Spi>>) -> Self {
        Self::with_address(spi, 0)
    }

    /// Wrap a shared SPI bus for a chip at a specific hardware address.
    pub fn with_address(spi: Arc<Mutex<Spi>>, hardware_addr: u8) -> Self {
        Self {
            spi,
            hardware_addr: hardware_addr & 0x07,
        }
    }

    /// Put the chip in the board's standard shape: switches on port A as
    /// pulled-up inputs, LCD lines on port B as outputs driven low.
    pub fn init(&self) -> Result<(), FaroError> {
        self.write_register(IOCON, IOCON_HAEN)?;
        self.write_register(IODIRA, 0xFF)?;
        self.write_register(GPPUA, 0xFF)?;
        self.write_register(IODIRB, 0x00)?;
        self.write_register(GPIOB, 0x00)?;
        Ok(())
    }

    /// Write one register.
    pub fn write_register(&self, register: u8, value: u8) -> Result<(), FaroError> {
        let spi = self.lock_bus()?;
        spi.transfer(&[write_opcode(self.hardware_addr), register, value])?;
        Ok(())
    }

    /// Read one register.
    pub fn read_register(&self, register: u8) -> Result<u8, FaroError> {
        let spi = self.lock_bus()?;
        let reply = spi.transfer(&[read_opcode(self.hardware_addr), register, 0x00])?;
        Ok(reply[2])
    }

    /// Read the switch port. Switches are wired active-low, so an idle
    /// panel reads 0xFF and a held button pulls its bit to 0.
    pub fn read_switches(&self) -> Result<u8, FaroError> {
        self.read_register(GPIOA)
    }

    fn lock_bus(&self) -> Result<std::sync::MutexGuard<'_, Spi>, FaroError> {
        self.spi
            .lock()
            .map_err(|_| FaroError::Spi("SPI bus lock poisoned".to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_opcode_base_address() {
        assert_eq!(write_opcode(0), 0x40);
    }

    #[test]
    fn test_read_opcode_sets_low_bit() {
        assert_eq!(read_opcode(0), 0x41);
    }

    #[test]
    fn test_opcode_carries_hardware_address() {
        assert_eq!(write_opcode(3), 0x46);
        assert_eq!(read_opcode(3), 0x47);
        assert_eq!(write_opcode(7), 0x4E);
    }

    #[test]
    fn test_opcode_masks_out_of_range_address() {
        // Only three address pins exist.
        assert_eq!(write_opcode(8), write_opcode(0));
    }

    #[test]
    fn test_register_addresses() {
        // Bank 0 layout straight from the datasheet.
        assert_eq!(IODIRA, 0x00);
        assert_eq!(IODIRB, 0x01);
        assert_eq!(IOCON, 0x0A);
        assert_eq!(GPPUA, 0x0C);
        assert_eq!(GPPUB, 0x0D);
        assert_eq!(GPIOA, 0x12);
        assert_eq!(GPIOB, 0x13);
        assert_eq!(OLATA, 0x14);
        assert_eq!(OLATB, 0x15);
    }
}
