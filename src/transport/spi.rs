//! # SPI Bus Transport
//!
//! This module talks to the PiFace Control and Display board through the
//! Linux spidev interface. The board hangs a single MCP23S17 port expander
//! off the Raspberry Pi's auxiliary chip select, so everything the daemon
//! does ends where this module does: three-byte transfers on `/dev/spidev0.1`.
//!
//! ## Bus Configuration
//!
//! The expander wants SPI mode 0 (clock idle low, sample on the rising
//! edge), 8-bit words, and tolerates well above the 5 MHz we ask for:
//!
//! - **Mode**: 0 (`CPOL=0`, `CPHA=0`)
//! - **Bits per word**: 8
//! - **Max speed**: 5,000,000 Hz
//!
//! Configuration happens once at open time through the `SPI_IOC_WR_*`
//! ioctls; transfers use `SPI_IOC_MESSAGE(1)` so every exchange is a single
//! full-duplex transaction under one chip-select assertion.
//!
//! ## Device Setup (Raspberry Pi)
//!
//! The spidev nodes only exist when the kernel SPI driver is loaded:
//!
//! ```bash
//! # Enable the SPI interface (or use raspi-config)
//! $ sudo dtparam spi=on
//!
//! # The PiFace CAD sits on chip select 1
//! $ ls /dev/spidev0.*
//! /dev/spidev0.0  /dev/spidev0.1
//! ```

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::error::FaroError;

/// Default spidev node for the PiFace CAD (chip select 1)
pub const DEFAULT_DEVICE: &str = "/dev/spidev0.1";

/// SPI mode 0: clock idle low, data latched on the rising edge
const SPI_MODE: u8 = 0;

/// Word size in bits
const SPI_BITS_PER_WORD: u8 = 8;

/// Bus clock ceiling in Hz
const SPI_SPEED_HZ: u32 = 5_000_000;

// ============================================================================
// IOCTL REQUEST NUMBERS
// ============================================================================
//
// These reproduce the `_IOW('k', nr, size)` encoding from
// <linux/spi/spidev.h>: direction in bits 30-31, payload size in bits 16-29,
// the magic byte 'k' in bits 8-15 and the request number in bits 0-7.

/// spidev ioctl magic byte ('k')
const SPI_IOC_MAGIC: u32 = b'k' as u32;

/// `_IOC_WRITE` direction bit
const IOC_WRITE: u32 = 1;

const fn spi_ioc(nr: u32, size: u32) -> libc::c_ulong {
    ((IOC_WRITE << 30) | (size << 16) | (SPI_IOC_MAGIC << 8) | nr) as libc::c_ulong
}

/// `SPI_IOC_WR_MODE`: set the clock mode (u8 payload)
const SPI_IOC_WR_MODE: libc::c_ulong = spi_ioc(1, 1);

/// `SPI_IOC_WR_BITS_PER_WORD`: set the word size (u8 payload)
const SPI_IOC_WR_BITS_PER_WORD: libc::c_ulong = spi_ioc(3, 1);

/// `SPI_IOC_WR_MAX_SPEED_HZ`: set the clock ceiling (u32 payload)
const SPI_IOC_WR_MAX_SPEED_HZ: libc::c_ulong = spi_ioc(4, 4);

/// `SPI_IOC_MESSAGE(n)`: run `n` transfers in one chip-select window
const fn spi_ioc_message(n: u32) -> libc::c_ulong {
    spi_ioc(0, n * std::mem::size_of::<SpiTransfer>() as u32)
}

/// Mirror of `struct spi_ioc_transfer` from <linux/spi/spidev.h>.
///
/// The kernel reads buffer addresses as u64 regardless of pointer width,
/// which keeps the layout identical on 32-bit Pis and 64-bit dev machines.
#[repr(C)]
#[derive(Default)]
struct SpiTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    pad: u8,
}

/// # SPI Bus Handle
///
/// Owns an open spidev file descriptor configured for the MCP23S17.
///
/// ## Example
///
/// ```no_run
/// use faro::transport::Spi;
///
/// let spi = Spi::open("/dev/spidev0.1")?;
///
/// // Full-duplex exchange: the reply to a register read arrives in the
/// // same clocked-out bytes.
/// let reply = spi.transfer(&[0x41, 0x12, 0x00])?;
/// println!("GPIOA = {:#04x}", reply[2]);
///
/// # Ok::<(), faro::error::FaroError>(())
/// ```
pub struct Spi {
    file: File,
    speed_hz: u32,
}

impl Spi {
    /// Open and configure a spidev node.
    ///
    /// ## Parameters
    ///
    /// - `device`: Path to the spidev node (e.g., "/dev/spidev0.1")
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The node doesn't exist (SPI driver not loaded)
    /// - Permission denied (may need root or the spi group)
    /// - Any of the configuration ioctls is rejected
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, FaroError> {
        let path = device.as_ref();

        let file = File::options().read(true).write(true).open(path).map_err(|e| {
            FaroError::Spi(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_spidev(file.as_raw_fd())?;

        Ok(Self {
            file,
            speed_hz: SPI_SPEED_HZ,
        })
    }

    /// Open with the default device path (/dev/spidev0.1)
    pub fn open_default() -> Result<Self, FaroError> {
        Self::open(DEFAULT_DEVICE)
    }

    /// Run one full-duplex transfer.
    ///
    /// Clocks `tx` out and returns the bytes clocked in during the same
    /// window, so the reply has exactly `tx.len()` bytes. Chip select stays
    /// asserted for the whole exchange, which the MCP23S17 requires for its
    /// opcode/register/data framing.
    pub fn transfer(&self, tx: &[u8]) -> Result<Vec<u8>, FaroError> {
        let mut rx = vec![0u8; tx.len()];

        let xfer = SpiTransfer {
            tx_buf: tx.as_ptr() as u64,
            rx_buf: rx.as_mut_ptr() as u64,
            len: tx.len() as u32,
            speed_hz: self.speed_hz,
            bits_per_word: SPI_BITS_PER_WORD,
            ..SpiTransfer::default()
        };

        let result = unsafe { libc::ioctl(self.file.as_raw_fd(), spi_ioc_message(1), &xfer) };
        if result < 0 {
            return Err(FaroError::Spi(format!(
                "SPI transfer failed: {}",
                io::Error::last_os_error()
            )));
        }

        Ok(rx)
    }
}

/// Apply mode, word size and clock ceiling to a freshly opened descriptor.
#[cfg(unix)]
fn configure_spidev(fd: i32) -> Result<(), FaroError> {
    let mode = SPI_MODE;
    let result = unsafe { libc::ioctl(fd, SPI_IOC_WR_MODE, &mode) };
    if result < 0 {
        return Err(FaroError::Spi(format!(
            "Failed to set SPI mode: {}",
            io::Error::last_os_error()
        )));
    }

    let bits = SPI_BITS_PER_WORD;
    let result = unsafe { libc::ioctl(fd, SPI_IOC_WR_BITS_PER_WORD, &bits) };
    if result < 0 {
        return Err(FaroError::Spi(format!(
            "Failed to set SPI word size: {}",
            io::Error::last_os_error()
        )));
    }

    let speed = SPI_SPEED_HZ;
    let result = unsafe { libc::ioctl(fd, SPI_IOC_WR_MAX_SPEED_HZ, &speed) };
    if result < 0 {
        return Err(FaroError::Spi(format!(
            "Failed to set SPI speed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_spidev(_fd: i32) -> Result<(), FaroError> {
    Err(FaroError::Spi(
        "spidev is not supported on this platform".to_string(),
    ))
}

// ============================================================================
// TESTS
// ============================================================================
