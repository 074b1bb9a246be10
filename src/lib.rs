//! # Faro - PiFace CAD Status Panel
//!
//! Faro drives a PiFace Control and Display board (16x2 character LCD and
//! eight tactile switches behind an MCP23S17 port expander) as the front
//! panel of a headless Raspberry Pi print server. It provides:
//!
//! - **Protocol implementation**: HD44780 instruction builders
//! - **Expander driver**: MCP23S17 register access over Linux spidev
//! - **Status panel**: scrolling status lines with button navigation
//! - **Scan workflows**: one-button flatbed scanning into shared storage
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//!
//! use faro::{
//!     display::{Lcd, PiFaceLcd},
//!     expander::Mcp23s17,
//!     transport::Spi,
//! };
//!
//! // Open the SPI bus the board hangs off
//! let spi = Arc::new(Mutex::new(Spi::open("/dev/spidev0.1")?));
//!
//! // Bring up the port expander
//! let chip = Mcp23s17::new(spi);
//! chip.init()?;
//!
//! // Drive the character display behind it
//! let mut lcd = PiFaceLcd::new(chip);
//! lcd.init()?;
//! lcd.backlight_on()?;
//! lcd.write("hello")?;
//!
//! # Ok::<(), faro::error::FaroError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | HD44780 instruction builders |
//! | [`transport`] | SPI bus access |
//! | [`expander`] | MCP23S17 port expander driver |
//! | [`display`] | Character LCD driver |
//! | [`buttons`] | Switch polling and edge detection |
//! | [`status`] | Status line providers |
//! | [`panel`] | The scrolling status panel loop |
//! | [`scan`] | Flatbed scan workflows |
//! | [`boot`] | Boot log mirror and splash banner |
//! | [`error`] | Error types |
//!
//! ## Supported Hardware
//!
//! Currently tested with:
//! - PiFace Control and Display on a Raspberry Pi Model B (`/dev/spidev0.1`)
//!
//! Other MCP23S17-based HD44780 carriers should work with adjusted
//! pin masks and register setup.

pub mod boot;
pub mod buttons;
pub mod display;
pub mod error;
pub mod expander;
pub mod panel;
pub mod protocol;
pub mod scan;
pub mod status;
pub mod transport;

// Re-exports for convenience
pub use display::PiFaceLcd;
pub use error::FaroError;
pub use panel::Panel;
pub use transport::Spi;
