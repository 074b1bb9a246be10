//! # LCD Controller Protocol
//!
//! This module provides instruction builders for the character LCD
//! controller on the PiFace CAD board.
//!
//! ## Module Structure
//!
//! - [`hd44780`]: HD44780U instruction bytes (clear, cursor, display control)
//!
//! ## Usage Example
//!
//! ```
//! use faro::protocol::hd44780;
//!
//! // Shape the controller the way the board is wired
//! let setup = [
//!     hd44780::function_set(false, true), // 4-bit bus, two lines
//!     hd44780::display_control(true, false, false),
//!     hd44780::entry_mode(true, false),
//!     hd44780::CLEAR_DISPLAY,
//! ];
//! assert_eq!(setup, [0x28, 0x0C, 0x06, 0x01]);
//! ```

pub mod hd44780;
