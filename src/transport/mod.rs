//! # Hardware Transport Layer
//!
//! This module provides the bus backend the rest of the crate drives the
//! PiFace CAD board through.
//!
//! ## Available Transports
//!
//! - [`spi`]: Linux spidev full-duplex transfers (the board's only bus)
//!
//! ## Future Transports
//!
//! - I2C port expanders (MCP23017 boards share the register map)
//! - Mock bus for driver-level testing

pub mod spi;

pub use spi::Spi;
