//! # Error Types
//!
//! This module defines error types used throughout the faro library.

use thiserror::Error;

/// Main error type for faro operations
#[derive(Debug, Error)]
pub enum FaroError {
    /// SPI bus errors (open, configure, transfer)
    #[error("SPI error: {0}")]
    Spi(String),

    /// An external command could not be run or exited unsuccessfully
    #[error("Command error: {0}")]
    Command(String),

    /// Printer queue with no entry in the friendly-name table
    #[error("Unknown printer: {0}")]
    UnknownPrinter(String),

    /// The button listener is gone and its queue will never fill again
    #[error("Button queue closed")]
    ButtonsClosed,

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
