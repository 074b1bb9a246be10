//! # Status Providers
//!
//! Each provider turns one question about the machine into a short panel
//! line plus an attention flag; the flag wakes the backlight when the line
//! lands on the display.
//!
//! ## Available Providers
//!
//! - [`ip`]: host addresses via `hostname`
//! - [`printer`]: CUPS queue health via `lpstat`
//! - [`scanner`]: flatbed placeholder reading
//!
//! Providers run on the loop thread at render time. There is no caching and
//! no retry: a reading is as fresh as the command that produced it, and a
//! failing command takes the whole service down rather than rendering stale
//! or invented text.

pub mod ip;
pub mod printer;
pub mod scanner;

pub use ip::IpStatus;
pub use printer::PrinterStatus;
pub use scanner::ScannerStatus;

use std::process::Command;

use crate::error::FaroError;

/// One reading from a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Line to render (field-fitted downstream)
    pub text: String,
    /// Wake the backlight while this line is on the panel
    pub attention: bool,
}

impl Status {
    /// A quiet reading.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attention: false,
        }
    }

    /// A reading that should light the panel.
    pub fn attention(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attention: true,
        }
    }
}

/// Trait for things that can report one panel line.
pub trait StatusSource {
    /// Produce a fresh reading.
    fn read(&mut self) -> Result<Status, FaroError>;
}

/// Run a command and hand back its stdout.
///
/// A nonzero exit is an error even if the tool printed something.
pub(crate) fn capture(program: &str, args: &[&str]) -> Result<String, FaroError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| FaroError::Command(format!("Failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        return Err(FaroError::Command(format!(
            "{} exited with {}",
            program, output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ============================================================================
// TESTS
// ============================================================================
