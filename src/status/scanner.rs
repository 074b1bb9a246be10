//! # Scanner Line
//!
//! A fixed reading. Probing a SANE device takes seconds and spins the lamp
//! up, which is a lot to pay for a status row; the line exists so the
//! scanner keeps its slot in the rotation next to the queue it shares a
//! desk with.

use super::{Status, StatusSource};
use crate::error::FaroError;

/// Reports the flatbed as idle.
pub struct ScannerStatus;

impl StatusSource for ScannerStatus {
    fn read(&mut self) -> Result<Status, FaroError> {
        Ok(Status::ok("Scanner: idle"))
    }
}
