//! # Host Address Line
//!
//! `hostname --all-ip-addresses` prints every configured address separated
//! by spaces, with a trailing blank and newline. On the single-homed Pi
//! that is one address, which fits the field; with more interfaces the
//! field clips and the first address wins.

use super::{Status, StatusSource, capture};
use crate::error::FaroError;

/// Reports the host's IP addresses.
pub struct IpStatus;

impl StatusSource for IpStatus {
    fn read(&mut self) -> Result<Status, FaroError> {
        let raw = capture("hostname", &["--all-ip-addresses"])?;
        Ok(address_line(&raw))
    }
}

fn address_line(raw: &str) -> Status {
    Status::ok(format!("IP: {}", raw.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_address_line_strips_trailing_blank_and_newline() {
        let status = address_line("192.168.1.17 \n");
        assert_eq!(status.text, "IP: 192.168.1.17");
        assert!(!status.attention);
    }

    #[test]
    fn test_address_line_keeps_multiple_addresses() {
        let status = address_line("10.0.0.5 fd00::5 \n");
        assert_eq!(status.text, "IP: 10.0.0.5 fd00::5");
    }

    #[test]
    fn test_address_line_survives_empty_output() {
        assert_eq!(address_line("\n").text, "IP: ");
    }
}
