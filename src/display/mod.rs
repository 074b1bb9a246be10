//! # Character Display Layer
//!
//! Everything above the hardware writes to the panel through the [`Lcd`]
//! trait in this module. The status loop, the scan workflows and the boot
//! screens all render the same way; only `main` decides whether the sink is
//! the real PiFace panel or a test double.
//!
//! ## Geometry
//!
//! The board carries a 16x2 character panel. Status lines are rendered into
//! a fixed 15-column field so a short reading always blanks out the longer
//! one it replaces; workflow and boot screens may use the full 16 columns.

mod piface;

pub use piface::PiFaceLcd;

use crate::error::FaroError;

/// Panel width in characters
pub const LCD_COLS: u8 = 16;

/// Panel height in rows
pub const LCD_ROWS: u8 = 2;

/// Width of a rendered status field
pub const FIELD_WIDTH: usize = 15;

/// Trait for character display sinks.
///
/// Writes are cursor-addressed and plain: no scrolling, no line wrapping.
/// Text past the right edge of a row is the sink's problem (the real panel
/// drops it into invisible DDRAM).
pub trait Lcd {
    /// Move the cursor to a column and row.
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), FaroError>;

    /// Write text at the cursor, advancing it.
    fn write(&mut self, text: &str) -> Result<(), FaroError>;

    /// Blank the whole panel and home the cursor.
    fn clear(&mut self) -> Result<(), FaroError>;

    /// Switch the backlight on.
    fn backlight_on(&mut self) -> Result<(), FaroError>;

    /// Switch the backlight off.
    fn backlight_off(&mut self) -> Result<(), FaroError>;

    /// Hide the underline cursor.
    fn cursor_off(&mut self) -> Result<(), FaroError>;

    /// Stop the cursor cell blinking.
    fn blink_off(&mut self) -> Result<(), FaroError>;
}

/// Fit text into a fixed-width field: truncate what overflows, pad what
/// falls short. Counting is by character, not byte, so multi-byte input
/// cannot blow past the field.
pub fn format_field(text: &str, width: usize) -> String {
    let mut field: String = text.chars().take(width).collect();
    let used = field.chars().count();
    field.extend(std::iter::repeat(' ').take(width - used));
    field
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_field_pads_short_text() {
        assert_eq!(format_field("IP: 10.0.0.5", 15), "IP: 10.0.0.5   ");
    }

    #[test]
    fn test_format_field_truncates_long_text() {
        assert_eq!(format_field("HP: waiting for paper", 15), "HP: waiting for");
    }

    #[test]
    fn test_format_field_exact_width_unchanged() {
        assert_eq!(format_field("123456789012345", 15), "123456789012345");
    }

    #[test]
    fn test_format_field_empty_is_all_blanks() {
        assert_eq!(format_field("", 15), " ".repeat(15));
    }

    #[test]
    fn test_format_field_counts_characters_not_bytes() {
        // Four characters, eight bytes; the field must still hold 6.
        assert_eq!(format_field("état", 6), "état  ");
    }
}
