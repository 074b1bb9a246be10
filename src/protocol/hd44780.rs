//! # HD44780 Instruction Set
//!
//! This module builds the single-byte instructions understood by the
//! HD44780U character LCD controller (and its many clones) that sits on the
//! PiFace CAD board.
//!
//! ## Protocol Overview
//!
//! Every instruction is one byte whose high bit(s) select the command and
//! whose low bits carry flags. The controller distinguishes instructions
//! from character data by the RS line, which the display driver raises only
//! for writes into DDRAM.
//!
//! | Instruction          | Pattern     | Execution time |
//! |----------------------|-------------|----------------|
//! | Clear display        | `0000 0001` | ~1.52 ms       |
//! | Return home          | `0000 001x` | ~1.52 ms       |
//! | Entry mode set       | `0000 01IS` | ~37 µs         |
//! | Display control      | `0000 1DCB` | ~37 µs         |
//! | Function set         | `001D NFxx` | ~37 µs         |
//! | Set DDRAM address    | `1AAA AAAA` | ~37 µs         |
//!
//! The two long-running instructions matter: the driver must hold off for
//! about 2 ms after a clear or home, where everything else settles in tens
//! of microseconds.
//!
//! ## DDRAM Layout
//!
//! The 16x2 panel maps row 0 to DDRAM address 0x00 and row 1 to 0x40. The
//! rows are not contiguous; text written past column 15 lands in invisible
//! DDRAM rather than wrapping.
//!
//! ## Reference
//!
//! Hitachi HD44780U datasheet (ADE-207-272(Z), '99.9, Rev. 0.0).

// ============================================================================
// INSTRUCTION BASE PATTERNS
// ============================================================================

/// Clear display: wipe DDRAM and move the cursor home.
///
/// One of the two slow instructions; allow ~2 ms before the next transfer.
pub const CLEAR_DISPLAY: u8 = 0x01;

/// Return home: move the cursor to address 0 without touching DDRAM.
///
/// As slow as a clear; allow ~2 ms.
pub const RETURN_HOME: u8 = 0x02;

/// Entry mode set base pattern (cursor move direction, display shift)
pub const ENTRY_MODE_SET: u8 = 0x04;

/// Display control base pattern (display, cursor, blink enables)
pub const DISPLAY_CONTROL: u8 = 0x08;

/// Function set base pattern (bus width, display lines, font)
pub const FUNCTION_SET: u8 = 0x20;

/// Set DDRAM address base pattern (cursor position)
pub const SET_DDRAM_ADDR: u8 = 0x80;

// ============================================================================
// FLAG BITS
// ============================================================================

/// Entry mode: increment the address counter after each write
pub const ENTRY_INCREMENT: u8 = 0x02;

/// Entry mode: shift the whole display instead of the cursor
pub const ENTRY_SHIFT: u8 = 0x01;

/// Display control: display visible
pub const DISPLAY_ON: u8 = 0x04;

/// Display control: underline cursor visible
pub const CURSOR_ON: u8 = 0x02;

/// Display control: cursor cell blinking
pub const BLINK_ON: u8 = 0x01;

/// Function set: 8-bit bus (absent means 4-bit)
pub const EIGHT_BIT_BUS: u8 = 0x10;

/// Function set: two display lines
pub const TWO_LINES: u8 = 0x08;

/// DDRAM base address of each display row
pub const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

// ============================================================================
// INSTRUCTION BUILDERS
// ============================================================================

/// # Entry Mode Set (0000 01IS)
///
/// Chooses what happens to the address counter after each DDRAM write.
///
/// ## Parameters
///
/// - `increment`: advance the cursor left-to-right (the latin-script mode)
/// - `shift`: scroll the display window instead of moving the cursor
#[inline]
pub fn entry_mode(increment: bool, shift: bool) -> u8 {
    let mut cmd = ENTRY_MODE_SET;
    if increment {
        cmd |= ENTRY_INCREMENT;
    }
    if shift {
        cmd |= ENTRY_SHIFT;
    }
    cmd
}

/// # Display Control (0000 1DCB)
///
/// Switches the display, underline cursor and blink on or off in one
/// instruction; the controller has no per-flag commands.
#[inline]
pub fn display_control(display: bool, cursor: bool, blink: bool) -> u8 {
    let mut cmd = DISPLAY_CONTROL;
    if display {
        cmd |= DISPLAY_ON;
    }
    if cursor {
        cmd |= CURSOR_ON;
    }
    if blink {
        cmd |= BLINK_ON;
    }
    cmd
}

/// # Function Set (001D NFxx)
///
/// Fixes the bus width and row count. Sent during the init dance and never
/// again; the controller cannot change bus width once running.
#[inline]
pub fn function_set(eight_bit_bus: bool, two_lines: bool) -> u8 {
    let mut cmd = FUNCTION_SET;
    if eight_bit_bus {
        cmd |= EIGHT_BIT_BUS;
    }
    if two_lines {
        cmd |= TWO_LINES;
    }
    cmd
}

/// # Set DDRAM Address (1AAA AAAA)
///
/// Moves the cursor to `col` on `row`. Rows beyond the panel wrap onto the
/// two real rows rather than addressing garbage.
#[inline]
pub fn ddram_addr(col: u8, row: u8) -> u8 {
    let row = (row as usize) % ROW_OFFSETS.len();
    SET_DDRAM_ADDR | (ROW_OFFSETS[row].wrapping_add(col) & 0x7F)
}

// ============================================================================
// TESTS
// ============================================================================
