//! # PiFace CAD Display Driver
//!
//! Drives the board's 16x2 HD44780 panel through port B of the MCP23S17.
//!
//! ## Port B Wiring
//!
//! | Bit | Line      |
//! |-----|-----------|
//! | 0-3 | D4-D7     |
//! | 4   | E strobe  |
//! | 5   | R/W       |
//! | 6   | RS        |
//! | 7   | Backlight |
//!
//! R/W is held low permanently: the driver never reads the busy flag, it
//! waits out the datasheet execution times instead. That makes every
//! instruction three port writes (lines set, E high, E low) and a short
//! sleep.
//!
//! ## 4-Bit Bus
//!
//! With only four data lines each byte goes out as two nibbles, high half
//! first. The init dance knocks the controller into 4-bit mode from
//! whatever state a warm restart left it in by sending `0x3` three times
//! (forcing 8-bit mode) before dropping to 4-bit.

use std::thread;
use std::time::Duration;

use crate::display::Lcd;
use crate::error::FaroError;
use crate::expander::{GPIOB, Mcp23s17};
use crate::protocol::hd44780;

/// Port B bit for the E strobe
const PIN_ENABLE: u8 = 0x10;

/// Port B bit for register select (high = character data)
const PIN_RS: u8 = 0x40;

/// Port B bit for the backlight transistor
const PIN_BACKLIGHT: u8 = 0x80;

/// Settle time after ordinary instructions (datasheet says ~37 µs)
const SETTLE: Duration = Duration::from_micros(50);

/// Settle time after clear and home (datasheet says ~1.52 ms)
const SLOW_SETTLE: Duration = Duration::from_millis(3);

/// Map a character onto the controller's ASCII page. Anything it cannot
/// show becomes a blank rather than CGROM garbage.
fn displayable(ch: char) -> u8 {
    if ch.is_ascii() && !ch.is_ascii_control() {
        ch as u8
    } else {
        b' '
    }
}

/// # PiFace CAD Panel
///
/// ## Example
///
/// ```no_run
/// use std::sync::{Arc, Mutex};
/// use faro::display::{Lcd, PiFaceLcd};
/// use faro::expander::Mcp23s17;
/// use faro::transport::Spi;
///
/// let spi = Arc::new(Mutex::new(Spi::open_default()?));
/// let chip = Mcp23s17::new(spi);
/// chip.init()?;
///
/// let mut lcd = PiFaceLcd::new(chip);
/// lcd.init()?;
/// lcd.write("hello")?;
///
/// # Ok::<(), faro::error::FaroError>(())
/// ```
pub struct PiFaceLcd {
    port: Mcp23s17,
    backlight: bool,
    cursor: bool,
    blink: bool,
}

impl PiFaceLcd {
    /// Wrap an expander handle. The panel is not usable until [`init`]
    /// has run the 4-bit dance.
    ///
    /// [`init`]: PiFaceLcd::init
    pub fn new(port: Mcp23s17) -> Self {
        Self {
            port,
            backlight: false,
            cursor: false,
            blink: false,
        }
    }

    /// Run the init-by-instruction sequence from the HD44780 datasheet.
    ///
    /// Safe to call on a controller in any state, including one stranded
    /// mid-nibble by a killed process.
    pub fn init(&mut self) -> Result<(), FaroError> {
        thread::sleep(Duration::from_millis(15));

        // Force 8-bit mode three times, then drop to 4-bit.
        self.write_nibble(0x03, false)?;
        thread::sleep(Duration::from_millis(5));
        self.write_nibble(0x03, false)?;
        thread::sleep(Duration::from_millis(1));
        self.write_nibble(0x03, false)?;
        thread::sleep(Duration::from_millis(1));
        self.write_nibble(0x02, false)?;
        thread::sleep(Duration::from_millis(1));

        self.command(hd44780::function_set(false, true))?;
        self.apply_display_control()?;
        self.command(hd44780::entry_mode(true, false))?;
        self.clear()
    }

    /// Send an instruction byte and wait out its execution time.
    fn command(&mut self, instruction: u8) -> Result<(), FaroError> {
        self.send(instruction, false)?;
        if instruction == hd44780::CLEAR_DISPLAY || instruction == hd44780::RETURN_HOME {
            thread::sleep(SLOW_SETTLE);
        }
        Ok(())
    }

    /// Send a character byte into DDRAM.
    fn data(&mut self, byte: u8) -> Result<(), FaroError> {
        self.send(byte, true)
    }

    fn send(&mut self, byte: u8, rs: bool) -> Result<(), FaroError> {
        self.write_nibble(byte >> 4, rs)?;
        self.write_nibble(byte & 0x0F, rs)?;
        thread::sleep(SETTLE);
        Ok(())
    }

    /// Put a nibble on D4-D7 and strobe E. The port byte is rebuilt from
    /// scratch each time so the backlight bit rides along unchanged.
    fn write_nibble(&mut self, nibble: u8, rs: bool) -> Result<(), FaroError> {
        let mut lines = nibble & 0x0F;
        if rs {
            lines |= PIN_RS;
        }
        if self.backlight {
            lines |= PIN_BACKLIGHT;
        }
        self.port.write_register(GPIOB, lines)?;
        self.port.write_register(GPIOB, lines | PIN_ENABLE)?;
        // Falling edge latches the nibble.
        self.port.write_register(GPIOB, lines)?;
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), FaroError> {
        self.backlight = on;
        // E is low between transfers, so rewriting the whole port is safe.
        let lines = if on { PIN_BACKLIGHT } else { 0x00 };
        self.port.write_register(GPIOB, lines)
    }

    fn apply_display_control(&mut self) -> Result<(), FaroError> {
        self.command(hd44780::display_control(true, self.cursor, self.blink))
    }
}

impl super::Lcd for PiFaceLcd {
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), FaroError> {
        self.command(hd44780::ddram_addr(col, row))
    }

    fn write(&mut self, text: &str) -> Result<(), FaroError> {
        for ch in text.chars() {
            self.data(displayable(ch))?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), FaroError> {
        self.command(hd44780::CLEAR_DISPLAY)
    }

    fn backlight_on(&mut self) -> Result<(), FaroError> {
        self.set_backlight(true)
    }

    fn backlight_off(&mut self) -> Result<(), FaroError> {
        self.set_backlight(false)
    }

    fn cursor_off(&mut self) -> Result<(), FaroError> {
        self.cursor = false;
        self.apply_display_control()
    }

    fn blink_off(&mut self) -> Result<(), FaroError> {
        self.blink = false;
        self.apply_display_control()
    }
}

// ============================================================================
// TESTS
// ============================================================================
