//! # Boot Screens
//!
//! Two small modes that borrow the panel outside normal service:
//!
//! - [`follow`] tails a FIFO fed by the boot logger and mirrors each line
//!   on the display's second row, so a headless Pi shows its boot progress.
//! - [`splash`] holds a "system is up" banner for a few seconds, the last
//!   thing the init sequence does before the status daemon takes over.
//!
//! The FIFO (`/piface/lcd-booting.input` by default) is created by the
//! init script, not here. Boot-logger lines arrive with a timestamp
//! prefix, an optional `[.....]` progress blob, and caret-encoded console
//! escapes; all three are stripped before the line hits the panel.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::display::{LCD_COLS, Lcd, format_field};
use crate::error::FaroError;

/// Default FIFO the boot logger writes into
pub const BOOT_FIFO: &str = "/piface/lcd-booting.input";

/// How long the up banner stays before the light goes out
const SPLASH_HOLD: Duration = Duration::from_secs(3);

/// Show the system-up banner, hold it, and leave the panel dark.
pub fn splash<L: Lcd>(lcd: &mut L) -> Result<(), FaroError> {
    lcd.backlight_on()?;
    lcd.clear()?;
    lcd.set_cursor(0, 0)?;
    lcd.write("System is UP")?;
    lcd.set_cursor(0, 1)?;
    lcd.write("Status loading.")?;
    thread::sleep(SPLASH_HOLD);
    lcd.backlight_off()
}

/// Mirror boot-log lines on the panel until killed.
///
/// Opening a FIFO blocks until a writer appears, and reading hits EOF when
/// the writer closes it; the loop reopens and keeps following, so several
/// boot stages can write one after another.
pub fn follow<L: Lcd>(lcd: &mut L, fifo: &Path) -> Result<(), FaroError> {
    lcd.backlight_on()?;
    lcd.clear()?;
    lcd.set_cursor(0, 0)?;
    lcd.write("Booting...")?;

    loop {
        let reader = BufReader::new(File::open(fifo)?);
        for line in reader.lines() {
            let cleaned = clean_boot_line(&line?);
            lcd.set_cursor(0, 1)?;
            lcd.write(&format_field(&cleaned, LCD_COLS as usize))?;
        }
    }
}

/// Strip the boot logger's decorations off one line.
pub fn clean_boot_line(line: &str) -> String {
    strip_console_codes(strip_stamp_prefix(line))
}

/// Drop the `<a>:<b>:<c>:` stamp prefix along with an optional ` [...] `
/// progress blob after it. Lines without three colon-terminated segments
/// pass through untouched.
fn strip_stamp_prefix(line: &str) -> &str {
    let mut rest = line;
    for _ in 0..3 {
        match rest.find(':') {
            Some(pos) if pos > 0 => rest = &rest[pos + 1..],
            _ => return line,
        }
    }

    if let Some(after) = rest.strip_prefix(" [") {
        if let Some(end) = after.find("] ") {
            let blob = &after[..end];
            if !blob.is_empty() && blob.bytes().all(|b| b == b'.') {
                return &after[end + 2..];
            }
        }
    }
    rest
}

/// Remove caret-encoded console escapes the way the boot logger writes
/// them: `^[[?<n>l/c/m/h`, `^[[<n>G/m/;` (with an optional `<n>m` color
/// continuation), and bare `^[<n>`.
fn strip_console_codes(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '^' && chars.get(i + 1) == Some(&'[') {
            if let Some(len) = escape_len(&chars[i..]) {
                i += len;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Length of the escape starting at `chars[0] == '^'`, or `None` if the
/// carets turn out to be ordinary text.
fn escape_len(chars: &[char]) -> Option<usize> {
    let digits = |mut at: usize| {
        while matches!(chars.get(at), Some(c) if c.is_ascii_digit()) {
            at += 1;
        }
        at
    };

    let mut i = 2;
    if chars.get(i) != Some(&'[') {
        // Bare form: ^[<n>
        let end = digits(i);
        return (end > i).then_some(end);
    }
    i += 1;

    if chars.get(i) == Some(&'?') {
        // Private mode: ^[[?<n> plus one command letter
        let end = digits(i + 1);
        if end == i + 1 {
            return None;
        }
        return match chars.get(end) {
            Some('l' | 'c' | 'm' | 'h') => Some(end + 1),
            _ => None,
        };
    }

    // Numbered form: ^[[<n> plus G, m or ;
    let end = digits(i);
    if end == i {
        return None;
    }
    match chars.get(end) {
        Some('G' | 'm' | ';') => {
            let mut tail = end + 1;
            if chars.get(tail) == Some(&'[') {
                tail += 1;
            }
            // Optional color continuation <n>m
            let cont = digits(tail);
            if cont > tail && chars.get(cont) == Some(&'m') {
                tail = cont + 1;
            }
            Some(tail)
        }
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stamp_and_progress_blob_are_stripped() {
        let line = "Tue Aug 12 10:15:04 2026: [.....] Starting kernel log daemon";
        assert_eq!(clean_boot_line(line), "Starting kernel log daemon");
    }

    #[test]
    fn test_stamp_without_blob_keeps_the_message() {
        let line = "Tue Aug 12 10:15:04 2026: Setting the system clock";
        assert_eq!(clean_boot_line(line), " Setting the system clock");
    }

    #[test]
    fn test_short_lines_pass_through() {
        assert_eq!(clean_boot_line("no stamps here"), "no stamps here");
        assert_eq!(clean_boot_line(""), "");
    }

    #[test]
    fn test_non_dot_brackets_are_not_a_progress_blob() {
        let line = "a:b:c: [ ok ] mounting filesystems";
        assert_eq!(clean_boot_line(line), " [ ok ] mounting filesystems");
    }

    #[test]
    fn test_cursor_and_column_escapes_vanish() {
        assert_eq!(strip_console_codes("^[[?25l^[[1GLoading"), "Loading");
    }

    #[test]
    fn test_color_escape_with_continuation_vanishes() {
        assert_eq!(strip_console_codes("^[[0;32mdone^[9"), "done");
    }

    #[test]
    fn test_plain_carets_survive() {
        assert_eq!(strip_console_codes("^ caret ^[ alone"), "^ caret ^[ alone");
    }

    #[test]
    fn test_full_bootlogd_line() {
        let line = "Tue Aug 12 10:15:04 2026: [....] ^[[?25l^[[1GRaising network interfaces";
        assert_eq!(clean_boot_line(line), "Raising network interfaces");
    }
}
