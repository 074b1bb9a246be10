//! # Panel Buttons
//!
//! The PiFace CAD carries eight momentary switches on port A of the
//! expander: five along the front edge and a three-way rocker (left, right,
//! push-in) at the corner. All are wired active-low against the port's
//! pull-ups, so an idle panel reads 0xFF.
//!
//! A listener thread samples the port every 20 ms and turns falling edges
//! into [`Button`] values on an unbounded queue. Holding a switch produces
//! exactly one event; the next one needs a release first. The sample period
//! also swallows contact bounce, which on these domes is over within a few
//! milliseconds.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crate::error::FaroError;
use crate::expander::Mcp23s17;

/// Switch port sample interval
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One panel switch.
///
/// | Port A bit | Button  | Position        |
/// |------------|---------|-----------------|
/// | 0          | `One`   | front edge      |
/// | 1          | `Two`   | front edge      |
/// | 2          | `Three` | front edge      |
/// | 3          | `Four`  | front edge      |
/// | 4          | `Five`  | front edge      |
/// | 5          | `Enter` | rocker, push-in |
/// | 6          | `Left`  | rocker, left    |
/// | 7          | `Right` | rocker, right   |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    One,
    Two,
    Three,
    Four,
    Five,
    Enter,
    Left,
    Right,
}

impl Button {
    /// Bit position on the switch port.
    pub fn bit(self) -> u8 {
        self as u8
    }

    /// Map a switch-port bit back to its button.
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Button::One),
            1 => Some(Button::Two),
            2 => Some(Button::Three),
            3 => Some(Button::Four),
            4 => Some(Button::Five),
            5 => Some(Button::Enter),
            6 => Some(Button::Left),
            7 => Some(Button::Right),
            _ => None,
        }
    }
}

/// Falling edges between two samples of an active-low port: bits that read
/// high (released) last time and low (pressed) now.
#[inline]
pub fn pressed_edges(previous: u8, current: u8) -> u8 {
    previous & !current
}

/// Spawn the listener thread.
///
/// Presses arrive on the returned channel in the order the poll saw them.
/// The queue is unbounded, so presses made while the consumer is busy (a
/// scan run, say) are kept, not dropped; whether to honor or discard them
/// is the consumer's call.
///
/// The thread exits when the receiver is dropped or the switch port stops
/// answering; either way the channel disconnects, which the consumer sees
/// as [`FaroError::ButtonsClosed`].
pub fn listen(port: Mcp23s17) -> Result<Receiver<Button>, FaroError> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("buttons".to_string())
        .spawn(move || poll_loop(port, tx))?;
    Ok(rx)
}

fn poll_loop(port: Mcp23s17, tx: Sender<Button>) {
    let mut previous = match port.read_switches() {
        Ok(sample) => sample,
        Err(e) => {
            log::error!("button poll failed: {}", e);
            return;
        }
    };

    loop {
        thread::sleep(POLL_INTERVAL);

        let current = match port.read_switches() {
            Ok(sample) => sample,
            Err(e) => {
                log::error!("button poll failed: {}", e);
                return;
            }
        };

        let edges = pressed_edges(previous, current);
        previous = current;

        for bit in 0..8 {
            if edges & (1 << bit) != 0 {
                if let Some(button) = Button::from_bit(bit) {
                    log::debug!("press: {:?}", button);
                    if tx.send(button).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
