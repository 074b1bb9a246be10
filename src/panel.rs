//! # Status Panel Event Loop
//!
//! The daemon's core: one loop that merges the button queue with two time
//! sources, the autoscroll deadline and the backlight deadline. Each
//! iteration does at most one unit of work, then sleeps 200 ms, which
//! bounds both CPU use and input latency.
//!
//! Per iteration, in priority order:
//!
//! 1. one queued button press, dispatched synchronously;
//! 2. else, if the autoscroll deadline elapsed, one cursor step plus a
//!    render;
//! 3. always last: if the backlight deadline elapsed, the light goes off
//!    and the deadline clears to its unset state, so expiry fires exactly
//!    once.
//!
//! ## Button Bindings
//!
//! | Button     | Action                      |
//! |------------|-----------------------------|
//! | Left/Right | scroll the visible pair     |
//! | One        | single-page scan            |
//! | Two        | autocrop scan               |
//! | Three      | multi-page document scan    |
//! | Four       | multi-page PDF scan         |
//! | Five/Enter | unbound (prompts use them)  |
//!
//! Scan workflows run synchronously on the loop thread; the panel belongs
//! to them until they return. Whatever was pressed in the meantime is
//! discarded on their way out.
//!
//! Autoscroll ping-pongs through the status lines two at a time and speeds
//! up from its 5 s cadence to 1 s while the backlight is lit. A manual
//! scroll pushes the next autoscroll out by a 15 s settle so the loop does
//! not immediately fight the operator's choice.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::buttons::Button;
use crate::display::{FIELD_WIDTH, Lcd, format_field};
use crate::error::FaroError;
use crate::scan::{self, ScanContext, ScanKind, ScanTools};
use crate::status::StatusSource;

/// Pause between loop iterations
const LOOP_TICK: Duration = Duration::from_millis(200);

/// Autoscroll cadence with the backlight off
const SCROLL_INTERVAL: Duration = Duration::from_secs(5);

/// Autoscroll cadence while the backlight is lit
const SCROLL_INTERVAL_LIT: Duration = Duration::from_secs(1);

/// Autoscroll holdoff after a manual scroll
const SCROLL_SETTLE: Duration = Duration::from_secs(15);

/// How long the backlight outlives the event that lit it
const BACKLIGHT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the two-line viewport sits in the status list.
///
/// Invariant: `0 <= index <= len - 2`, so two lines are always visible.
/// Autoscroll ping-pongs: a step over either edge flips `direction` and
/// re-steps instead of leaving the range.
#[derive(Debug, Clone, Copy)]
pub struct ScrollCursor {
    pub index: usize,
    pub direction: i8,
}

impl ScrollCursor {
    /// Start at the top, heading down.
    pub fn new() -> Self {
        Self {
            index: 0,
            direction: 1,
        }
    }

    /// One autoscroll step with ping-pong at `0` and `max`.
    ///
    /// With `max == 0` the index is pinned; only the direction flips.
    pub fn advance(&mut self, max: usize) {
        let mut next = self.index as isize + self.direction as isize;
        if next < 0 || next > max as isize {
            self.direction = -self.direction;
            next = self.index as isize + self.direction as isize;
        }
        if (0..=max as isize).contains(&next) {
            self.index = next as usize;
        }
    }

    /// One manual step, clamped into `[0, max]`.
    pub fn nudge(&mut self, delta: i8, max: usize) {
        let next = self.index as isize + delta as isize;
        self.index = next.clamp(0, max as isize) as usize;
    }
}

impl Default for ScrollCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// The event-loop state, threaded explicitly through every handler.
pub struct Panel<L: Lcd, T: ScanTools> {
    lcd: L,
    lines: Vec<Box<dyn StatusSource>>,
    buttons: Receiver<Button>,
    tools: T,
    scratch: PathBuf,
    store: PathBuf,
    cursor: ScrollCursor,
    scroll_at: Instant,
    backlight_until: Option<Instant>,
}

impl<L: Lcd, T: ScanTools> Panel<L, T> {
    /// Build the panel and put the first pair of lines on the display.
    ///
    /// The backlight starts lit with a full timeout so a service restart
    /// is visible.
    ///
    /// ## Panics
    ///
    /// Panics if fewer than two status lines are supplied; the viewport is
    /// always two rows.
    pub fn new(
        lcd: L,
        lines: Vec<Box<dyn StatusSource>>,
        buttons: Receiver<Button>,
        tools: T,
        scratch: PathBuf,
        store: PathBuf,
    ) -> Result<Self, FaroError> {
        assert!(lines.len() >= 2, "panel needs at least two status lines");

        let now = Instant::now();
        let mut panel = Self {
            lcd,
            lines,
            buttons,
            tools,
            scratch,
            store,
            cursor: ScrollCursor::new(),
            scroll_at: now + SCROLL_INTERVAL_LIT,
            backlight_until: Some(now + BACKLIGHT_TIMEOUT),
        };
        panel.lcd.backlight_on()?;
        panel.render(now)?;
        Ok(panel)
    }

    /// Run forever. Returns only on an error worth dying for.
    pub fn run(&mut self) -> Result<(), FaroError> {
        loop {
            self.step(Instant::now())?;
            thread::sleep(LOOP_TICK);
        }
    }

    /// One loop iteration at a given instant.
    pub fn step(&mut self, now: Instant) -> Result<(), FaroError> {
        match self.buttons.try_recv() {
            Ok(button) => self.dispatch(button, now)?,
            Err(TryRecvError::Empty) => {
                if now >= self.scroll_at {
                    self.autoscroll(now)?;
                }
            }
            Err(TryRecvError::Disconnected) => return Err(FaroError::ButtonsClosed),
        }

        if let Some(deadline) = self.backlight_until {
            if now >= deadline {
                self.lcd.backlight_off()?;
                self.backlight_until = None;
            }
        }

        Ok(())
    }

    fn dispatch(&mut self, button: Button, now: Instant) -> Result<(), FaroError> {
        match button {
            Button::Right => self.scroll(1, now),
            Button::Left => self.scroll(-1, now),
            Button::One => self.workflow(ScanKind::Single, now),
            Button::Two => self.workflow(ScanKind::Autocrop, now),
            Button::Three => self.workflow(ScanKind::Document, now),
            Button::Four => self.workflow(ScanKind::Pdf, now),
            Button::Five | Button::Enter => {
                log::debug!("unbound press: {:?}", button);
                Ok(())
            }
        }
    }

    fn scroll(&mut self, delta: i8, now: Instant) -> Result<(), FaroError> {
        self.cursor.nudge(delta, self.max_index());
        log::debug!(
            "scroll: index={} direction={}",
            self.cursor.index,
            self.cursor.direction
        );
        self.backlight_until = Some(now + BACKLIGHT_TIMEOUT);
        self.lcd.backlight_on()?;
        self.scroll_at = now + SCROLL_SETTLE;
        self.render(now)
    }

    fn autoscroll(&mut self, now: Instant) -> Result<(), FaroError> {
        self.cursor.advance(self.max_index());
        log::debug!(
            "autoscroll: index={} direction={}",
            self.cursor.index,
            self.cursor.direction
        );
        self.render(now)?;
        // Cadence follows the post-render backlight state.
        let interval = if self.backlight_until.is_some() {
            SCROLL_INTERVAL_LIT
        } else {
            SCROLL_INTERVAL
        };
        self.scroll_at = now + interval;
        Ok(())
    }

    fn workflow(&mut self, kind: ScanKind, now: Instant) -> Result<(), FaroError> {
        let mut ctx = ScanContext::new(
            &mut self.lcd,
            &self.buttons,
            &mut self.tools,
            &self.scratch,
            &self.store,
        );
        scan::run(kind, &mut ctx)?;

        // The workflow switched the light off on its way out.
        self.backlight_until = None;
        self.scroll_at = now;
        Ok(())
    }

    /// Read and draw the visible pair. An attention reading re-arms the
    /// backlight before its line is written.
    fn render(&mut self, now: Instant) -> Result<(), FaroError> {
        for row in 0..2 {
            let status = self.lines[self.cursor.index + row as usize].read()?;
            if status.attention {
                self.backlight_until = Some(now + BACKLIGHT_TIMEOUT);
                self.lcd.backlight_on()?;
            }
            self.lcd.set_cursor(0, row)?;
            self.lcd.write(&format_field(&status.text, FIELD_WIDTH))?;
        }
        Ok(())
    }

    fn max_index(&self) -> usize {
        self.lines.len() - 2
    }
}

// ============================================================================
// TESTS
// ============================================================================
