//! # Scan Workflows
//!
//! Four button-bound ways to get paper off the flatbed:
//!
//! | Button | Variant    | Pages | Produces              |
//! |--------|------------|-------|-----------------------|
//! | One    | `Single`   | 1     | `<stamp>.png`         |
//! | Two    | `Autocrop` | 1     | `<stamp>.png`, trimmed|
//! | Three  | `Document` | `n`   | `<stamp>-<i>.png` each|
//! | Four   | `Pdf`      | `n`   | `<stamp>.pdf`         |
//!
//! All four share one page-acquisition machine: scan a page, then (for the
//! multi-page variants) hold on the button queue asking for more or done.
//! What differs per variant is the conversion recipe and whether pages are
//! stored one by one or bundled into a PDF at the end.
//!
//! A workflow owns the panel for its whole run. It runs synchronously on
//! the loop thread, turns the backlight on at entry and off at exit, and
//! discards every button press made while it was busy so a nervous
//! operator cannot queue up five more scans.
//!
//! Failures of the external tools are shown on the panel, held for a few
//! seconds, and end the workflow; nothing is retried. Raw captures and
//! intermediate images are deleted as each page is finalized. Pages left
//! behind by a mid-session failure stay in the scratch directory.

pub mod convert;
pub mod tools;

pub use convert::ConvertSpec;
pub use tools::{SaneTools, ScanTools};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::buttons::Button;
use crate::display::{FIELD_WIDTH, Lcd, format_field};
use crate::error::FaroError;

/// Hold time for error screens
const ERROR_HOLD: Duration = Duration::from_secs(3);

/// Hold time for the completion screen
const DONE_HOLD: Duration = Duration::from_secs(2);

/// Session stamp layout, second resolution
const STAMP_FORMAT: &str = "%y%m%d%H%M%S";

/// Key legend shown while the prompt waits
const PROMPT_KEYS: &str = "5:more ENT:done";

/// One of the four workflow variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    Single,
    Autocrop,
    Document,
    Pdf,
}

impl ScanKind {
    /// Whether acquisition prompts for more pages.
    pub fn multi_page(self) -> bool {
        matches!(self, ScanKind::Document | ScanKind::Pdf)
    }

    /// Conversion recipe for this variant's pages.
    pub fn page_spec(self) -> ConvertSpec {
        match self {
            ScanKind::Single => convert::SINGLE,
            ScanKind::Autocrop => convert::AUTOCROP,
            ScanKind::Document => convert::DOCUMENT,
            ScanKind::Pdf => convert::PDF_PAGE,
        }
    }
}

/// Ephemeral per-workflow state. One wall-clock stamp names every file the
/// session touches, raw or final, so a session's leftovers are grepable.
pub struct ScanSession {
    stamp: String,
    scratch: PathBuf,
}

impl ScanSession {
    /// Start a session stamped with the current time.
    pub fn begin(scratch: &Path) -> Self {
        Self::with_stamp(scratch, Local::now().format(STAMP_FORMAT).to_string())
    }

    /// Start a session with a fixed stamp. Tests pin filenames this way.
    pub fn with_stamp(scratch: &Path, stamp: impl Into<String>) -> Self {
        Self {
            stamp: stamp.into(),
            scratch: scratch.to_path_buf(),
        }
    }

    /// The session's timestamp string.
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// Raw capture path for a page.
    pub fn raw_page(&self, page: u32) -> PathBuf {
        self.scratch.join(format!("{}-{}.pnm", self.stamp, page))
    }

    /// File name for a single-shot artifact.
    pub fn single_name(&self, ext: &str) -> String {
        format!("{}.{}", self.stamp, ext)
    }

    /// File name for one page's artifact.
    pub fn page_name(&self, page: u32, ext: &str) -> String {
        format!("{}-{}.{}", self.stamp, page, ext)
    }

    /// Scratch-side path for a named artifact.
    pub fn scratch_file(&self, name: &str) -> PathBuf {
        self.scratch.join(name)
    }
}

/// Everything a workflow borrows from the panel for its run.
pub struct ScanContext<'a, L: Lcd, T: ScanTools> {
    pub lcd: &'a mut L,
    pub buttons: &'a Receiver<Button>,
    pub tools: &'a mut T,
    pub scratch: &'a Path,
    pub store: &'a Path,
    /// How long error screens stay up
    pub error_hold: Duration,
    /// How long the completion screen stays up
    pub done_hold: Duration,
}

impl<'a, L: Lcd, T: ScanTools> ScanContext<'a, L, T> {
    pub fn new(
        lcd: &'a mut L,
        buttons: &'a Receiver<Button>,
        tools: &'a mut T,
        scratch: &'a Path,
        store: &'a Path,
    ) -> Self {
        Self {
            lcd,
            buttons,
            tools,
            scratch,
            store,
            error_hold: ERROR_HOLD,
            done_hold: DONE_HOLD,
        }
    }
}

/// Run one workflow start to finish.
pub fn run<L: Lcd, T: ScanTools>(
    kind: ScanKind,
    ctx: &mut ScanContext<'_, L, T>,
) -> Result<(), FaroError> {
    log::info!("scan workflow start: {:?}", kind);
    ctx.lcd.backlight_on()?;
    ctx.lcd.clear()?;

    let result = execute(kind, ctx);

    // Presses made mid-workflow must not fire actions afterwards.
    while ctx.buttons.try_recv().is_ok() {}

    let light = ctx.lcd.backlight_off();
    result.and(light)
}

fn execute<L: Lcd, T: ScanTools>(
    kind: ScanKind,
    ctx: &mut ScanContext<'_, L, T>,
) -> Result<(), FaroError> {
    let session = ScanSession::begin(ctx.scratch);
    let pages = acquire(ctx, &session, kind.multi_page())?;

    if pages == 0 {
        log::info!("scan workflow ended with no pages");
        return Ok(());
    }

    match kind {
        ScanKind::Single | ScanKind::Autocrop | ScanKind::Document => {
            copy_each(ctx, &session, kind, pages)
        }
        ScanKind::Pdf => bundle_pdf(ctx, &session, pages),
    }
}

/// The shared page-acquisition machine.
///
/// Returns the number of pages captured. A capture failure ends the
/// session at the previous page; zero means nothing usable was scanned.
/// The session is never resumed and the failed page is never retried.
fn acquire<L: Lcd, T: ScanTools>(
    ctx: &mut ScanContext<'_, L, T>,
    session: &ScanSession,
    multi: bool,
) -> Result<u32, FaroError> {
    let mut page: u32 = 1;

    loop {
        if multi {
            show(ctx.lcd, 0, &format!("Scan page {}", page))?;
        } else {
            show(ctx.lcd, 0, "Scanning")?;
            show(ctx.lcd, 1, session.stamp())?;
        }

        if let Err(err) = ctx.tools.capture(&session.raw_page(page)) {
            log::warn!("capture failed on page {}: {}", page, err);
            show(ctx.lcd, 0, "SCAN ERROR")?;
            thread::sleep(ctx.error_hold);
            return Ok(page - 1);
        }

        if !multi {
            return Ok(page);
        }

        show(ctx.lcd, 0, &format!("{} pages scanned", page))?;
        show(ctx.lcd, 1, PROMPT_KEYS)?;
        loop {
            match ctx.buttons.recv() {
                Ok(Button::Five) => {
                    page += 1;
                    break;
                }
                Ok(Button::Enter) => return Ok(page),
                // Anything else during the prompt is ignored.
                Ok(_) => {}
                Err(_) => return Err(FaroError::ButtonsClosed),
            }
        }
    }
}

/// Convert and store each page as its own image.
fn copy_each<L: Lcd, T: ScanTools>(
    ctx: &mut ScanContext<'_, L, T>,
    session: &ScanSession,
    kind: ScanKind,
    pages: u32,
) -> Result<(), FaroError> {
    let spec = kind.page_spec();

    for page in 1..=pages {
        show(ctx.lcd, 0, "Convert")?;
        let raw = session.raw_page(page);
        let name = if kind.multi_page() {
            session.page_name(page, spec.ext)
        } else {
            session.single_name(spec.ext)
        };
        let converted = session.scratch_file(&name);

        if let Err(err) = ctx.tools.convert(&spec, &raw, &converted) {
            log::warn!("convert failed on page {}: {}", page, err);
            show(ctx.lcd, 0, "CONVERT ERROR")?;
            thread::sleep(ctx.error_hold);
            return Ok(());
        }

        fs::copy(&converted, ctx.store.join(&name))?;
        fs::remove_file(&raw)?;
        fs::remove_file(&converted)?;
    }

    show(ctx.lcd, 0, "Complete")?;
    thread::sleep(ctx.done_hold);
    Ok(())
}

/// Convert every page to JPEG, then assemble one PDF in the store.
fn bundle_pdf<L: Lcd, T: ScanTools>(
    ctx: &mut ScanContext<'_, L, T>,
    session: &ScanSession,
    pages: u32,
) -> Result<(), FaroError> {
    let spec = convert::PDF_PAGE;
    let mut sheets: Vec<PathBuf> = Vec::with_capacity(pages as usize);

    for page in 1..=pages {
        show(ctx.lcd, 0, "Convert")?;
        let raw = session.raw_page(page);
        let sheet = session.scratch_file(&session.page_name(page, spec.ext));

        if let Err(err) = ctx.tools.convert(&spec, &raw, &sheet) {
            log::warn!("convert failed on page {}: {}", page, err);
            show(ctx.lcd, 0, "CONVERT ERROR")?;
            thread::sleep(ctx.error_hold);
            return Ok(());
        }

        fs::remove_file(&raw)?;
        sheets.push(sheet);
    }

    show(ctx.lcd, 0, "PDF")?;
    let pdf = ctx.store.join(session.single_name("pdf"));
    let outcome = ctx.tools.assemble(&sheets, &pdf);

    // Sheets go regardless of the assembly outcome.
    for sheet in &sheets {
        fs::remove_file(sheet)?;
    }

    match outcome {
        Ok(()) => {
            show(ctx.lcd, 0, "Complete")?;
            thread::sleep(ctx.done_hold);
            Ok(())
        }
        Err(err) => {
            log::warn!("pdf assembly failed: {}", err);
            show(ctx.lcd, 0, "PDF ERROR")?;
            thread::sleep(ctx.error_hold);
            Ok(())
        }
    }
}

/// Put one field-fitted message on a row.
fn show<L: Lcd>(lcd: &mut L, row: u8, text: &str) -> Result<(), FaroError> {
    lcd.set_cursor(0, row)?;
    lcd.write(&format_field(text, FIELD_WIDTH))
}

// ============================================================================
// TESTS
// ============================================================================
