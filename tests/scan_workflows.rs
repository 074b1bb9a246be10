//! # Scan Workflow Tests
//!
//! End-to-end runs of the four scan workflows against a fake tool set and
//! real temp directories. The fakes write real files, so every copy and
//! cleanup step in the workflows runs against the actual filesystem.
//!
//! ## Test Coverage
//!
//! - **Happy paths**: each variant delivers its artifacts to the store
//!   and leaves the scratch directory empty.
//! - **Failure paths**: capture, convert, and assembly failures show
//!   their error screens, keep the work already finished, and leave
//!   unfinished pages in scratch for inspection.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use faro::buttons::Button;
use faro::display::Lcd;
use faro::error::FaroError;
use faro::scan::convert::{AUTOCROP, DOCUMENT, PDF_PAGE, SINGLE};
use faro::scan::{self, ConvertSpec, ScanContext, ScanKind, ScanTools};

// ============================================================================
// TEST DOUBLES
// ============================================================================

/// Records panel traffic instead of driving hardware.
#[derive(Default)]
struct MockLcd {
    ops: Vec<String>,
}

impl Lcd for MockLcd {
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), FaroError> {
        self.ops.push(format!("cursor {},{}", col, row));
        Ok(())
    }
    fn write(&mut self, text: &str) -> Result<(), FaroError> {
        self.ops.push(format!("write {}", text.trim_end()));
        Ok(())
    }
    fn clear(&mut self) -> Result<(), FaroError> {
        self.ops.push("clear".to_string());
        Ok(())
    }
    fn backlight_on(&mut self) -> Result<(), FaroError> {
        self.ops.push("backlight on".to_string());
        Ok(())
    }
    fn backlight_off(&mut self) -> Result<(), FaroError> {
        self.ops.push("backlight off".to_string());
        Ok(())
    }
    fn cursor_off(&mut self) -> Result<(), FaroError> {
        Ok(())
    }
    fn blink_off(&mut self) -> Result<(), FaroError> {
        Ok(())
    }
}

impl MockLcd {
    fn wrote(&self, needle: &str) -> bool {
        self.ops.iter().any(|op| op == &format!("write {}", needle))
    }
}

/// Stand-in for scanimage and convert that manipulates real files.
///
/// Captures write a fake PNM, conversions write a fake image, assembly
/// writes a fake PDF. Each call is recorded, and any step can be told
/// to fail instead.
#[derive(Default)]
struct FakeTools {
    captures: Vec<PathBuf>,
    converts: Vec<(ConvertSpec, PathBuf, PathBuf)>,
    assemblies: Vec<(usize, PathBuf)>,
    fail_capture_on: Option<usize>,
    fail_convert_on: Option<usize>,
    fail_assemble: bool,
}

impl ScanTools for FakeTools {
    fn capture(&mut self, raw: &Path) -> Result<(), FaroError> {
        self.captures.push(raw.to_path_buf());
        if self.fail_capture_on == Some(self.captures.len()) {
            return Err(FaroError::Command("scanimage exited with 1".to_string()));
        }
        fs::write(raw, b"P4 fake page").unwrap();
        Ok(())
    }

    fn convert(
        &mut self,
        spec: &ConvertSpec,
        input: &Path,
        output: &Path,
    ) -> Result<(), FaroError> {
        self.converts
            .push((*spec, input.to_path_buf(), output.to_path_buf()));
        if self.fail_convert_on == Some(self.converts.len()) {
            return Err(FaroError::Command("convert exited with 1".to_string()));
        }
        assert!(
            input.exists(),
            "convert input should exist: {}",
            input.display()
        );
        fs::write(output, b"converted").unwrap();
        Ok(())
    }

    fn assemble(&mut self, sheets: &[PathBuf], pdf: &Path) -> Result<(), FaroError> {
        self.assemblies.push((sheets.len(), pdf.to_path_buf()));
        if self.fail_assemble {
            return Err(FaroError::Command("convert exited with 1".to_string()));
        }
        for sheet in sheets {
            assert!(
                sheet.exists(),
                "pdf sheet should exist: {}",
                sheet.display()
            );
        }
        fs::write(pdf, b"%PDF-1.4 fake").unwrap();
        Ok(())
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Context with the screen-hold sleeps zeroed out.
fn workflow_ctx<'a>(
    lcd: &'a mut MockLcd,
    buttons: &'a Receiver<Button>,
    tools: &'a mut FakeTools,
    scratch: &'a Path,
    store: &'a Path,
) -> ScanContext<'a, MockLcd, FakeTools> {
    let mut ctx = ScanContext::new(lcd, buttons, tools, scratch, store);
    ctx.error_hold = Duration::ZERO;
    ctx.done_hold = Duration::ZERO;
    ctx
}

/// Sorted file names in a directory.
fn names_in(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// SINGLE-PAGE WORKFLOWS
// ============================================================================

#[test]
fn test_single_scan_delivers_one_png() {
    let scratch = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let mut lcd = MockLcd::default();
    let (_tx, rx) = mpsc::channel();
    let mut tools = FakeTools::default();

    let mut ctx = workflow_ctx(&mut lcd, &rx, &mut tools, scratch.path(), store.path());
    scan::run(ScanKind::Single, &mut ctx).unwrap();

    let delivered = names_in(&store);
    assert_eq!(delivered.len(), 1, "store: {:?}", delivered);
    assert!(delivered[0].ends_with(".png"));
    assert!(
        !delivered[0].contains('-'),
        "single shots are named by stamp alone: {:?}",
        delivered
    );

    assert!(names_in(&scratch).is_empty(), "scratch should be clean");
    assert_eq!(tools.captures.len(), 1);
    assert_eq!(tools.converts.len(), 1);
    assert_eq!(tools.converts[0].0, SINGLE);
    assert!(tools.assemblies.is_empty());
    assert!(lcd.wrote("Complete"));
}

#[test]
fn test_autocrop_scan_uses_the_trim_recipe() {
    let scratch = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let mut lcd = MockLcd::default();
    let (_tx, rx) = mpsc::channel();
    let mut tools = FakeTools::default();

    let mut ctx = workflow_ctx(&mut lcd, &rx, &mut tools, scratch.path(), store.path());
    scan::run(ScanKind::Autocrop, &mut ctx).unwrap();

    assert_eq!(tools.converts.len(), 1);
    assert_eq!(tools.converts[0].0, AUTOCROP);
    assert_eq!(tools.converts[0].0.trim_fuzz, Some(30));

    let delivered = names_in(&store);
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].ends_with(".png"));
}

// ============================================================================
// MULTI-PAGE WORKFLOWS
// ============================================================================

#[test]
fn test_document_scan_stores_every_page() {
    let scratch = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let mut lcd = MockLcd::default();
    let (tx, rx) = mpsc::channel();
    // Two more pages after the first, then done.
    tx.send(Button::Five).unwrap();
    tx.send(Button::Five).unwrap();
    tx.send(Button::Enter).unwrap();
    let mut tools = FakeTools::default();

    let mut ctx = workflow_ctx(&mut lcd, &rx, &mut tools, scratch.path(), store.path());
    scan::run(ScanKind::Document, &mut ctx).unwrap();

    let delivered = names_in(&store);
    assert_eq!(delivered.len(), 3, "store: {:?}", delivered);
    assert!(delivered[0].ends_with("-1.png"));
    assert!(delivered[1].ends_with("-2.png"));
    assert!(delivered[2].ends_with("-3.png"));

    assert!(names_in(&scratch).is_empty(), "scratch should be clean");
    assert_eq!(tools.converts.len(), 3);
    assert_eq!(tools.converts[0].0, DOCUMENT);
    assert!(lcd.wrote("Complete"));
}

#[test]
fn test_pdf_scan_bundles_pages_into_one_file() {
    let scratch = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let mut lcd = MockLcd::default();
    let (tx, rx) = mpsc::channel();
    tx.send(Button::Five).unwrap();
    tx.send(Button::Five).unwrap();
    tx.send(Button::Enter).unwrap();
    let mut tools = FakeTools::default();

    let mut ctx = workflow_ctx(&mut lcd, &rx, &mut tools, scratch.path(), store.path());
    scan::run(ScanKind::Pdf, &mut ctx).unwrap();

    let delivered = names_in(&store);
    assert_eq!(delivered.len(), 1, "store: {:?}", delivered);
    assert!(delivered[0].ends_with(".pdf"));

    assert!(names_in(&scratch).is_empty(), "scratch should be clean");
    assert_eq!(tools.converts.len(), 3);
    assert_eq!(tools.converts[0].0, PDF_PAGE);
    assert_eq!(tools.assemblies.len(), 1);
    assert_eq!(tools.assemblies[0].0, 3, "all three sheets go into the pdf");
    assert!(lcd.wrote("Complete"));
}

#[test]
fn test_capture_failure_mid_document_finalizes_earlier_pages() {
    let scratch = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let mut lcd = MockLcd::default();
    let (tx, rx) = mpsc::channel();
    // Operator asks for a second page; its capture dies.
    tx.send(Button::Five).unwrap();
    let mut tools = FakeTools {
        fail_capture_on: Some(2),
        ..FakeTools::default()
    };

    let mut ctx = workflow_ctx(&mut lcd, &rx, &mut tools, scratch.path(), store.path());
    scan::run(ScanKind::Document, &mut ctx).unwrap();

    let delivered = names_in(&store);
    assert_eq!(delivered.len(), 1, "store: {:?}", delivered);
    assert!(delivered[0].ends_with("-1.png"));
    assert!(names_in(&scratch).is_empty());

    assert_eq!(tools.converts.len(), 1, "only the good page converts");
    assert!(lcd.wrote("SCAN ERROR"));
    assert!(lcd.wrote("Complete"));
}

// ============================================================================
// FAILURE CLEANUP
// ============================================================================

#[test]
fn test_convert_failure_keeps_unfinished_raws_in_scratch() {
    let scratch = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let mut lcd = MockLcd::default();
    let (tx, rx) = mpsc::channel();
    tx.send(Button::Five).unwrap();
    tx.send(Button::Five).unwrap();
    tx.send(Button::Enter).unwrap();
    let mut tools = FakeTools {
        fail_convert_on: Some(2),
        ..FakeTools::default()
    };

    let mut ctx = workflow_ctx(&mut lcd, &rx, &mut tools, scratch.path(), store.path());
    scan::run(ScanKind::Document, &mut ctx).unwrap();

    // Page 1 made it out before the failure.
    let delivered = names_in(&store);
    assert_eq!(delivered.len(), 1, "store: {:?}", delivered);
    assert!(delivered[0].ends_with("-1.png"));

    // Pages 2 and 3 stay raw in scratch.
    let leftovers = names_in(&scratch);
    assert_eq!(leftovers.len(), 2, "scratch: {:?}", leftovers);
    assert!(leftovers[0].ends_with("-2.pnm"));
    assert!(leftovers[1].ends_with("-3.pnm"));

    assert!(lcd.wrote("CONVERT ERROR"));
    assert!(!lcd.wrote("Complete"));
}

#[test]
fn test_assembly_failure_still_burns_the_sheets() {
    let scratch = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let mut lcd = MockLcd::default();
    let (tx, rx) = mpsc::channel();
    tx.send(Button::Enter).unwrap();
    let mut tools = FakeTools {
        fail_assemble: true,
        ..FakeTools::default()
    };

    let mut ctx = workflow_ctx(&mut lcd, &rx, &mut tools, scratch.path(), store.path());
    scan::run(ScanKind::Pdf, &mut ctx).unwrap();

    assert!(names_in(&store).is_empty(), "no pdf on failure");
    assert!(names_in(&scratch).is_empty(), "sheets go either way");
    assert!(lcd.wrote("PDF ERROR"));
    assert!(!lcd.wrote("Complete"));
}

#[test]
fn test_presses_during_a_workflow_do_not_leak_out() {
    let scratch = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let mut lcd = MockLcd::default();
    let (tx, rx) = mpsc::channel();
    // Mashed while the workflow owned the panel.
    tx.send(Button::One).unwrap();
    tx.send(Button::Four).unwrap();
    tx.send(Button::Left).unwrap();
    let mut tools = FakeTools {
        fail_capture_on: Some(1),
        ..FakeTools::default()
    };

    let mut ctx = workflow_ctx(&mut lcd, &rx, &mut tools, scratch.path(), store.path());
    scan::run(ScanKind::Single, &mut ctx).unwrap();

    assert!(rx.try_recv().is_err(), "queue should come back empty");
    assert_eq!(lcd.ops.first().map(String::as_str), Some("backlight on"));
    assert_eq!(lcd.ops.last().map(String::as_str), Some("backlight off"));
    assert!(names_in(&store).is_empty());
}
