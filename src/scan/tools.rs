//! # External Scan Tools
//!
//! The workflows drive two external programs: SANE's `scanimage` for raw
//! captures and ImageMagick's `convert` for everything after. The
//! [`ScanTools`] trait is the seam between the workflow logic and those
//! processes; tests substitute a recording fake, `main` installs
//! [`SaneTools`].
//!
//! No timeouts and no kill path: a hung scanner blocks the whole panel
//! until someone unplugs it. Known risk, accepted for a desk appliance.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::FaroError;
use crate::scan::convert::ConvertSpec;

/// Capture geometry and format, A4 at 150 dpi color.
///
/// `scanimage` writes PNM on stdout; the buffer-size bump keeps the USB
/// pipeline fed on slow single-board hosts.
pub const SCANIMAGE_ARGS: &[&str] = &[
    "--buffer-size=40960",
    "--mode",
    "Color",
    "--resolution",
    "150",
    "--compression",
    "None",
    "-l",
    "0",
    "-t",
    "0",
    "-x",
    "210",
    "-y",
    "297",
];

/// Trait for the external scan/convert process runner.
pub trait ScanTools {
    /// Capture one page from the flatbed into `raw`.
    fn capture(&mut self, raw: &Path) -> Result<(), FaroError>;

    /// Convert one captured page per the recipe.
    fn convert(&mut self, spec: &ConvertSpec, input: &Path, output: &Path)
    -> Result<(), FaroError>;

    /// Assemble converted sheets, in page order, into one PDF.
    fn assemble(&mut self, sheets: &[PathBuf], pdf: &Path) -> Result<(), FaroError>;
}

/// The real runner: `scanimage` and `convert` as child processes.
pub struct SaneTools;

impl ScanTools for SaneTools {
    fn capture(&mut self, raw: &Path) -> Result<(), FaroError> {
        let file = File::create(raw)?;
        let status = Command::new("scanimage")
            .args(SCANIMAGE_ARGS)
            .stdout(Stdio::from(file))
            .status()
            .map_err(|e| FaroError::Command(format!("Failed to run scanimage: {}", e)))?;

        if !status.success() {
            return Err(FaroError::Command(format!(
                "scanimage exited with {}",
                status
            )));
        }
        Ok(())
    }

    fn convert(
        &mut self,
        spec: &ConvertSpec,
        input: &Path,
        output: &Path,
    ) -> Result<(), FaroError> {
        run_argv(&spec.argv(input, output))
    }

    fn assemble(&mut self, sheets: &[PathBuf], pdf: &Path) -> Result<(), FaroError> {
        let mut argv = vec!["convert".to_string()];
        argv.extend(sheets.iter().map(|sheet| sheet.display().to_string()));
        argv.push(pdf.display().to_string());
        run_argv(&argv)
    }
}

/// Run an argv (program name first), succeeding only on exit code 0.
fn run_argv(argv: &[String]) -> Result<(), FaroError> {
    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .status()
        .map_err(|e| FaroError::Command(format!("Failed to run {}: {}", argv[0], e)))?;

    if !status.success() {
        return Err(FaroError::Command(format!(
            "{} exited with {}",
            argv[0], status
        )));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_geometry_is_a4_at_150dpi() {
        let args = SCANIMAGE_ARGS.join(" ");
        assert!(args.contains("--resolution 150"));
        assert!(args.contains("-x 210"));
        assert!(args.contains("-y 297"));
        assert!(args.contains("--mode Color"));
    }

    #[test]
    fn test_run_argv_accepts_zero_exit() {
        assert!(run_argv(&["true".to_string()]).is_ok());
    }

    #[test]
    fn test_run_argv_rejects_nonzero_exit() {
        let err = run_argv(&["false".to_string()]).unwrap_err();
        assert!(matches!(err, FaroError::Command(_)));
    }
}
