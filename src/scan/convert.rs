//! # Conversion Recipes
//!
//! Each scan variant post-processes raw captures with ImageMagick's
//! `convert`; the variants differ only in output format and in which knobs
//! they turn. A [`ConvertSpec`] holds the knobs and renders the argv, so
//! the four recipes live in data instead of four near-identical command
//! builders.
//!
//! Flag order matters to ImageMagick: `-density` is a *setting* and must
//! precede the input it applies to, while `-fuzz`/`-trim`/`-quality` are
//! operators on the decoded image and sit between input and output.

use std::path::Path;

/// One conversion recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSpec {
    /// Output extension (decides the encoder)
    pub ext: &'static str,
    /// Input DPI hint, `-density`
    pub density: Option<u16>,
    /// Lossy encoder quality, `-quality`
    pub quality: Option<u8>,
    /// Border-trim color tolerance in percent, `-fuzz N% -trim`
    pub trim_fuzz: Option<u8>,
}

/// Plain PNG, no processing.
pub const SINGLE: ConvertSpec = ConvertSpec {
    ext: "png",
    density: None,
    quality: None,
    trim_fuzz: None,
};

/// PNG with the scanner-bed border trimmed off.
pub const AUTOCROP: ConvertSpec = ConvertSpec {
    ext: "png",
    density: None,
    quality: None,
    trim_fuzz: Some(30),
};

/// Document page: PNG pinned to the capture resolution.
pub const DOCUMENT: ConvertSpec = ConvertSpec {
    ext: "png",
    density: Some(150),
    quality: None,
    trim_fuzz: None,
};

/// PDF sheet: JPEG keeps multi-page bundles small.
pub const PDF_PAGE: ConvertSpec = ConvertSpec {
    ext: "jpg",
    density: Some(150),
    quality: Some(85),
    trim_fuzz: None,
};

impl ConvertSpec {
    /// Render the full argv, program name first.
    pub fn argv(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut argv = vec!["convert".to_string()];
        if let Some(density) = self.density {
            argv.push("-density".to_string());
            argv.push(density.to_string());
        }
        argv.push(input.display().to_string());
        if let Some(fuzz) = self.trim_fuzz {
            argv.push("-fuzz".to_string());
            argv.push(format!("{}%", fuzz));
            argv.push("-trim".to_string());
        }
        if let Some(quality) = self.quality {
            argv.push("-quality".to_string());
            argv.push(quality.to_string());
        }
        argv.push(output.display().to_string());
        argv
    }
}

// ============================================================================
// TESTS
// ============================================================================
