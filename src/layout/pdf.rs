//! pdfium-backed layout extraction.
//!
//! Uses `pdfium-render` (Chromium's PDF library) to read each page's text
//! segments with their bounding rectangles and report them as glyph runs.
//!
//! # Pipeline
//!
//! ```text
//! PDF bytes → pdfium text segments → GlyphRun per segment → PageLayout per page
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use pdfium_render::prelude::*;
use tracing::debug;

use super::{GlyphRun, LayoutExtractor, PageLayout, PageSize, Placement};
use crate::error::{DiffError, Result};

/// Fraction of a glyph box below the baseline. pdfium reports boxes, not
/// baselines, so the baseline is re-derived from the box bottom.
const DESCENDER_RATIO: f32 = 0.2;

/// Held while a pdfium binding is alive. The library is not thread-safe
/// and every binding initialises and destroys it, so bindings never overlap.
static PDFIUM: Mutex<()> = Mutex::new(());

/// Bind the pdfium dynamic library.
///
/// Tries `dir` first when given, then the working directory, then the system
/// library search path.
fn bind_pdfium(dir: Option<&Path>) -> Result<Pdfium> {
    let bind_at = |dir: &Path| Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir));

    let bindings = match dir.and_then(|dir| bind_at(dir).ok()) {
        Some(bindings) => bindings,
        None => bind_at(Path::new("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| DiffError::Backend(format!("failed to bind pdfium: {e}")))?,
    };

    Ok(Pdfium::new(bindings))
}

/// Run `f` with exclusive access to a pdfium binding.
pub(crate) fn with_pdfium<T>(dir: Option<&Path>, f: impl FnOnce(&Pdfium) -> Result<T>) -> Result<T> {
    let _guard = PDFIUM.lock().unwrap_or_else(PoisonError::into_inner);
    let pdfium = bind_pdfium(dir)?;
    f(&pdfium)
}

/// Extracts glyph runs from PDF bytes with pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    library_dir: Option<PathBuf>,
}

impl PdfiumExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for the pdfium library in `dir` before the system path.
    #[must_use]
    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(dir.into());
        self
    }

    /// Convert one page's text segments into glyph runs.
    #[allow(deprecated)] // PdfRect field access deprecated in 0.8.28, removed in 0.9.0
    fn page_layout(index: usize, page: &PdfPage) -> Result<PageLayout> {
        let viewport = PageSize::new(page.width().value, page.height().value);
        let text = page
            .text()
            .map_err(|e| DiffError::Input(format!("failed to read text of page {index}: {e}")))?;

        let mut runs = Vec::new();
        for segment in text.segments().iter() {
            let string = segment.text();
            if string.is_empty() {
                continue;
            }
            let rect = segment.bounds();
            let width = (rect.right.value - rect.left.value).abs();
            let height = (rect.top.value - rect.bottom.value).abs();
            let bottom = rect.bottom.value.min(rect.top.value);

            let placement = Placement {
                x: rect.left.value.min(rect.right.value),
                y: bottom + height * DESCENDER_RATIO,
                scale_x: 1.0,
                scale_y: height,
            };
            runs.push(
                GlyphRun::new(string, placement)
                    .with_width(width)
                    .with_height(height),
            );
        }

        debug!(page = index, runs = runs.len(), "extracted page");
        Ok(PageLayout::new(index, viewport, runs))
    }
}

impl LayoutExtractor for PdfiumExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<PageLayout>> {
        with_pdfium(self.library_dir.as_deref(), |pdfium| {
            let doc = pdfium
                .load_pdf_from_byte_slice(bytes, None)
                .map_err(|e| DiffError::Input(format!("failed to parse PDF: {e}")))?;

            doc.pages()
                .iter()
                .enumerate()
                .map(|(index, page)| Self::page_layout(index, &page))
                .collect()
        })
    }
}
