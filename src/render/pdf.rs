//! pdfium-backed highlight rendering.
//!
//! Loads the target PDF, draws one translucent filled rectangle path object
//! per projected box and saves the document back to bytes.

use std::path::PathBuf;

use pdfium_render::prelude::*;

use crate::error::{DiffError, Result};
use crate::highlight::HighlightBox;
use crate::layout::pdf::with_pdfium;
use crate::layout::PageSize;
use crate::project::{paint, HighlightStyle, RenderOutput, RenderSurface, Renderer};
use crate::reconstruct::BBox;

fn render_error(e: PdfiumError) -> DiffError {
    DiffError::Render(e.to_string())
}

/// An open pdfium document viewed as a [`RenderSurface`].
struct PdfiumSurface<'doc, 'lib> {
    document: &'doc PdfDocument<'lib>,
    sizes: Vec<PageSize>,
}

impl<'doc, 'lib> PdfiumSurface<'doc, 'lib> {
    fn new(document: &'doc PdfDocument<'lib>) -> Self {
        let sizes = document
            .pages()
            .iter()
            .map(|page| PageSize::new(page.width().value, page.height().value))
            .collect();
        Self { document, sizes }
    }
}

impl RenderSurface for PdfiumSurface<'_, '_> {
    fn page_count(&self) -> usize {
        self.sizes.len()
    }

    fn page_size(&self, page: usize) -> Option<PageSize> {
        self.sizes.get(page).copied()
    }

    fn draw_rectangle(&mut self, page: usize, rect: &BBox, style: &HighlightStyle) -> Result<()> {
        let index = PdfPageIndex::try_from(page)
            .map_err(|_| DiffError::Render(format!("page index {page} out of range")))?;
        let mut pdf_page = self.document.pages().get(index).map_err(render_error)?;

        let (r, g, b) = style.color.to_u8();
        let alpha = (style.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let fill = PdfColor::new(r, g, b, alpha);
        let (stroke, stroke_width) = if style.border_width > 0.0 {
            (
                Some(PdfColor::new(r, g, b, 255)),
                Some(PdfPoints::new(style.border_width)),
            )
        } else {
            (None, None)
        };

        pdf_page
            .objects_mut()
            .create_path_object_rect(
                PdfRect::new_from_values(rect.y, rect.x, rect.top(), rect.right()),
                stroke,
                stroke_width,
                Some(fill),
            )
            .map_err(render_error)?;
        Ok(())
    }
}

/// Draws highlights into PDF bytes with pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for the pdfium library in `dir` before the system path.
    #[must_use]
    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(dir.into());
        self
    }
}

impl Renderer for PdfiumRenderer {
    fn render(&self, bytes: Vec<u8>, boxes: &[HighlightBox], style: &HighlightStyle) -> Result<RenderOutput> {
        with_pdfium(self.library_dir.as_deref(), |pdfium| {
            let document = pdfium
                .load_pdf_from_byte_vec(bytes, None)
                .map_err(|e| DiffError::Input(format!("failed to parse PDF: {e}")))?;

            let summary = {
                let mut surface = PdfiumSurface::new(&document);
                paint(&mut surface, boxes, style)?
            };

            let bytes = document
                .save_to_bytes()
                .map_err(|e| DiffError::Render(format!("failed to save PDF: {e}")))?;
            Ok(RenderOutput { bytes, summary })
        })
    }
}
