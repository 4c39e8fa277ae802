//! Raw page layout as reported by a layout extractor.
//!
//! A [`LayoutExtractor`] turns document bytes into [`PageLayout`]s: one per
//! page, each holding the ordered [`GlyphRun`]s drawn on it. Everything
//! downstream (reconstruction, alignment, highlighting) works on these
//! values only, so any backend that can report positioned text fragments can
//! drive the pipeline.
//!
//! | Backend | Type | Feature Flag |
//! |---------|------|-------------|
//! | pdfium | [`pdf::PdfiumExtractor`] | `pdf` |

#[cfg(feature = "pdf")]
pub mod pdf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Vertical origin of a page's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// PDF user space: y grows upward from the bottom edge.
    #[default]
    BottomLeft,
    /// Screen/viewport space: y grows downward from the top edge.
    TopLeft,
}

/// Width and height of a page or viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The parts of a glyph run's affine transform that layout reconstruction
/// reads: the translation and the two diagonal scale terms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    /// Translation x (run origin).
    pub x: f32,
    /// Translation y (run baseline).
    pub y: f32,
    pub scale_x: f32,
    /// Vertical scale; its magnitude approximates the font height.
    pub scale_y: f32,
}

impl Placement {
    /// Placement with a uniform font scale.
    pub fn at(x: f32, y: f32, font_size: f32) -> Self {
        Self {
            x,
            y,
            scale_x: font_size,
            scale_y: font_size,
        }
    }
}

/// One drawn text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRun {
    pub text: String,
    pub placement: Placement,
    /// Measured advance width, when the extractor knows it.
    pub width: Option<f32>,
    /// Measured height, when the extractor knows it.
    pub height: Option<f32>,
}

impl GlyphRun {
    pub fn new(text: impl Into<String>, placement: Placement) -> Self {
        Self {
            text: text.into(),
            placement,
            width: None,
            height: None,
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }
}

/// All runs drawn on a single page, in content order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page index (0-based).
    pub index: usize,
    /// Size of the space the runs are expressed in.
    pub viewport: PageSize,
    pub origin: Origin,
    pub runs: Vec<GlyphRun>,
}

impl PageLayout {
    pub fn new(index: usize, viewport: PageSize, runs: Vec<GlyphRun>) -> Self {
        Self {
            index,
            viewport,
            origin: Origin::BottomLeft,
            runs,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

/// Extracts positioned text from raw document bytes.
///
/// Implementations are synchronous; the pipeline runs them inside
/// `tokio::task::spawn_blocking`, one task per document.
pub trait LayoutExtractor: Send + Sync {
    /// Extract every page of the document in page order.
    ///
    /// Malformed input must fail with [`DiffError::Input`](crate::DiffError::Input).
    fn extract(&self, bytes: &[u8]) -> Result<Vec<PageLayout>>;
}
