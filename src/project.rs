//! Coordinate projection onto the rendering surface.
//!
//! Highlight boxes are computed in extraction-time viewport units. Before
//! drawing they are rescaled per axis onto the page's native size, flipped
//! when the viewport was top-left rooted (native PDF space is bottom-left),
//! and clipped to the page. Boxes for pages the document does not have, or
//! boxes that land entirely off the page, are dropped rather than failing
//! the run.
//!
//! | Backend | Type | Feature Flag |
//! |---------|------|-------------|
//! | pdfium | [`render::pdf::PdfiumRenderer`](crate::render::pdf::PdfiumRenderer) | `pdf` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DiffError, Result};
use crate::highlight::HighlightBox;
use crate::layout::{Origin, PageSize};
use crate::reconstruct::BBox;

/// An sRGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const YELLOW: Rgb = Rgb { r: 1.0, g: 1.0, b: 0.0 };

    /// Components as 8-bit channels.
    pub fn to_u8(self) -> (u8, u8, u8) {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

impl FromStr for Rgb {
    type Err = DiffError;

    /// Parse `#RRGGBB` or `RRGGBB`.
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DiffError::Config(format!("invalid colour '{s}', expected #RRGGBB")));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| f32::from(v) / 255.0)
                .map_err(|e| DiffError::Config(format!("invalid colour '{s}': {e}")))
        };
        Ok(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

impl TryFrom<String> for Rgb {
    type Error = DiffError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_u8();
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

/// How highlight rectangles are painted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub color: Rgb,
    /// Fill opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Border stroke width; 0 draws no border.
    pub border_width: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: Rgb::YELLOW,
            opacity: 0.35,
            border_width: 0.0,
        }
    }
}

/// A drawing target opened from document bytes.
///
/// Coordinates passed to [`draw_rectangle`](Self::draw_rectangle) are native
/// page units with a bottom-left origin.
pub trait RenderSurface {
    fn page_count(&self) -> usize;

    /// Native size of a page, `None` when it does not exist.
    fn page_size(&self, page: usize) -> Option<PageSize>;

    fn draw_rectangle(&mut self, page: usize, rect: &BBox, style: &HighlightStyle) -> Result<()>;
}

/// Paints highlight boxes into a copy of a document.
///
/// Implementations are synchronous; the pipeline runs them inside
/// `tokio::task::spawn_blocking`.
pub trait Renderer: Send + Sync {
    /// Open `bytes`, [`paint`] the boxes and save the result.
    fn render(&self, bytes: Vec<u8>, boxes: &[HighlightBox], style: &HighlightStyle) -> Result<RenderOutput>;
}

/// Saved document plus what happened to the boxes.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub summary: PaintSummary,
}

/// Counts of boxes drawn and dropped by [`paint`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaintSummary {
    pub drawn: usize,
    pub dropped: usize,
}

/// Project a box from its viewport onto a page of native size `page`.
///
/// Returns `None` when the box does not intersect the page or the viewport
/// is degenerate; otherwise the rectangle clipped to `[0, w] × [0, h]`.
pub fn project_box(hb: &HighlightBox, page: PageSize) -> Option<BBox> {
    if hb.viewport.width <= 0.0 || hb.viewport.height <= 0.0 {
        return None;
    }
    let scale_x = page.width / hb.viewport.width;
    let scale_y = page.height / hb.viewport.height;

    let x0 = hb.rect.x * scale_x;
    let x1 = hb.rect.right() * scale_x;
    let (y0, y1) = match hb.origin {
        Origin::BottomLeft => (hb.rect.y * scale_y, hb.rect.top() * scale_y),
        Origin::TopLeft => (
            page.height - hb.rect.top() * scale_y,
            page.height - hb.rect.y * scale_y,
        ),
    };

    let (x0, x1) = (x0.max(0.0), x1.min(page.width));
    let (y0, y1) = (y0.max(0.0), y1.min(page.height));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(BBox::new(x0, y0, x1 - x0, y1 - y0))
}

/// Project every box and draw it on `surface`.
///
/// Off-page geometry is dropped and counted; only drawing failures are
/// errors.
pub fn paint(
    surface: &mut dyn RenderSurface,
    boxes: &[HighlightBox],
    style: &HighlightStyle,
) -> Result<PaintSummary> {
    let mut summary = PaintSummary::default();
    let page_count = surface.page_count();

    for hb in boxes {
        let projected = if hb.page < page_count {
            surface.page_size(hb.page).and_then(|size| project_box(hb, size))
        } else {
            None
        };

        match projected {
            Some(rect) => {
                surface.draw_rectangle(hb.page, &rect, style)?;
                summary.drawn += 1;
            }
            None => {
                debug!(page = hb.page, rect = ?hb.rect, "dropping off-page highlight");
                summary.dropped += 1;
            }
        }
    }

    if summary.dropped > 0 {
        warn!(dropped = summary.dropped, "some highlights fell outside the document");
    }
    Ok(summary)
}
