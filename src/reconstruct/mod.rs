//! Text unit reconstruction from raw glyph runs.
//!
//! Turns the glyph runs of each page into [`TextUnit`]s with bounding boxes,
//! either one unit per word ([`Granularity::Token`]) or one per visual line
//! ([`Granularity::LineCharacter`]).
//!
//! # Pipeline
//!
//! ```text
//! GlyphRun → run_bbox (baseline correction, width estimate)
//!          → token::reconstruct_tokens | line::reconstruct_lines
//!          → TextUnit (empty normalized text dropped)
//! ```

pub mod line;
pub mod token;

use serde::{Deserialize, Serialize};

use crate::layout::{GlyphRun, Origin, PageLayout};

/// Share of the run height that sits below the baseline.
const DESCENDER_RATIO: f32 = 0.2;

/// Height used when neither a measured height nor a vertical scale exists.
const FALLBACK_HEIGHT: f32 = 10.0;

/// Average advance per character, as a multiple of font height.
const LATIN_ADVANCE: f32 = 0.5;
const WIDE_ADVANCE: f32 = 1.0;

/// Unit granularity used for reconstruction and diffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// One unit per word; diffed unit-by-unit.
    #[default]
    Token,
    /// One unit per visual line; lines are paired, then diffed by character.
    LineCharacter,
}

/// Axis-aligned rectangle. `y` is always the lower coordinate value, so
/// the box spans `[x, x + width] × [y, y + height]` in either origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &BBox) -> BBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BBox::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.top().max(other.top()) - y,
        )
    }

    /// Grow by `pad` on every side.
    #[must_use]
    pub fn padded(&self, pad: f32) -> BBox {
        BBox::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }
}

/// A reconstructed word or line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    /// Whitespace-collapsed text; never empty.
    pub text: String,
    /// Page index (0-based).
    pub page: usize,
    pub bbox: BBox,
    /// Constituent runs, kept for line units only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<GlyphRun>,
}

impl TextUnit {
    /// Tallest constituent run, or the bbox height for token units.
    pub fn max_run_height(&self) -> f32 {
        self.runs
            .iter()
            .map(run_height)
            .reduce(f32::max)
            .unwrap_or(self.bbox.height)
    }
}

/// Tuning knobs for reconstruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructOptions {
    pub granularity: Granularity,
    /// Max vertical distance between runs of the same line.
    pub y_cluster_tolerance: f32,
    /// Horizontal gap above which a space is inserted between runs.
    pub join_gap_threshold: f32,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Token,
            y_cluster_tolerance: 2.5,
            join_gap_threshold: 2.0,
        }
    }
}

/// Reconstruct units for a whole document, page by page in index order.
pub fn reconstruct_document(pages: &[PageLayout], options: &ReconstructOptions) -> Vec<TextUnit> {
    let mut ordered: Vec<&PageLayout> = pages.iter().collect();
    ordered.sort_by_key(|page| page.index);

    ordered
        .into_iter()
        .flat_map(|page| reconstruct_page(page, options))
        .collect()
}

/// Reconstruct the units of a single page.
pub fn reconstruct_page(page: &PageLayout, options: &ReconstructOptions) -> Vec<TextUnit> {
    match options.granularity {
        Granularity::Token => token::reconstruct_tokens(page),
        Granularity::LineCharacter => line::reconstruct_lines(
            page,
            options.y_cluster_tolerance,
            options.join_gap_threshold,
        ),
    }
}

/// Collapse whitespace runs to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Measured height, else the vertical scale, else a fixed fallback.
pub(crate) fn run_height(run: &GlyphRun) -> f32 {
    let height = run
        .height
        .filter(|h| *h > 0.0)
        .unwrap_or_else(|| run.placement.scale_y.abs());
    if height > 0.0 {
        height
    } else {
        FALLBACK_HEIGHT
    }
}

/// Measured width, else an estimate from character count and font height.
pub(crate) fn run_width(run: &GlyphRun, height: f32) -> f32 {
    if let Some(width) = run.width.filter(|w| *w > 0.0) {
        return width;
    }
    run.text
        .chars()
        .map(|ch| if is_wide(ch) { WIDE_ADVANCE } else { LATIN_ADVANCE })
        .sum::<f32>()
        * height
}

/// Bounding box of a run with the baseline-to-box correction applied.
pub(crate) fn run_bbox(run: &GlyphRun, origin: Origin) -> BBox {
    let height = run_height(run);
    let width = run_width(run, height);
    let y = match origin {
        Origin::BottomLeft => run.placement.y - height * DESCENDER_RATIO,
        Origin::TopLeft => run.placement.y - height * (1.0 - DESCENDER_RATIO),
    };
    BBox::new(run.placement.x, y, width, height)
}

/// Full-width scripts: CJK ideographs, kana, Hangul, full-width forms.
fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD
    )
}
