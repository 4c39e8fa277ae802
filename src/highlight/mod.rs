//! Highlight synthesis: added ranges → rectangles on the target document.
//!
//! Boxes are produced in the target's extraction-time coordinate space and
//! carry the viewport they were computed against, so the projector can
//! rescale them onto the real page later.

pub mod coalesce;

use std::ops::Range;

use serde::Serialize;
use tracing::debug;

pub use coalesce::{coalesce, CoalesceOptions};

use crate::align::LineEdit;
use crate::layout::{Origin, PageLayout, PageSize};
use crate::reconstruct::{BBox, TextUnit};

/// Minimum width of a character-range box.
const MIN_RANGE_WIDTH: f32 = 2.0;
/// Minimum height of a character-range box.
const MIN_RANGE_HEIGHT: f32 = 8.0;

/// A rectangle marking added text, in extraction-time page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HighlightBox {
    /// Page index (0-based).
    pub page: usize,
    pub rect: BBox,
    /// Viewport `rect` was computed against.
    pub viewport: PageSize,
    pub origin: Origin,
}

/// Looks up the viewport of each target page.
fn frame(pages: &[PageLayout], page: usize) -> Option<(PageSize, Origin)> {
    pages
        .iter()
        .find(|layout| layout.index == page)
        .map(|layout| (layout.viewport, layout.origin))
}

/// One padded box per added token.
///
/// Indices outside `units` and units on pages missing from `pages` are
/// skipped.
pub fn token_boxes(
    units: &[TextUnit],
    added: &[Range<usize>],
    pages: &[PageLayout],
    padding: f32,
) -> Vec<HighlightBox> {
    added
        .iter()
        .flat_map(|range| range.clone())
        .filter_map(|idx| {
            let Some(unit) = units.get(idx) else {
                debug!(idx, "added index has no unit");
                return None;
            };
            let (viewport, origin) = frame(pages, unit.page)?;
            Some(HighlightBox {
                page: unit.page,
                rect: unit.bbox.padded(padding),
                viewport,
                origin,
            })
        })
        .collect()
}

/// Box for the `[start, end)` character range of a line whose key has
/// `key_len` characters.
///
/// Assumes a uniform average character width across the line.
pub fn range_rect(line: &TextUnit, range: &Range<usize>, key_len: usize) -> Option<BBox> {
    if key_len == 0 || range.start >= range.end {
        return None;
    }

    let span = line.bbox.width;
    let len = key_len as f32;
    let start = range.start.min(key_len) as f32;
    let end = range.end.min(key_len) as f32;

    Some(BBox::new(
        line.bbox.x + span * start / len,
        line.bbox.y,
        (span * (end - start) / len).max(MIN_RANGE_WIDTH),
        line.max_run_height().max(MIN_RANGE_HEIGHT),
    ))
}

/// Boxes for every added character range of every edited line.
pub fn line_boxes(lines: &[TextUnit], edits: &[LineEdit], pages: &[PageLayout]) -> Vec<HighlightBox> {
    edits
        .iter()
        .filter_map(|edit| lines.get(edit.target).map(|line| (line, edit)))
        .flat_map(|(line, edit)| {
            let page_frame = frame(pages, line.page);
            edit.added.iter().filter_map(move |range| {
                let (viewport, origin) = page_frame?;
                Some(HighlightBox {
                    page: line.page,
                    rect: range_rect(line, range, edit.key_len)?,
                    viewport,
                    origin,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{GlyphRun, Placement};

    fn pages() -> Vec<PageLayout> {
        vec![PageLayout::new(0, PageSize::new(600.0, 800.0), Vec::new())]
    }

    fn token(text: &str, x: f32) -> TextUnit {
        TextUnit {
            text: text.to_string(),
            page: 0,
            bbox: BBox::new(x, 700.0, 25.0, 10.0),
            runs: Vec::new(),
        }
    }

    fn line(text: &str, x: f32, width: f32, run_height: f32) -> TextUnit {
        TextUnit {
            text: text.to_string(),
            page: 0,
            bbox: BBox::new(x, 700.0, width, run_height),
            runs: vec![GlyphRun::new(text, Placement::at(x, 702.0, run_height)).with_width(width)],
        }
    }

    #[test]
    fn token_box_is_padded_bbox() {
        let units = vec![token("Hello", 10.0), token("brave", 40.0), token("world", 70.0)];
        let boxes = token_boxes(&units, &[1..2], &pages(), 1.0);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].rect, BBox::new(39.0, 699.0, 27.0, 12.0));
        assert_eq!(boxes[0].viewport, PageSize::new(600.0, 800.0));
    }

    #[test]
    fn token_indices_out_of_range_are_skipped() {
        let units = vec![token("only", 10.0)];
        assert!(token_boxes(&units, &[3..5], &pages(), 1.0).is_empty());
    }

    #[test]
    fn token_on_unknown_page_is_skipped() {
        let mut unit = token("lost", 10.0);
        unit.page = 9;
        assert!(token_boxes(&[unit], &[0..1], &pages(), 1.0).is_empty());
    }

    #[test]
    fn character_range_is_proportional() {
        // "The black cat sat." is 18 characters; "black " is [4, 10)
        let l = line("The black cat sat.", 10.0, 180.0, 12.0);
        let rect = range_rect(&l, &(4..10), 18).unwrap();
        assert!((rect.x - (10.0 + 180.0 * 4.0 / 18.0)).abs() < 1e-3);
        assert!((rect.width - 180.0 * 6.0 / 18.0).abs() < 1e-3);
        assert!((rect.y - 700.0).abs() < 1e-4);
        assert!((rect.height - 12.0).abs() < 1e-4);
    }

    #[test]
    fn character_range_has_minimum_size() {
        let l = line("x".repeat(100).as_str(), 0.0, 100.0, 4.0);
        let rect = range_rect(&l, &(10..11), 100).unwrap();
        assert!((rect.width - MIN_RANGE_WIDTH).abs() < 1e-4);
        assert!((rect.height - MIN_RANGE_HEIGHT).abs() < 1e-4);
    }

    #[test]
    fn empty_line_or_range_yields_nothing() {
        let l = line("abc", 0.0, 30.0, 10.0);
        assert!(range_rect(&l, &(0..1), 0).is_none());
        assert!(range_rect(&l, &(2..2), 3).is_none());
    }

    #[test]
    fn line_boxes_follow_edits() {
        let lines = vec![line("unchanged", 10.0, 90.0, 10.0), line("brand new", 10.0, 90.0, 10.0)];
        let edits = vec![LineEdit {
            target: 1,
            added: vec![0..9],
            key_len: 9,
        }];
        let boxes = line_boxes(&lines, &edits, &pages());
        assert_eq!(boxes.len(), 1);
        assert!((boxes[0].rect.x - 10.0).abs() < 1e-4);
        assert!((boxes[0].rect.width - 90.0).abs() < 1e-4);
    }
}
