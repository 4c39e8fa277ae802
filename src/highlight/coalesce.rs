//! Merging of adjacent highlight boxes on the same line.
//!
//! 1. Sort by page, then y, then x.
//! 2. Split each page into rows: a row starts at the lowest unassigned y and
//!    takes every box within `row_tolerance` of that start.
//! 3. Sweep each row by x, merging a box into the previous one when it starts
//!    at or before the previous right edge plus `gap_tolerance`.
//!
//! Merged boxes span the union of x extents, the lowest y and the tallest
//! height. Running the pass on its own output changes nothing.

use std::cmp::Ordering;

use super::HighlightBox;
use crate::reconstruct::BBox;

/// Tolerances for [`coalesce`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoalesceOptions {
    /// Max y distance from a row's first box.
    pub row_tolerance: f32,
    /// Max horizontal gap bridged when merging.
    pub gap_tolerance: f32,
}

impl Default for CoalesceOptions {
    fn default() -> Self {
        Self {
            row_tolerance: 2.5,
            gap_tolerance: 3.0,
        }
    }
}

fn reading_order(a: &HighlightBox, b: &HighlightBox) -> Ordering {
    a.page
        .cmp(&b.page)
        .then(a.rect.y.total_cmp(&b.rect.y))
        .then(a.rect.x.total_cmp(&b.rect.x))
}

/// Merge boxes that touch or nearly touch on the same row.
pub fn coalesce(boxes: &[HighlightBox], options: &CoalesceOptions) -> Vec<HighlightBox> {
    let mut sorted = boxes.to_vec();
    sorted.sort_by(reading_order);

    let mut merged = Vec::with_capacity(sorted.len());
    let mut row: Vec<HighlightBox> = Vec::new();

    for hb in sorted {
        let same_row = row.first().is_some_and(|first| {
            first.page == hb.page && hb.rect.y - first.rect.y <= options.row_tolerance
        });
        if !same_row {
            merged.extend(merge_row(std::mem::take(&mut row), options.gap_tolerance));
        }
        row.push(hb);
    }
    merged.extend(merge_row(row, options.gap_tolerance));

    merged
}

/// Sweep one row left to right, merging overlapping or near boxes.
fn merge_row(mut row: Vec<HighlightBox>, gap: f32) -> Vec<HighlightBox> {
    row.sort_by(|a, b| a.rect.x.total_cmp(&b.rect.x).then(a.rect.y.total_cmp(&b.rect.y)));

    let mut out: Vec<HighlightBox> = Vec::with_capacity(row.len());
    for hb in row {
        match out.last_mut() {
            Some(last) if hb.rect.x <= last.rect.right() + gap => {
                let x = last.rect.x.min(hb.rect.x);
                let right = last.rect.right().max(hb.rect.right());
                last.rect = BBox::new(
                    x,
                    last.rect.y.min(hb.rect.y),
                    right - x,
                    last.rect.height.max(hb.rect.height),
                );
            }
            _ => out.push(hb),
        }
    }
    out
}
