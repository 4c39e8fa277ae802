//! Line-level reconstruction.
//!
//! 1. Drop whitespace-only runs and compute each run's corrected bbox.
//! 2. Sort top-to-bottom (for the page's origin), then left-to-right.
//! 3. Cluster runs whose y lies within `y_tolerance` of the cluster's running
//!    mean into the same line.
//! 4. Order each line's runs by x and join them, inserting a space at
//!    horizontal gaps wider than `join_gap`.
//! 5. Anchor each line at the mean y of its runs and re-sort top-to-bottom.

use std::cmp::Ordering;

use super::{collapse_whitespace, run_bbox, BBox, TextUnit};
use crate::layout::{GlyphRun, Origin, PageLayout};

/// A run with its corrected bounding box.
#[derive(Debug, Clone)]
struct PlacedRun<'a> {
    run: &'a GlyphRun,
    bbox: BBox,
}

/// Runs grouped into one visual line.
#[derive(Debug, Default)]
struct Cluster<'a> {
    runs: Vec<PlacedRun<'a>>,
    y_sum: f32,
}

impl<'a> Cluster<'a> {
    fn mean_y(&self) -> f32 {
        self.y_sum / self.runs.len() as f32
    }

    fn push(&mut self, placed: PlacedRun<'a>) {
        self.y_sum += placed.bbox.y;
        self.runs.push(placed);
    }
}

/// Compare two y values so that the visually higher one sorts first.
fn top_first(origin: Origin, a: f32, b: f32) -> Ordering {
    match origin {
        Origin::BottomLeft => b.total_cmp(&a),
        Origin::TopLeft => a.total_cmp(&b),
    }
}

/// Reconstruct visual lines for one page, ordered top-to-bottom.
pub fn reconstruct_lines(page: &PageLayout, y_tolerance: f32, join_gap: f32) -> Vec<TextUnit> {
    let mut placed: Vec<PlacedRun<'_>> = page
        .runs
        .iter()
        .filter(|run| !run.text.trim().is_empty())
        .map(|run| PlacedRun {
            run,
            bbox: run_bbox(run, page.origin),
        })
        .collect();

    if placed.is_empty() {
        return Vec::new();
    }

    placed.sort_by(|a, b| {
        top_first(page.origin, a.bbox.y, b.bbox.y).then(a.bbox.x.total_cmp(&b.bbox.x))
    });

    let mut clusters: Vec<Cluster<'_>> = Vec::new();
    for run in placed {
        match clusters.last_mut() {
            Some(cluster) if (run.bbox.y - cluster.mean_y()).abs() <= y_tolerance => {
                cluster.push(run);
            }
            _ => {
                let mut cluster = Cluster::default();
                cluster.push(run);
                clusters.push(cluster);
            }
        }
    }

    let mut lines: Vec<TextUnit> = clusters
        .into_iter()
        .filter_map(|cluster| build_line(page.index, cluster, join_gap))
        .collect();

    lines.sort_by(|a, b| top_first(page.origin, a.bbox.y, b.bbox.y));
    lines
}

/// Build a [`TextUnit`] from a cluster, inserting spaces at gaps.
fn build_line(page: usize, mut cluster: Cluster<'_>, join_gap: f32) -> Option<TextUnit> {
    let anchor_y = cluster.mean_y();
    cluster.runs.sort_by(|a, b| a.bbox.x.total_cmp(&b.bbox.x));

    let mut raw = String::new();
    let mut prev_right: Option<f32> = None;
    let mut x_min = f32::INFINITY;
    let mut x_max = f32::NEG_INFINITY;
    let mut height = 0.0_f32;

    for placed in &cluster.runs {
        if let Some(right) = prev_right {
            if placed.bbox.x - right > join_gap {
                raw.push(' ');
            }
        }
        raw.push_str(&placed.run.text);
        prev_right = Some(placed.bbox.right());
        x_min = x_min.min(placed.bbox.x);
        x_max = x_max.max(placed.bbox.right());
        height = height.max(placed.bbox.height);
    }

    let text = collapse_whitespace(&raw);
    if text.is_empty() {
        return None;
    }

    Some(TextUnit {
        text,
        page,
        bbox: BBox::new(x_min, anchor_y, x_max - x_min, height),
        runs: cluster.runs.into_iter().map(|placed| placed.run.clone()).collect(),
    })
}
