//! Word-level reconstruction.
//!
//! Glyph runs do not line up with words: one run may hold several words, and
//! one word may be split across runs (kerning, font changes). Runs are walked
//! in content order with a single open token:
//!
//! - a run holding exactly one word extends the open token (text appended,
//!   bounding boxes unioned), or opens one; whitespace at the run's edges
//!   does not matter
//! - a run holding several words closes the open token and emits one unit per
//!   word, splitting the run width evenly between them
//! - a whitespace-only run closes the token

use super::{run_bbox, BBox, TextUnit};
use crate::layout::PageLayout;

/// Reconstruct word tokens for one page, in content order.
pub fn reconstruct_tokens(page: &PageLayout) -> Vec<TextUnit> {
    let mut tokens = Vec::new();
    let mut open: Option<TextUnit> = None;

    for run in &page.runs {
        let words: Vec<&str> = run.text.split_whitespace().collect();

        if words.is_empty() {
            flush(&mut open, &mut tokens);
            continue;
        }

        let bbox = run_bbox(run, page.origin);

        if let [word] = words.as_slice() {
            match open.as_mut() {
                Some(token) => {
                    token.text.push_str(word);
                    token.bbox = token.bbox.union(&bbox);
                }
                None => {
                    open = Some(TextUnit {
                        text: (*word).to_string(),
                        page: page.index,
                        bbox,
                        runs: Vec::new(),
                    });
                }
            }
        } else {
            flush(&mut open, &mut tokens);

            // Word-internal kerning is not reconstructed: each word gets an
            // equal share of the run.
            let share = bbox.width / words.len() as f32;
            tokens.extend(words.iter().enumerate().map(|(i, word)| TextUnit {
                text: (*word).to_string(),
                page: page.index,
                bbox: BBox::new(bbox.x + share * i as f32, bbox.y, share, bbox.height),
                runs: Vec::new(),
            }));
        }
    }

    flush(&mut open, &mut tokens);
    tokens
}

fn flush(open: &mut Option<TextUnit>, tokens: &mut Vec<TextUnit>) {
    if let Some(token) = open.take() {
        if !token.text.is_empty() {
            tokens.push(token);
        }
    }
}
