//! Line pairing and per-line character alignment.
//!
//! Pairing is a greedy nearest-neighbour heuristic: target lines are visited
//! in document order and each claims the best-scoring unclaimed source line
//! on the same page. A claimed source line is never released, and ties go to
//! the first candidate encountered. Target lines left without a candidate are
//! treated as wholly added.

use std::ops::Range;

use serde::Serialize;

use super::{added_ranges, comparison_key, KeyOptions, SequenceAligner};
use crate::reconstruct::TextUnit;

/// Weight of the vertical distance in the pairing score.
const Y_WEIGHT: f32 = 3.0;
/// Weight of the text length difference in the pairing score.
const LENGTH_WEIGHT: f32 = 0.2;

/// Association of a target line with at most one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinePairing {
    /// Index into the target line sequence.
    pub target: usize,
    /// Index into the source line sequence, if any line was available.
    pub source: Option<usize>,
}

/// Character-level additions within one target line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineEdit {
    /// Index into the target line sequence.
    pub target: usize,
    /// `[start, end)` offsets into the target line's comparison key.
    pub added: Vec<Range<usize>>,
    /// Length of the target line's comparison key, in characters.
    pub key_len: usize,
}

fn pairing_score(source: &TextUnit, target: &TextUnit) -> f32 {
    let dy = (source.bbox.y - target.bbox.y).abs();
    let dlen = source.text.chars().count().abs_diff(target.text.chars().count()) as f32;
    Y_WEIGHT * dy + LENGTH_WEIGHT * dlen
}

/// Pair every target line with the nearest unclaimed source line on its page.
///
/// Returns one pairing per target line, in target order.
pub fn pair_lines(source: &[TextUnit], target: &[TextUnit]) -> Vec<LinePairing> {
    let mut claimed = vec![false; source.len()];

    target
        .iter()
        .enumerate()
        .map(|(target_idx, line)| {
            let mut best: Option<(usize, f32)> = None;
            for (source_idx, candidate) in source.iter().enumerate() {
                if claimed[source_idx] || candidate.page != line.page {
                    continue;
                }
                let score = pairing_score(candidate, line);
                if best.map_or(true, |(_, best_score)| score < best_score) {
                    best = Some((source_idx, score));
                }
            }

            if let Some((source_idx, _)) = best {
                claimed[source_idx] = true;
            }
            LinePairing {
                target: target_idx,
                source: best.map(|(source_idx, _)| source_idx),
            }
        })
        .collect()
}

/// Align each pair character by character.
///
/// Unpaired target lines are aligned against the empty string, so their
/// whole text comes back as one added range. Lines with no additions are
/// omitted.
pub fn align_line_pairs<A: SequenceAligner>(
    aligner: &A,
    source: &[TextUnit],
    target: &[TextUnit],
    pairings: &[LinePairing],
    keys: &KeyOptions,
) -> Vec<LineEdit> {
    pairings
        .iter()
        .filter_map(|pairing| {
            let target_key: Vec<char> = comparison_key(&target[pairing.target].text, keys)
                .chars()
                .collect();
            let source_key: Vec<char> = pairing
                .source
                .map(|idx| comparison_key(&source[idx].text, keys).chars().collect())
                .unwrap_or_default();

            let added = added_ranges(&aligner.align(&source_key, &target_key));
            (!added.is_empty()).then(|| LineEdit {
                target: pairing.target,
                added,
                key_len: target_key.len(),
            })
        })
        .collect()
}
