//! Sequence alignment between two documents.
//!
//! - Token mode: the two documents' comparison keys are aligned once and the
//!   added segments are reported as index ranges into the target sequence.
//! - Line mode: target lines are paired with source lines ([`pairing`]), then
//!   each pair is aligned character by character.
//!
//! The alignment itself sits behind [`SequenceAligner`]; [`MyersAligner`] is
//! the default implementation.

pub mod key;
pub mod myers;
pub mod pairing;

use std::ops::Range;

use serde::Serialize;

pub use key::{comparison_key, KeyOptions};
pub use myers::MyersAligner;
pub use pairing::{align_line_pairs, pair_lines, LineEdit, LinePairing};

use crate::reconstruct::TextUnit;

/// Classification of an alignment segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Unchanged,
    /// Present only in the target.
    Added,
    /// Present only in the source.
    Removed,
}

/// A maximal run of values with the same classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentSegment<T> {
    pub kind: SegmentKind,
    pub values: Vec<T>,
}

impl<T> AlignmentSegment<T> {
    pub fn new(kind: SegmentKind, values: Vec<T>) -> Self {
        Self { kind, values }
    }

    pub fn is_added(&self) -> bool {
        self.kind == SegmentKind::Added
    }
}

/// Computes an order-preserving alignment of two sequences.
///
/// Implementations must satisfy, for any inputs:
/// - `Unchanged` + `Added` values, concatenated in order, equal `target`
/// - `Unchanged` + `Removed` values, concatenated in order, equal `source`
/// - identical inputs produce identical output
pub trait SequenceAligner {
    fn align<T: PartialEq + Clone>(&self, source: &[T], target: &[T]) -> Vec<AlignmentSegment<T>>;
}

/// Index ranges of the added segments, in target-sequence index space.
pub fn added_ranges<T>(segments: &[AlignmentSegment<T>]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut target_idx = 0;

    for segment in segments {
        let len = segment.values.len();
        match segment.kind {
            SegmentKind::Added => {
                ranges.push(target_idx..target_idx + len);
                target_idx += len;
            }
            SegmentKind::Unchanged => target_idx += len,
            SegmentKind::Removed => {}
        }
    }

    ranges
}

/// Result of token-mode alignment.
#[derive(Debug, Clone)]
pub struct TokenAlignment {
    pub segments: Vec<AlignmentSegment<String>>,
    /// Added ranges as indices into the target unit sequence.
    pub added: Vec<Range<usize>>,
}

impl TokenAlignment {
    /// Number of added target units.
    pub fn added_count(&self) -> usize {
        self.added.iter().map(ExactSizeIterator::len).sum()
    }
}

/// Align two token sequences by comparison key.
pub fn align_tokens<A: SequenceAligner>(
    aligner: &A,
    source: &[TextUnit],
    target: &[TextUnit],
    keys: &KeyOptions,
) -> TokenAlignment {
    let source_keys: Vec<String> = source.iter().map(|u| comparison_key(&u.text, keys)).collect();
    let target_keys: Vec<String> = target.iter().map(|u| comparison_key(&u.text, keys)).collect();

    let segments = aligner.align(&source_keys, &target_keys);
    let added = added_ranges(&segments);
    TokenAlignment { segments, added }
}
