//! Myers shortest-edit-script alignment in linear space.
//!
//! Each step strips the common prefix and suffix (so an insertion in an
//! otherwise unchanged sequence always lands as one contiguous block), then
//! finds the middle snake of the remaining edit graph by searching forward
//! from the start and backward from the end at the same time, and recurses
//! on both halves. Time is O((N+M)·D); memory is O(N+M) for the two
//! frontiers plus the edit script.

use std::iter::repeat;

use super::{AlignmentSegment, SegmentKind, SequenceAligner};

/// Default [`SequenceAligner`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MyersAligner;

impl SequenceAligner for MyersAligner {
    fn align<T: PartialEq + Clone>(&self, source: &[T], target: &[T]) -> Vec<AlignmentSegment<T>> {
        let max_d = (source.len() + target.len() + 1) / 2 + 1;
        let mut forward = Frontier::new(max_d);
        let mut backward = Frontier::new(max_d);

        let mut edits = Vec::with_capacity(source.len().max(target.len()));
        conquer(source, target, &mut forward, &mut backward, &mut edits);

        group(source, target, &edits)
    }
}

/// Furthest-reaching x per diagonal `k`, for `k` in `-max_d..=max_d`.
struct Frontier {
    offset: isize,
    xs: Vec<usize>,
}

impl Frontier {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            xs: vec![0; 2 * max_d + 1],
        }
    }

    fn get(&self, k: isize) -> usize {
        self.xs[(k + self.offset) as usize]
    }

    fn set(&mut self, k: isize, x: usize) {
        self.xs[(k + self.offset) as usize] = x;
    }
}

fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

/// Append the shortest edit script from `a` to `b` to `edits`.
fn conquer<T: PartialEq>(
    a: &[T],
    b: &[T],
    forward: &mut Frontier,
    backward: &mut Frontier,
    edits: &mut Vec<SegmentKind>,
) {
    let prefix = common_prefix(a, b);
    edits.extend(repeat(SegmentKind::Unchanged).take(prefix));
    let (a, b) = (&a[prefix..], &b[prefix..]);

    let suffix = common_suffix(a, b);
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);

    if a.is_empty() {
        edits.extend(repeat(SegmentKind::Added).take(b.len()));
    } else if b.is_empty() {
        edits.extend(repeat(SegmentKind::Removed).take(a.len()));
    } else if let Some((x, y)) = middle_snake(a, b, forward, backward) {
        conquer(&a[..x], &b[..y], forward, backward, edits);
        conquer(&a[x..], &b[y..], forward, backward, edits);
    } else {
        edits.extend(repeat(SegmentKind::Removed).take(a.len()));
        edits.extend(repeat(SegmentKind::Added).take(b.len()));
    }

    edits.extend(repeat(SegmentKind::Unchanged).take(suffix));
}

/// Split point of an optimal path through the edit graph of `a` and `b`.
///
/// Both inputs are non-empty. The returned `(x, y)` lies on some shortest
/// path, so aligning `a[..x]`/`b[..y]` and `a[x..]`/`b[y..]` separately
/// stays minimal.
fn middle_snake<T: PartialEq>(
    a: &[T],
    b: &[T],
    forward: &mut Frontier,
    backward: &mut Frontier,
) -> Option<(usize, usize)> {
    let (n, m) = (a.len(), b.len());
    let delta = n as isize - m as isize;
    let odd = delta.rem_euclid(2) == 1;
    let d_max = ((n + m + 1) / 2) as isize;

    forward.set(1, 0);
    backward.set(1, 0);

    for d in 0..=d_max {
        for k in (-d..=d).step_by(2) {
            let mut x = if k == -d || (k != d && forward.get(k - 1) < forward.get(k + 1)) {
                forward.get(k + 1)
            } else {
                forward.get(k - 1) + 1
            };
            let mut y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            while x < n && y < m && a[x] == b[y] {
                x += 1;
                y += 1;
            }
            forward.set(k, x);

            if odd && (k - delta).abs() < d && x + backward.get(delta - k) >= n {
                return Some((x0, y0));
            }
        }

        // Same search on the reversed sequences.
        for k in (-d..=d).step_by(2) {
            let mut x = if k == -d || (k != d && backward.get(k - 1) < backward.get(k + 1)) {
                backward.get(k + 1)
            } else {
                backward.get(k - 1) + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && a[n - 1 - x] == b[m - 1 - y] {
                x += 1;
                y += 1;
            }
            backward.set(k, x);

            if !odd && (k - delta).abs() <= d && x + forward.get(delta - k) >= n {
                return Some((n - x, m - y));
            }
        }
    }

    None
}

/// Walk the edit script and collect maximal same-kind segments.
fn group<T: Clone>(source: &[T], target: &[T], edits: &[SegmentKind]) -> Vec<AlignmentSegment<T>> {
    let mut segments: Vec<AlignmentSegment<T>> = Vec::new();
    let (mut si, mut ti) = (0, 0);

    for &kind in edits {
        let value = match kind {
            SegmentKind::Unchanged => {
                si += 1;
                ti += 1;
                target[ti - 1].clone()
            }
            SegmentKind::Added => {
                ti += 1;
                target[ti - 1].clone()
            }
            SegmentKind::Removed => {
                si += 1;
                source[si - 1].clone()
            }
        };

        match segments.last_mut() {
            Some(last) if last.kind == kind => last.values.push(value),
            _ => segments.push(AlignmentSegment::new(kind, vec![value])),
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn rebuild<T: Clone>(segments: &[AlignmentSegment<T>], skip: SegmentKind) -> Vec<T> {
        segments
            .iter()
            .filter(|s| s.kind != skip)
            .flat_map(|s| s.values.iter().cloned())
            .collect()
    }

    fn assert_invariants(a: &str, b: &str) {
        let (a, b) = (chars(a), chars(b));
        let segments = MyersAligner.align(&a, &b);
        assert_eq!(rebuild(&segments, SegmentKind::Removed), b, "target coverage");
        assert_eq!(rebuild(&segments, SegmentKind::Added), a, "source coverage");
        for pair in segments.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind, "segments must be maximal");
        }
    }

    #[test]
    fn concatenation_invariants_hold() {
        for (a, b) in [
            ("", ""),
            ("", "abc"),
            ("abc", ""),
            ("abc", "abc"),
            ("ABCABBA", "CBABAC"),
            ("The cat sat.", "The black cat sat."),
            ("kitten", "sitting"),
            ("abcdef", "fedcba"),
            ("aaaa", "aa"),
        ] {
            assert_invariants(a, b);
        }
    }

    #[test]
    fn edit_script_is_minimal() {
        // Classic example: D = 5
        let segments = MyersAligner.align(&chars("ABCABBA"), &chars("CBABAC"));
        let edits: usize = segments
            .iter()
            .filter(|s| s.kind != SegmentKind::Unchanged)
            .map(|s| s.values.len())
            .sum();
        assert_eq!(edits, 5);
    }

    #[test]
    fn insertion_inside_line_is_contiguous() {
        let segments = MyersAligner.align(&chars("The cat sat."), &chars("The black cat sat."));
        let added: Vec<_> = segments.iter().filter(|s| s.is_added()).collect();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].values.iter().collect::<String>(), "black ");
        assert_eq!(crate::align::added_ranges(&segments), vec![4..10]);
    }

    #[test]
    fn pure_deletion_has_no_additions() {
        let segments = MyersAligner.align(&chars("abcdef"), &chars("abef"));
        assert!(segments.iter().all(|s| !s.is_added()));
    }

    #[test]
    fn disjoint_sequences_align_in_linear_space() {
        let source: Vec<u32> = (0..3000).collect();
        let target: Vec<u32> = (10_000..13_000).collect();
        let segments = MyersAligner.align(&source, &target);

        let count = |kind| -> usize {
            segments
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| s.values.len())
                .sum()
        };
        assert_eq!(count(SegmentKind::Unchanged), 0);
        assert_eq!(count(SegmentKind::Added), 3000);
        assert_eq!(count(SegmentKind::Removed), 3000);
        assert_eq!(rebuild(&segments, SegmentKind::Removed), target);
        assert_eq!(rebuild(&segments, SegmentKind::Added), source);
    }

    #[test]
    fn scattered_edits_stay_minimal() {
        // Every fifth element replaced: 200 removals + 200 additions
        let source: Vec<u32> = (0..1000).collect();
        let target: Vec<u32> = source.iter().map(|&v| if v % 5 == 0 { v + 100_000 } else { v }).collect();
        let segments = MyersAligner.align(&source, &target);
        let edits: usize = segments
            .iter()
            .filter(|s| s.kind != SegmentKind::Unchanged)
            .map(|s| s.values.len())
            .sum();
        assert_eq!(edits, 400);
        assert_eq!(rebuild(&segments, SegmentKind::Removed), target);
    }

    #[test]
    fn alignment_is_deterministic() {
        let (a, b) = (chars("kitten sitting"), chars("sitting kitten"));
        assert_eq!(MyersAligner.align(&a, &b), MyersAligner.align(&a, &b));
    }
}
