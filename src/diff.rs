// src/diff.rs

//! Line-based patience diff
//!
//! Lines that occur exactly once on both sides anchor the alignment; the
//! gaps between anchors are diffed recursively, and gaps without unique
//! lines become a single change.

use std::collections::HashMap;
use std::ops::Range;

/// One aligned run of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp {
    /// Identical lines on both sides
    Equal { old: Range<usize>, new: Range<usize> },
    /// Lines replaced, removed, or inserted; either range may be empty
    Change { old: Range<usize>, new: Range<usize> },
}

/// Diff two sequences of lines
///
/// Consecutive operations of the same kind are merged, so equal and change
/// operations alternate.
pub fn diff_lines(old: &[&str], new: &[&str]) -> Vec<DiffOp> {
    let mut ops = Ops::default();
    diff_range(old, new, 0..old.len(), 0..new.len(), &mut ops);
    ops.0
}

/// Split text into lines that keep their trailing newline
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

#[derive(Default)]
struct Ops(Vec<DiffOp>);

impl Ops {
    fn equal(&mut self, old_start: usize, new_start: usize, len: usize) {
        if len == 0 {
            return;
        }
        if let Some(DiffOp::Equal { old, new }) = self.0.last_mut()
            && old.end == old_start
            && new.end == new_start
        {
            old.end += len;
            new.end += len;
            return;
        }
        self.0.push(DiffOp::Equal {
            old: old_start..old_start + len,
            new: new_start..new_start + len,
        });
    }

    fn change(&mut self, old_range: Range<usize>, new_range: Range<usize>) {
        if old_range.is_empty() && new_range.is_empty() {
            return;
        }
        if let Some(DiffOp::Change { old, new }) = self.0.last_mut()
            && old.end == old_range.start
            && new.end == new_range.start
        {
            old.end = old_range.end;
            new.end = new_range.end;
            return;
        }
        self.0.push(DiffOp::Change {
            old: old_range,
            new: new_range,
        });
    }
}

fn diff_range(old: &[&str], new: &[&str], o: Range<usize>, n: Range<usize>, ops: &mut Ops) {
    let mut prefix = 0;
    while o.start + prefix < o.end
        && n.start + prefix < n.end
        && old[o.start + prefix] == new[n.start + prefix]
    {
        prefix += 1;
    }
    ops.equal(o.start, n.start, prefix);
    let (o_start, n_start) = (o.start + prefix, n.start + prefix);

    let mut suffix = 0;
    while o.end - suffix > o_start
        && n.end - suffix > n_start
        && old[o.end - suffix - 1] == new[n.end - suffix - 1]
    {
        suffix += 1;
    }
    let o_mid = o_start..o.end - suffix;
    let n_mid = n_start..n.end - suffix;

    let anchors = unique_anchors(old, new, o_mid.clone(), n_mid.clone());
    if anchors.is_empty() {
        ops.change(o_mid.clone(), n_mid.clone());
    } else {
        let (mut oi, mut ni) = (o_mid.start, n_mid.start);
        for (ao, an) in anchors {
            diff_range(old, new, oi..ao, ni..an, ops);
            ops.equal(ao, an, 1);
            oi = ao + 1;
            ni = an + 1;
        }
        diff_range(old, new, oi..o_mid.end, ni..n_mid.end, ops);
    }

    ops.equal(o_mid.end, n_mid.end, suffix);
}

/// Longest increasing run of lines unique to both ranges
fn unique_anchors(
    old: &[&str],
    new: &[&str],
    o: Range<usize>,
    n: Range<usize>,
) -> Vec<(usize, usize)> {
    #[derive(Default)]
    struct Seen {
        old_count: usize,
        old_index: usize,
        new_count: usize,
        new_index: usize,
    }

    let mut seen: HashMap<&str, Seen> = HashMap::new();
    for i in o {
        let entry = seen.entry(old[i]).or_default();
        entry.old_count += 1;
        entry.old_index = i;
    }
    for j in n {
        let entry = seen.entry(new[j]).or_default();
        entry.new_count += 1;
        entry.new_index = j;
    }

    let mut pairs: Vec<(usize, usize)> = seen
        .values()
        .filter(|s| s.old_count == 1 && s.new_count == 1)
        .map(|s| (s.old_index, s.new_index))
        .collect();
    pairs.sort_unstable();
    longest_increasing(&pairs)
}

/// Patience sorting over the new-side indices
fn longest_increasing(pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; pairs.len()];
    for (i, &(_, new_index)) in pairs.iter().enumerate() {
        let pile = tails.partition_point(|&t| pairs[t].1 < new_index);
        if pile > 0 {
            previous[i] = Some(tails[pile - 1]);
        }
        if pile == tails.len() {
            tails.push(i);
        } else {
            tails[pile] = i;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        result.push(pairs[i]);
        cursor = previous[i];
    }
    result.reverse();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<&str> {
        split_lines(text)
    }

    #[test]
    fn test_identical() {
        let a = lines("a\nb\n");
        assert_eq!(
            diff_lines(&a, &a),
            vec![DiffOp::Equal { old: 0..2, new: 0..2 }]
        );
    }

    #[test]
    fn test_empty_sides() {
        assert!(diff_lines(&[], &[]).is_empty());
        let b = lines("x\n");
        assert_eq!(
            diff_lines(&[], &b),
            vec![DiffOp::Change { old: 0..0, new: 0..1 }]
        );
    }

    #[test]
    fn test_single_replacement() {
        let a = lines("one\ntwo\nthree\n");
        let b = lines("one\n2\nthree\n");
        assert_eq!(
            diff_lines(&a, &b),
            vec![
                DiffOp::Equal { old: 0..1, new: 0..1 },
                DiffOp::Change { old: 1..2, new: 1..2 },
                DiffOp::Equal { old: 2..3, new: 2..3 },
            ]
        );
    }

    #[test]
    fn test_unique_lines_anchor_moved_blocks() {
        let a = lines("fn a() {\n}\nfn b() {\n}\n");
        let b = lines("fn b() {\n}\nfn a() {\n}\n");
        let ops = diff_lines(&a, &b);
        let equal_lines: usize = ops
            .iter()
            .map(|op| match op {
                DiffOp::Equal { old, .. } => old.len(),
                DiffOp::Change { .. } => 0,
            })
            .sum();
        assert!(equal_lines >= 2);
        assert!(ops.iter().any(|op| matches!(op, DiffOp::Change { .. })));
    }

    #[test]
    fn test_operations_cover_both_sides() {
        let a = lines("a\nx\nb\ny\nc\n");
        let b = lines("a\nb\nz\nc\nw\n");
        let ops = diff_lines(&a, &b);
        let (mut old_end, mut new_end) = (0, 0);
        for op in &ops {
            let (DiffOp::Equal { old, new } | DiffOp::Change { old, new }) = op;
            assert_eq!(old.start, old_end);
            assert_eq!(new.start, new_end);
            old_end = old.end;
            new_end = new.end;
        }
        assert_eq!((old_end, new_end), (a.len(), b.len()));
    }
}
