// src/interactions/segments.rs

//! Hunk-by-hunk selection between destination and incoming content

use super::{Interactor, SegmentChoice};
use crate::diff::{DiffOp, diff_lines, split_lines};
use crate::error::Result;
use crate::updaters::Target;

/// Merge `revision` into `current`, asking about every changed hunk
///
/// Rejected hunks keep the destination's lines.
pub fn select_segments(
    interactor: &mut dyn Interactor,
    target: &Target,
    current: &str,
    revision: &str,
) -> Result<String> {
    let old = split_lines(current);
    let new = split_lines(revision);
    let mut merged = String::with_capacity(revision.len().max(current.len()));

    for op in diff_lines(&old, &new) {
        match op {
            DiffOp::Equal { old: range, .. } => merged.extend(old[range].iter().copied()),
            DiffOp::Change { old: o, new: n } => {
                let ours = old[o].concat();
                let theirs = new[n].concat();
                loop {
                    match interactor.choose_segment(target, &ours, &theirs)? {
                        SegmentChoice::Accept => {
                            merged.push_str(&theirs);
                            break;
                        }
                        SegmentChoice::Reject => {
                            merged.push_str(&ours);
                            break;
                        }
                        SegmentChoice::View => interactor.show_diff(target, &ours, &theirs)?,
                    }
                }
            }
        }
    }
    Ok(merged)
}
