//! Multi-way line alignment.
//!
//! The engine computes the common grid in four stages:
//!
//! 1. **Line views** (`line_view.rs`): per-pane normalized keys plus
//!    frequency classes, with isolation salts applied.
//! 2. **Pairwise alignment** (`pairwise.rs`): each pane against the
//!    reference — prefix/suffix trim, unique-line anchors chained by LIS
//!    (`anchors.rs`), LCS for the gaps, positional fallback past the limits.
//! 3. **Fold** (`fold.rs`): pairwise results merged into N-way rows; matched
//!    lines share their reference row, leftovers pair up top-aligned.
//! 4. **Segmentation** (this module): pins partition every pane, each open
//!    sub-range is solved independently, and the results are concatenated
//!    around the verbatim pin rows.
//!
//! Pins double as the boundaries for incremental recomputation: a single
//! contiguous edit only re-solves the pin-bounded segment containing it, and
//! the untouched prefix and suffix rows are spliced back around the result.
//!
//! The computation is deterministic: repeated calls over unchanged inputs
//! produce bit-identical tables. Ties in the LCS backtrack always resolve to
//! the earliest reference-pane line.

mod anchors;
mod fold;
mod pairwise;

use std::ops::Range;

use crate::config::{AlignConfig, EqualityPolicy, LimitBehavior};
use crate::line_view::{LineMeta, PaneView};
use crate::pane::{LineSequence, Pane};
use crate::pool::LinePool;
use crate::table::{
    AlignmentError, AlignmentRow, AlignmentTable, Isolation, Pin, validate_pins,
};

use fold::{fold_rows, positional_rows};
use pairwise::{PairAlignment, align_pair};

/// One contiguous pane splice, in post-edit coordinates: `removed` lines at
/// `at` were replaced by `inserted` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpliceEdit {
    pub pane: usize,
    pub at: u32,
    pub removed: u32,
    pub inserted: u32,
}

impl SpliceEdit {
    fn delta(&self) -> i64 {
        self.inserted as i64 - self.removed as i64
    }
}

pub(crate) fn build_views(
    panes: &[Pane],
    pool: &LinePool,
    policy: &EqualityPolicy,
    isolations: &[Isolation],
) -> Vec<PaneView> {
    panes
        .iter()
        .enumerate()
        .map(|(idx, pane)| PaneView::build(idx, pane, pool, policy, isolations))
        .collect()
}

/// Aligns loader-supplied sequences directly; the one-shot entry point for
/// callers that do not need a full document.
pub fn align(
    sequences: &[LineSequence],
    pins: &[Pin],
    isolations: &[Isolation],
    policy: &EqualityPolicy,
    config: &AlignConfig,
) -> Result<AlignmentTable, AlignmentError> {
    let mut pool = LinePool::new();
    let panes: Vec<Pane> = sequences
        .iter()
        .map(|seq| Pane::from_sequence(seq, &mut pool))
        .collect();
    let views = build_views(&panes, &pool, policy, isolations);
    compute(&views, pins, config)
}

/// Full recomputation across all segments.
pub(crate) fn compute(
    views: &[PaneView],
    pins: &[Pin],
    config: &AlignConfig,
) -> Result<AlignmentTable, AlignmentError> {
    if views.is_empty() {
        return Ok(AlignmentTable::default());
    }
    let pane_lens: Vec<u32> = views.iter().map(|v| v.meta.len() as u32).collect();
    validate_pins(pins, &pane_lens)?;
    let positional = check_limits(&pane_lens, config)?;

    let mut rows: Vec<AlignmentRow> = Vec::new();
    let mut pin_rows: Vec<u32> = Vec::new();

    for (k, seg) in segment_ranges(pins, &pane_lens).iter().enumerate() {
        rows.extend(align_segment(views, seg, config, positional));
        if k < pins.len() {
            pin_rows.push(rows.len() as u32);
            rows.push(pin_row(&pins[k]));
        }
    }

    let table = AlignmentTable::new(rows, pin_rows);
    debug_assert!(
        table.invariant_violation(&pane_lens).is_none(),
        "computed table violates invariants: {:?}",
        table.invariant_violation(&pane_lens)
    );
    Ok(table)
}

/// Recomputes only the pin-bounded segment containing `edit`, splicing the
/// result between the previous table's untouched prefix and suffix. The
/// suffix's edited-pane indices shift by the edit's length delta. Falls back
/// to a full computation when the edit cannot be confined to one segment.
pub(crate) fn compute_incremental(
    prev: &AlignmentTable,
    views: &[PaneView],
    pins: &[Pin],
    config: &AlignConfig,
    edit: &SpliceEdit,
) -> Result<AlignmentTable, AlignmentError> {
    let pane_lens: Vec<u32> = views.iter().map(|v| v.meta.len() as u32).collect();
    validate_pins(pins, &pane_lens)?;
    let positional = check_limits(&pane_lens, config)?;

    // Segment holding the edit in the edited pane.
    let k = pins
        .partition_point(|pin| pin.lines[edit.pane] < edit.at);
    let fits_segment = match pins.get(k) {
        Some(pin) => edit.at + edit.inserted <= pin.lines[edit.pane],
        None => true,
    };
    if !fits_segment || prev.pin_rows.len() != pins.len() {
        return compute(views, pins, config);
    }

    let seg_row_start = if k == 0 {
        0
    } else {
        prev.pin_rows[k - 1] as usize + 1
    };
    let seg_row_end = if k < pins.len() {
        prev.pin_rows[k] as usize
    } else {
        prev.rows.len()
    };

    let segments = segment_ranges(pins, &pane_lens);
    let seg_rows = align_segment(views, &segments[k], config, positional);

    let mut rows: Vec<AlignmentRow> = Vec::with_capacity(
        seg_row_start + seg_rows.len() + (prev.rows.len() - seg_row_end),
    );
    rows.extend_from_slice(&prev.rows[..seg_row_start]);
    rows.extend(seg_rows);
    let spliced_len = rows.len();
    let delta = edit.delta();
    for row in &prev.rows[seg_row_end..] {
        let mut cells = row.cells.clone();
        if let Some(line) = cells[edit.pane] {
            cells[edit.pane] = Some((line as i64 + delta) as u32);
        }
        rows.push(AlignmentRow { cells });
    }

    let row_delta = spliced_len as i64 - seg_row_end as i64;
    let mut pin_rows: Vec<u32> = prev.pin_rows[..k].to_vec();
    if k < pins.len() {
        pin_rows.push(spliced_len as u32);
        pin_rows.extend(
            prev.pin_rows[k + 1..]
                .iter()
                .map(|&r| (r as i64 + row_delta) as u32),
        );
    }

    let table = AlignmentTable::new(rows, pin_rows);
    debug_assert!(
        table.invariant_violation(&pane_lens).is_none(),
        "incremental table violates invariants: {:?}",
        table.invariant_violation(&pane_lens)
    );
    Ok(table)
}

/// Ok(true) means limits were exceeded but the config asked for the
/// positional fallback rather than an error.
fn check_limits(pane_lens: &[u32], config: &AlignConfig) -> Result<bool, AlignmentError> {
    let longest = pane_lens.iter().copied().max().unwrap_or(0);
    if longest <= config.max_align_lines {
        return Ok(false);
    }
    match config.on_limit_exceeded {
        LimitBehavior::ReturnError => Err(AlignmentError::LimitsExceeded {
            lines: longest,
            max_lines: config.max_align_lines,
        }),
        LimitBehavior::FallbackToPositional => Ok(true),
    }
}

/// Per-segment, per-pane open line ranges strictly between consecutive pins.
fn segment_ranges(pins: &[Pin], pane_lens: &[u32]) -> Vec<Vec<Range<u32>>> {
    let npanes = pane_lens.len();
    let mut segments = Vec::with_capacity(pins.len() + 1);
    for k in 0..=pins.len() {
        let seg: Vec<Range<u32>> = (0..npanes)
            .map(|pane| {
                let start = if k == 0 {
                    0
                } else {
                    pins[k - 1].lines[pane] + 1
                };
                let end = if k < pins.len() {
                    pins[k].lines[pane]
                } else {
                    pane_lens[pane]
                };
                start..end
            })
            .collect();
        segments.push(seg);
    }
    segments
}

fn align_segment(
    views: &[PaneView],
    seg: &[Range<u32>],
    config: &AlignConfig,
    positional: bool,
) -> Vec<AlignmentRow> {
    let slices: Vec<&[LineMeta]> = views
        .iter()
        .zip(seg)
        .map(|(view, range)| &view.meta[range.start as usize..range.end as usize])
        .collect();

    if positional {
        return positional_rows(&slices);
    }

    let pairs: Vec<PairAlignment> = slices[1..]
        .iter()
        .map(|slice| align_pair(slices[0], slice, config))
        .collect();
    fold_rows(&slices, &pairs)
}

fn pin_row(pin: &Pin) -> AlignmentRow {
    AlignmentRow {
        cells: pin.lines.iter().map(|&line| Some(line)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seqs(panes: &[&[&str]]) -> Vec<LineSequence> {
        panes
            .iter()
            .enumerate()
            .map(|(idx, lines)| {
                LineSequence::new(
                    format!("pane{idx}"),
                    lines.iter().map(|s| s.to_string()).collect(),
                    Default::default(),
                )
            })
            .collect()
    }

    fn align_default(panes: &[&[&str]]) -> AlignmentTable {
        align(
            &seqs(panes),
            &[],
            &[],
            &EqualityPolicy::default(),
            &AlignConfig::default(),
        )
        .expect("alignment should succeed")
    }

    #[test]
    fn identical_panes_align_row_per_line() {
        let table = align_default(&[&["a", "b"], &["a", "b"]]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].cells, vec![Some(0), Some(0)]);
        assert_eq!(table.rows[1].cells, vec![Some(1), Some(1)]);
    }

    #[test]
    fn repeated_compute_is_bit_identical() {
        let panes: &[&[&str]] = &[
            &["fn main() {", "    println!(\"hi\");", "}"],
            &["fn main() {", "    println!(\"bye\");", "", "}"],
        ];
        let first = align_default(panes);
        let second = align_default(panes);
        assert_eq!(first, second);
    }

    #[test]
    fn pinned_rows_appear_verbatim() {
        let sequences = seqs(&[&["a", "b", "c", "d"], &["x", "y", "c", "z"]]);
        let pins = vec![Pin {
            lines: vec![1, 0],
        }];
        let table = align(
            &sequences,
            &pins,
            &[],
            &EqualityPolicy::default(),
            &AlignConfig::default(),
        )
        .expect("alignment");

        assert_eq!(table.pin_rows.len(), 1);
        let pin_row = &table.rows[table.pin_rows[0] as usize];
        assert_eq!(pin_row.cells, vec![Some(1), Some(0)]);
        // Lines after the pin align only within the following segment.
        assert!(table.row_of_line(0, 2) > table.row_of_line(0, 1));
    }

    #[test]
    fn contradictory_pins_return_error_without_a_table() {
        let sequences = seqs(&[&["a", "b", "c"], &["a", "b", "c"]]);
        let pins = vec![
            Pin {
                lines: vec![1, 2],
            },
            Pin {
                lines: vec![2, 1],
            },
        ];
        let err = align(
            &sequences,
            &pins,
            &[],
            &EqualityPolicy::default(),
            &AlignConfig::default(),
        )
        .expect_err("crossing pins");
        assert_eq!(err.code(), "TXM_ALIGN_001");
    }

    #[test]
    fn isolation_blocks_cross_pane_matching() {
        let sequences = seqs(&[&["a", "b"], &["a", "b"]]);
        let isolations = vec![Isolation {
            pane: 1,
            range: 1..2,
        }];
        let table = align(
            &sequences,
            &[],
            &isolations,
            &EqualityPolicy::default(),
            &AlignConfig::default(),
        )
        .expect("alignment");

        // "b" in pane 1 is isolated, so it may not share a row with pane 0's "b".
        let row_b0 = table.row_of_line(0, 1).expect("pane 0 line 1 covered");
        let row_b1 = table.row_of_line(1, 1).expect("pane 1 line 1 covered");
        assert_ne!(row_b0, row_b1);
    }

    #[test]
    fn limit_fallback_produces_positional_rows() {
        let config = AlignConfig::builder()
            .max_align_lines(2)
            .build()
            .expect("config");
        let table = align(
            &seqs(&[&["a", "b", "c"], &["x", "b", "c"]]),
            &[],
            &[],
            &EqualityPolicy::default(),
            &config,
        )
        .expect("fallback");
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows[0].cells, vec![Some(0), Some(0)]);
    }

    #[test]
    fn limit_error_when_configured() {
        let config = AlignConfig::builder()
            .max_align_lines(2)
            .on_limit_exceeded(LimitBehavior::ReturnError)
            .build()
            .expect("config");
        let err = align(
            &seqs(&[&["a", "b", "c"], &["a", "b", "c"]]),
            &[],
            &[],
            &EqualityPolicy::default(),
            &config,
        )
        .expect_err("limits");
        assert_eq!(err.code(), "TXM_ALIGN_004");
    }

    #[test]
    fn incremental_matches_full_recompute() {
        let policy = EqualityPolicy::default();
        let config = AlignConfig::default();
        let before = seqs(&[&["a", "b", "c", "d", "e"], &["a", "b", "c", "d", "e"]]);
        let pins = vec![Pin {
            lines: vec![3, 3],
        }];

        let mut pool = LinePool::new();
        let mut panes: Vec<Pane> = before
            .iter()
            .map(|s| Pane::from_sequence(s, &mut pool))
            .collect();
        let views = build_views(&panes, &pool, &policy, &[]);
        let prev = compute(&views, &pins, &config).expect("initial");

        // Replace pane 0 line 1 with two lines.
        let new_lines = vec![
            crate::pane::Line {
                content: pool.intern("B1"),
                source_line: None,
                modified: true,
            },
            crate::pane::Line {
                content: pool.intern("B2"),
                source_line: None,
                modified: true,
            },
        ];
        panes[0].splice(1, 1, new_lines);
        let pins_after = vec![Pin {
            lines: vec![4, 3],
        }];
        let views = build_views(&panes, &pool, &policy, &[]);
        let edit = SpliceEdit {
            pane: 0,
            at: 1,
            removed: 1,
            inserted: 2,
        };

        let incremental =
            compute_incremental(&prev, &views, &pins_after, &config, &edit).expect("incremental");
        let full = compute(&views, &pins_after, &config).expect("full");
        assert_eq!(incremental, full);
    }
}
