//! The common alignment grid and user-forced alignment state.
//!
//! An [`AlignmentTable`] is the single source of truth for how N panes'
//! lines correspond: each [`AlignmentRow`] holds, per pane, either a line
//! index or a gap. [`Pin`]s are user-forced rows that any recomputation must
//! reproduce verbatim; [`Isolation`]s mark ranges that must not be matched
//! into other panes.
//!
//! # Invariants
//!
//! - every row has at least one non-gap cell and one cell per pane;
//! - within a pane, non-gap indices strictly increase down the table;
//! - the table covers every line of every pane exactly once.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of the grid: a line index or gap per pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRow {
    pub cells: Vec<Option<u32>>,
}

impl AlignmentRow {
    pub fn line(&self, pane: usize) -> Option<u32> {
        self.cells.get(pane).copied().flatten()
    }

    pub fn present_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// The full correspondence across all panes' lines.
#[derive(Debug, Clone, Default)]
pub struct AlignmentTable {
    pub rows: Vec<AlignmentRow>,
    /// Row indices occupied by pin rows, in order; the segment boundaries for
    /// incremental recomputation.
    pub pin_rows: Vec<u32>,
    revision: u64,
}

/// Equality is over the correspondence itself; the revision stamp is cache
/// bookkeeping and two tables computed from identical inputs compare equal
/// regardless of when they were computed.
impl PartialEq for AlignmentTable {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.pin_rows == other.pin_rows
    }
}

impl Eq for AlignmentTable {}

impl AlignmentTable {
    pub(crate) fn new(rows: Vec<AlignmentRow>, pin_rows: Vec<u32>) -> Self {
        Self {
            rows,
            pin_rows,
            revision: 0,
        }
    }

    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Content revision this table was computed from; see the document's
    /// stale-result handling.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Row index holding a given pane line, if the table covers it.
    pub fn row_of_line(&self, pane: usize, line: u32) -> Option<u32> {
        self.rows
            .iter()
            .position(|row| row.line(pane) == Some(line))
            .map(|idx| idx as u32)
    }

    /// Returns a description of the first violated invariant, if any.
    /// Exercised by debug assertions and the fuzz harness.
    pub fn invariant_violation(&self, pane_lens: &[u32]) -> Option<String> {
        let npanes = pane_lens.len();
        let mut next_expected: Vec<u32> = vec![0; npanes];

        for (row_idx, row) in self.rows.iter().enumerate() {
            if row.cells.len() != npanes {
                return Some(format!(
                    "row {row_idx} has {} cells, expected {npanes}",
                    row.cells.len()
                ));
            }
            if row.present_count() == 0 {
                return Some(format!("row {row_idx} is all gaps"));
            }
            for (pane, cell) in row.cells.iter().enumerate() {
                if let Some(line) = cell {
                    if *line != next_expected[pane] {
                        return Some(format!(
                            "pane {pane} expected line {} next but row {row_idx} holds {line}",
                            next_expected[pane]
                        ));
                    }
                    next_expected[pane] += 1;
                }
            }
        }

        for (pane, (&covered, &len)) in next_expected.iter().zip(pane_lens).enumerate() {
            if covered != len {
                return Some(format!(
                    "pane {pane} covers {covered} of {len} lines"
                ));
            }
        }

        for &pin_row in &self.pin_rows {
            if pin_row as usize >= self.rows.len() {
                return Some(format!("pin row {pin_row} out of table range"));
            }
        }

        None
    }
}

/// A user-forced correspondence: one line index per pane, held verbatim as a
/// row in any recomputed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub lines: Vec<u32>,
}

/// A pane-local range excluded from cross-pane matching during realignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Isolation {
    pub pane: u32,
    pub range: Range<u32>,
}

/// Errors produced by alignment computation. The caller's previous table is
/// always retained; no partial table is ever published.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AlignmentError {
    #[error(
        "[TXM_ALIGN_001] pin {index} is not ordered after the previous pin in pane {pane}. Suggestion: remove the conflicting pin or re-pin in document order."
    )]
    ContradictoryPins { index: usize, pane: usize },

    #[error(
        "[TXM_ALIGN_002] pin {index} references line {line} in pane {pane}, which has only {len} lines"
    )]
    PinOutOfBounds {
        index: usize,
        pane: usize,
        line: u32,
        len: u32,
    },

    #[error("[TXM_ALIGN_003] pin {index} names {got} panes, expected {expected}")]
    PinArity {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error(
        "[TXM_ALIGN_004] pane of {lines} lines exceeds the alignment limit of {max_lines}. Suggestion: raise `max_align_lines` or switch `on_limit_exceeded`."
    )]
    LimitsExceeded { lines: u32, max_lines: u32 },
}

impl AlignmentError {
    pub fn code(&self) -> &'static str {
        match self {
            AlignmentError::ContradictoryPins { .. } => "TXM_ALIGN_001",
            AlignmentError::PinOutOfBounds { .. } => "TXM_ALIGN_002",
            AlignmentError::PinArity { .. } => "TXM_ALIGN_003",
            AlignmentError::LimitsExceeded { .. } => "TXM_ALIGN_004",
        }
    }
}

/// Checks pin arity, bounds, and strict monotonicity in every pane.
/// Runs before any state is touched, so a rejected pin set mutates nothing.
pub(crate) fn validate_pins(pins: &[Pin], pane_lens: &[u32]) -> Result<(), AlignmentError> {
    let npanes = pane_lens.len();
    for (index, pin) in pins.iter().enumerate() {
        if pin.lines.len() != npanes {
            return Err(AlignmentError::PinArity {
                index,
                expected: npanes,
                got: pin.lines.len(),
            });
        }
        for (pane, (&line, &len)) in pin.lines.iter().zip(pane_lens).enumerate() {
            if line >= len {
                return Err(AlignmentError::PinOutOfBounds {
                    index,
                    pane,
                    line,
                    len,
                });
            }
        }
        if index > 0 {
            let prev = &pins[index - 1];
            for pane in 0..npanes {
                if pin.lines[pane] <= prev.lines[pane] {
                    return Err(AlignmentError::ContradictoryPins { index, pane });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[Option<u32>]) -> AlignmentRow {
        AlignmentRow {
            cells: cells.to_vec(),
        }
    }

    #[test]
    fn well_formed_table_passes_invariants() {
        let table = AlignmentTable::new(
            vec![
                row(&[Some(0), Some(0)]),
                row(&[Some(1), None]),
                row(&[None, Some(1)]),
            ],
            Vec::new(),
        );
        assert_eq!(table.invariant_violation(&[2, 2]), None);
    }

    #[test]
    fn all_gap_row_is_a_violation() {
        let table = AlignmentTable::new(vec![row(&[None, None])], Vec::new());
        assert!(table.invariant_violation(&[0, 0]).is_some());
    }

    #[test]
    fn skipped_line_is_a_violation() {
        let table = AlignmentTable::new(vec![row(&[Some(1), Some(0)])], Vec::new());
        assert!(table.invariant_violation(&[2, 1]).is_some());
    }

    #[test]
    fn incomplete_coverage_is_a_violation() {
        let table = AlignmentTable::new(vec![row(&[Some(0), Some(0)])], Vec::new());
        assert!(table.invariant_violation(&[2, 1]).is_some());
    }

    #[test]
    fn monotonic_pins_validate() {
        let pins = vec![
            Pin {
                lines: vec![1, 0],
            },
            Pin {
                lines: vec![4, 2],
            },
        ];
        assert!(validate_pins(&pins, &[10, 10]).is_ok());
    }

    #[test]
    fn crossing_pins_are_contradictory() {
        let pins = vec![
            Pin {
                lines: vec![3, 1],
            },
            Pin {
                lines: vec![4, 1],
            },
        ];
        let err = validate_pins(&pins, &[10, 10]).expect_err("pins cross in pane 1");
        assert!(matches!(
            err,
            AlignmentError::ContradictoryPins { index: 1, pane: 1 }
        ));
        assert_eq!(err.code(), "TXM_ALIGN_001");
    }

    #[test]
    fn out_of_bounds_pin_is_rejected() {
        let pins = vec![Pin {
            lines: vec![0, 7],
        }];
        assert!(matches!(
            validate_pins(&pins, &[5, 5]),
            Err(AlignmentError::PinOutOfBounds {
                index: 0,
                pane: 1,
                line: 7,
                len: 5
            })
        ));
    }

    #[test]
    fn wrong_arity_pin_is_rejected() {
        let pins = vec![Pin { lines: vec![0] }];
        assert!(matches!(
            validate_pins(&pins, &[5, 5]),
            Err(AlignmentError::PinArity { .. })
        ));
    }
}
