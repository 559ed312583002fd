//! Row classification and difference-block navigation.
//!
//! Derived entirely from the current table and equality policy; rebuilt after
//! every table or policy change, never mutated in place.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::EqualityPolicy;
use crate::hashing::{is_blank_line, lines_equal};
use crate::pane::Pane;
use crate::pool::LinePool;
use crate::table::AlignmentTable;

/// Classification of one grid row relative to the reference pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Every present line equal under the active policy.
    Same,
    /// All panes present, contents differ.
    Changed,
    /// Absent in the reference pane, present elsewhere.
    Inserted,
    /// Present in the reference pane, absent in at least one other.
    Deleted,
}

/// Maximal run of consecutive non-`Same` rows; the unit of navigation and of
/// merge selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferenceBlock {
    pub rows: Range<u32>,
    /// Uniform row kind of the run, or `Changed` when mixed.
    pub kind: RowKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    First,
    Previous,
    Next,
    Last,
}

/// Navigation outcome: the target block, and whether the walk wrapped around
/// the document end so the caller can prompt before continuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavResult {
    pub block: Option<usize>,
    pub wrapped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DifferenceIndex {
    kinds: Vec<RowKind>,
    blocks: Vec<DifferenceBlock>,
}

impl DifferenceIndex {
    pub fn build(
        table: &AlignmentTable,
        panes: &[Pane],
        pool: &LinePool,
        policy: &EqualityPolicy,
        reference: usize,
    ) -> Self {
        let kinds: Vec<RowKind> = table
            .rows
            .iter()
            .map(|row| classify_row(&row.cells, panes, pool, policy, reference))
            .collect();

        let mut blocks = Vec::new();
        let mut run_start: Option<u32> = None;
        for (idx, kind) in kinds.iter().enumerate() {
            match (*kind, run_start) {
                (RowKind::Same, Some(start)) => {
                    blocks.push(make_block(start..idx as u32, &kinds));
                    run_start = None;
                }
                (RowKind::Same, None) => {}
                (_, None) => run_start = Some(idx as u32),
                (_, Some(_)) => {}
            }
        }
        if let Some(start) = run_start {
            blocks.push(make_block(start..kinds.len() as u32, &kinds));
        }

        Self { kinds, blocks }
    }

    pub fn blocks(&self) -> &[DifferenceBlock] {
        &self.blocks
    }

    pub fn block(&self, idx: usize) -> Option<&DifferenceBlock> {
        self.blocks.get(idx)
    }

    pub fn kind_of_row(&self, row: u32) -> Option<RowKind> {
        self.kinds.get(row as usize).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn navigate(&self, current: Option<usize>, direction: Direction) -> NavResult {
        let count = self.blocks.len();
        if count == 0 {
            return NavResult {
                block: None,
                wrapped: false,
            };
        }
        let last = count - 1;

        let (block, wrapped) = match direction {
            Direction::First => (0, false),
            Direction::Last => (last, false),
            Direction::Next => match current {
                None => (0, false),
                Some(idx) if idx < last => (idx + 1, false),
                Some(_) => (0, true),
            },
            Direction::Previous => match current {
                None => (last, false),
                Some(0) => (last, true),
                Some(idx) => (idx - 1, false),
            },
        };

        NavResult {
            block: Some(block),
            wrapped,
        }
    }
}

fn make_block(rows: Range<u32>, kinds: &[RowKind]) -> DifferenceBlock {
    let mut iter = kinds[rows.start as usize..rows.end as usize].iter();
    let first = *iter.next().expect("blocks are never empty");
    let kind = if iter.all(|k| *k == first) {
        first
    } else {
        RowKind::Changed
    };
    DifferenceBlock { rows, kind }
}

fn classify_row(
    cells: &[Option<u32>],
    panes: &[Pane],
    pool: &LinePool,
    policy: &EqualityPolicy,
    reference: usize,
) -> RowKind {
    let present: Vec<&str> = cells
        .iter()
        .enumerate()
        .filter_map(|(pane, cell)| {
            cell.map(|line| pool.resolve(panes[pane].lines()[line as usize].content))
        })
        .collect();

    let all_equal = present
        .windows(2)
        .all(|w| lines_equal(w[0], w[1], policy));

    if present.len() == cells.len() {
        return if all_equal {
            RowKind::Same
        } else {
            RowKind::Changed
        };
    }

    if policy.ignore_blank_lines && present.iter().all(|line| is_blank_line(line)) {
        return RowKind::Same;
    }

    if cells.get(reference).copied().flatten().is_none() {
        RowKind::Inserted
    } else {
        RowKind::Deleted
    }
}
