//! Merge operators over a selected difference block.
//!
//! Operators never mutate panes themselves. Each validates its inputs against
//! the current table and returns a [`LineEdit`] for the document to apply, so
//! a failed operation aborts before anything changes.

use std::ops::Range;

use thiserror::Error;

use crate::pane::Pane;
use crate::pool::LinePool;
use crate::table::AlignmentTable;

/// A single validated pane mutation: replace `range` in `pane` with
/// `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub pane: usize,
    pub range: Range<u32>,
    pub replacement: Vec<String>,
}

/// Errors from merge/selection commands; always raised before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RangeError {
    #[error(
        "[TXM_MERGE_001] rows {start}..{end} hold no content in the source pane; nothing to copy"
    )]
    NothingToCopy { start: u32, end: u32 },

    #[error("[TXM_MERGE_002] rows {start}..{end} exceed the table's {len} rows")]
    RowsOutOfRange { start: u32, end: u32, len: u32 },

    #[error("[TXM_MERGE_003] pane {pane} does not exist (document has {count} panes)")]
    PaneOutOfRange { pane: usize, count: usize },

    #[error("[TXM_MERGE_004] source and destination are both pane {pane}")]
    SamePane { pane: usize },
}

impl RangeError {
    pub fn code(&self) -> &'static str {
        match self {
            RangeError::NothingToCopy { .. } => "TXM_MERGE_001",
            RangeError::RowsOutOfRange { .. } => "TXM_MERGE_002",
            RangeError::PaneOutOfRange { .. } => "TXM_MERGE_003",
            RangeError::SamePane { .. } => "TXM_MERGE_004",
        }
    }
}

/// Replaces dst's lines in the row range with src's lines at those rows:
/// src gaps become deletions in dst, dst gaps become insertions.
pub(crate) fn copy_selection(
    table: &AlignmentTable,
    rows: Range<u32>,
    src: usize,
    dst: usize,
    panes: &[Pane],
    pool: &LinePool,
) -> Result<LineEdit, RangeError> {
    validate(table, &rows, src, dst, panes)?;

    let replacement: Vec<String> = table.rows[rows.start as usize..rows.end as usize]
        .iter()
        .filter_map(|row| row.line(src))
        .map(|line| pool.resolve(panes[src].lines()[line as usize].content).to_owned())
        .collect();

    if replacement.is_empty() {
        return Err(RangeError::NothingToCopy {
            start: rows.start,
            end: rows.end,
        });
    }

    Ok(LineEdit {
        pane: dst,
        range: dst_coverage(table, &rows, dst, panes),
        replacement,
    })
}

/// Union merge: per row, dst's line when present, else src's. Dst rows with
/// no src counterpart are kept, never deleted.
pub(crate) fn copy_into(
    table: &AlignmentTable,
    rows: Range<u32>,
    src: usize,
    dst: usize,
    panes: &[Pane],
    pool: &LinePool,
) -> Result<LineEdit, RangeError> {
    validate(table, &rows, src, dst, panes)?;

    let mut took_from_src = false;
    let mut replacement = Vec::new();
    for row in &table.rows[rows.start as usize..rows.end as usize] {
        if let Some(line) = row.line(dst) {
            replacement.push(pool.resolve(panes[dst].lines()[line as usize].content).to_owned());
        } else if let Some(line) = row.line(src) {
            replacement.push(pool.resolve(panes[src].lines()[line as usize].content).to_owned());
            took_from_src = true;
        }
    }

    if !took_from_src {
        return Err(RangeError::NothingToCopy {
            start: rows.start,
            end: rows.end,
        });
    }

    Ok(LineEdit {
        pane: dst,
        range: dst_coverage(table, &rows, dst, panes),
        replacement,
    })
}

fn validate(
    table: &AlignmentTable,
    rows: &Range<u32>,
    src: usize,
    dst: usize,
    panes: &[Pane],
) -> Result<(), RangeError> {
    for pane in [src, dst] {
        if pane >= panes.len() {
            return Err(RangeError::PaneOutOfRange {
                pane,
                count: panes.len(),
            });
        }
    }
    if src == dst {
        return Err(RangeError::SamePane { pane: src });
    }
    if rows.start >= rows.end || rows.end > table.row_count() {
        return Err(RangeError::RowsOutOfRange {
            start: rows.start,
            end: rows.end,
            len: table.row_count(),
        });
    }
    Ok(())
}

/// Dst's line range covered by the rows; an empty range at the insertion
/// point when dst has only gaps there.
fn dst_coverage(
    table: &AlignmentTable,
    rows: &Range<u32>,
    dst: usize,
    panes: &[Pane],
) -> Range<u32> {
    let mut first = None;
    let mut last = None;
    for row in &table.rows[rows.start as usize..rows.end as usize] {
        if let Some(line) = row.line(dst) {
            first.get_or_insert(line);
            last = Some(line);
        }
    }
    match (first, last) {
        (Some(first), Some(last)) => first..last + 1,
        _ => {
            let insert_at = table.rows[rows.end as usize..]
                .iter()
                .find_map(|row| row.line(dst))
                .unwrap_or_else(|| panes[dst].line_count());
            insert_at..insert_at
        }
    }
}
