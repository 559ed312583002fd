//! Serializable view-state descriptors for frontends.
//!
//! Read-only projections of a document for the presentation and highlighting
//! layers; nothing here can mutate core state.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::difference::RowKind;
use crate::document::{Document, EditState};

/// Summary of a document for chrome-level UI (tab title, status bar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub row_count: u32,
    pub block_count: usize,
    pub cursor: Option<usize>,
    pub state: EditState,
    pub reference: usize,
    pub dirty_panes: Vec<bool>,
}

/// One grid row with resolved text, for rendering and highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDescriptor {
    pub kind: RowKind,
    pub cells: Vec<Option<CellRef>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub line: u32,
    pub text: String,
    pub modified: bool,
}

pub fn view_state(doc: &Document) -> ViewState {
    ViewState {
        row_count: doc.table().row_count(),
        block_count: doc.differences().blocks().len(),
        cursor: doc.cursor(),
        state: doc.state(),
        reference: doc.reference(),
        dirty_panes: doc.panes().iter().map(|p| p.dirty()).collect(),
    }
}

/// Resolves a row range for redraw; the range is clamped to the table.
pub fn describe_rows(doc: &Document, rows: Range<u32>) -> Vec<RowDescriptor> {
    let end = rows.end.min(doc.table().row_count());
    (rows.start..end)
        .map(|row_idx| {
            let row = &doc.table().rows[row_idx as usize];
            RowDescriptor {
                kind: doc
                    .differences()
                    .kind_of_row(row_idx)
                    .unwrap_or(RowKind::Same),
                cells: row
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(pane, cell)| {
                        cell.map(|line| CellRef {
                            line,
                            text: doc.line_text(pane, line).to_owned(),
                            modified: doc.panes()[pane].lines()[line as usize].modified,
                        })
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlignConfig, EqualityPolicy};
    use crate::document::Command;
    use crate::pane::LineSequence;

    fn doc(panes: &[&[&str]]) -> Document {
        let sequences: Vec<LineSequence> = panes
            .iter()
            .enumerate()
            .map(|(idx, lines)| {
                LineSequence::new(
                    format!("pane{idx}"),
                    lines.iter().map(|s| s.to_string()).collect(),
                    Default::default(),
                )
            })
            .collect();
        Document::new(sequences, EqualityPolicy::default(), AlignConfig::default())
            .expect("document")
    }

    #[test]
    fn view_state_reflects_blocks_and_dirtiness() {
        let mut doc = doc(&[&["a", "b"], &["a", "x"]]);
        let state = view_state(&doc);
        assert_eq!(state.block_count, 1);
        assert_eq!(state.dirty_panes, vec![false, false]);

        doc.apply(Command::Edit {
            pane: 1,
            range: 1..2,
            lines: vec!["b".into()],
        })
        .expect("edit");
        let state = view_state(&doc);
        assert_eq!(state.block_count, 0);
        assert_eq!(state.dirty_panes, vec![false, true]);
    }

    #[test]
    fn describe_rows_resolves_text_and_gaps() {
        let doc = doc(&[&["a", "b"], &["a", "x", "b"]]);
        let rows = describe_rows(&doc, 0..10);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].kind, RowKind::Same);
        assert_eq!(rows[1].kind, RowKind::Inserted);
        assert!(rows[1].cells[0].is_none());
        let cell = rows[1].cells[1].as_ref().expect("present cell");
        assert_eq!(cell.text, "x");
        assert!(!cell.modified);
    }

    #[test]
    fn descriptors_serialize_for_the_frontend() {
        let doc = doc(&[&["a"], &["a"]]);
        let json = serde_json::to_string(&describe_rows(&doc, 0..1)).expect("serialize");
        assert!(json.contains("\"same\""));
    }
}
