//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use text_merge::{AlignConfig, Command, Document, EqualityPolicy, LineSequence};

pub fn sequences(panes: &[&[&str]]) -> Vec<LineSequence> {
    panes
        .iter()
        .enumerate()
        .map(|(idx, lines)| {
            LineSequence::new(
                format!("pane{idx}.txt"),
                lines.iter().map(|s| s.to_string()).collect(),
                Default::default(),
            )
        })
        .collect()
}

pub fn document(panes: &[&[&str]]) -> Document {
    Document::new(
        sequences(panes),
        EqualityPolicy::default(),
        AlignConfig::default(),
    )
    .expect("document should open")
}

pub fn document_with_policy(panes: &[&[&str]], policy: EqualityPolicy) -> Document {
    Document::new(sequences(panes), policy, AlignConfig::default())
        .expect("document should open")
}

/// Pane content as plain strings, for asserting merge/undo outcomes.
pub fn pane_text(doc: &Document, pane: usize) -> Vec<String> {
    (0..doc.panes()[pane].line_count())
        .map(|line| doc.line_text(pane, line).to_owned())
        .collect()
}

pub fn edit(doc: &mut Document, pane: usize, range: std::ops::Range<u32>, lines: &[&str]) {
    doc.apply(Command::Edit {
        pane,
        range,
        lines: lines.iter().map(|s| s.to_string()).collect(),
    })
    .expect("edit should apply");
}
