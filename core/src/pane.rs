//! Pane and line data structures.
//!
//! A [`Pane`] is one text buffer participating in a comparison. Its content is
//! supplied by an external loader as a [`LineSequence`] and owned exclusively
//! by one document from then on. Lines keep their load-time line number until
//! an edit or merge replaces them.

use serde::{Deserialize, Serialize};

use crate::pool::{LineId, LinePool};

/// Opaque content identity supplied by a loader, used to detect external
/// changes to the underlying source between load and save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStamp(pub u64);

/// Loader-supplied content for one pane: the lines plus their identity stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSequence {
    pub source: String,
    pub lines: Vec<String>,
    pub stamp: ContentStamp,
}

impl LineSequence {
    pub fn new(source: impl Into<String>, lines: Vec<String>, stamp: ContentStamp) -> Self {
        Self {
            source: source.into(),
            lines,
            stamp,
        }
    }

    /// Splits raw text on `\n`, keeping any trailing `\r` on each line so the
    /// ignore-end-of-line policy has something to look at.
    pub fn from_text(source: impl Into<String>, text: &str) -> Self {
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n').map(str::to_owned).collect()
        };
        Self::new(source, lines, ContentStamp::default())
    }
}

/// One line of a pane: interned content, original line number, modified flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub content: LineId,
    /// Load-time line number; `None` once the line was introduced by an edit
    /// or merge.
    pub source_line: Option<u32>,
    pub modified: bool,
}

/// One text buffer under comparison. Owned exclusively by one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    label: String,
    stamp: ContentStamp,
    pub(crate) lines: Vec<Line>,
    pub(crate) dirty: bool,
}

impl Pane {
    pub(crate) fn from_sequence(seq: &LineSequence, pool: &mut LinePool) -> Self {
        let lines = seq
            .lines
            .iter()
            .enumerate()
            .map(|(idx, content)| Line {
                content: pool.intern(content),
                source_line: Some(idx as u32),
                modified: false,
            })
            .collect();
        Self {
            label: seq.source.clone(),
            stamp: seq.stamp,
            lines,
            dirty: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stamp(&self) -> ContentStamp {
        self.stamp
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    /// Modified since load (or since the last confirmed save).
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces `remove` lines at `at` with `inserted`, returning the removed
    /// lines for the undo record. Marks the pane dirty.
    pub(crate) fn splice(&mut self, at: u32, remove: u32, inserted: Vec<Line>) -> Vec<Line> {
        let at = at as usize;
        let removed: Vec<Line> = self
            .lines
            .splice(at..at + remove as usize, inserted)
            .collect();
        self.dirty = true;
        removed
    }

    pub(crate) fn restore(&mut self, lines: Vec<Line>, dirty: bool) {
        self.lines = lines;
        self.dirty = dirty;
    }

    pub(crate) fn mark_saved(&mut self) {
        self.dirty = false;
    }
}
