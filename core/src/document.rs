//! One open comparison: panes, alignment state, history, and the command
//! surface exposed to the presentation layer.
//!
//! Commands are explicit tagged variants processed by [`Document::apply`];
//! nothing here knows about menus or widgets. Every mutating command follows
//! the same shape: validate, build the mutation and its inverse, apply,
//! realign (incrementally where the edit allows it), push one transaction,
//! and report the affected rows for redraw.
//!
//! A failed command never leaves partially-mutated state: everything fallible
//! runs before the first mutation (check-then-act), and candidate pin sets are
//! aligned before they are committed, so the previous table survives any
//! rejected realignment.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alignment::{self, SpliceEdit};
use crate::config::{AlignConfig, EqualityPolicy, LimitBehavior};
use crate::difference::{DifferenceIndex, Direction, NavResult};
use crate::line_view::PaneView;
use crate::merge::{self, LineEdit, RangeError};
use crate::pane::{Line, LineSequence, Pane};
use crate::pool::LinePool;
use crate::table::{AlignmentError, AlignmentTable, Isolation, Pin};
use crate::undo::{Splice, Transaction, UndoStack};

/// Lifecycle of a document's content relative to the last confirmed save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    Clean,
    /// A mutating command is in flight.
    Editing,
    Dirty,
}

/// The full command surface exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace a line range of one pane with new content.
    Edit {
        pane: usize,
        range: Range<u32>,
        lines: Vec<String>,
    },
    /// Force a correspondence (one line per pane) as a mandatory row.
    Pin { lines: Vec<u32> },
    /// Remove the pin at the given position in the pin list.
    Unpin { pin: usize },
    /// Exclude a pane-local range from cross-pane matching.
    Isolate { pane: usize, range: Range<u32> },
    /// Drop all pins and isolations and recompute from scratch.
    RealignAll,
    Navigate { direction: Direction },
    /// Replace dst's side of a difference block with src's.
    CopyBlock {
        block: usize,
        src: usize,
        dst: usize,
    },
    /// Union-merge src's lines into a chosen row range of dst.
    CopyInto {
        src: usize,
        dst: usize,
        rows: Range<u32>,
    },
    /// Copy every block from `first` into `dst`, realign, then repeat from
    /// `second`; the second pass wins on overlap.
    MergeOrdered {
        first: usize,
        second: usize,
        dst: usize,
    },
    Undo,
    Redo,
    /// Revert every pane to its load-time content and clear the history.
    DismissAllEdits,
}

/// Redraw descriptor returned by every successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewUpdate {
    pub affected_rows: Range<u32>,
    pub cursor: Option<usize>,
    pub wrapped: bool,
    pub state: EditState,
    pub warnings: Vec<String>,
}

/// Errors crossing the command boundary; each aborts before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CommandError {
    #[error("[TXM_CMD_001] pane {pane} does not exist (document has {count} panes)")]
    PaneOutOfRange { pane: usize, count: usize },

    #[error("[TXM_CMD_002] lines {start}..{end} exceed pane {pane}'s {len} lines")]
    LineRangeOutOfBounds {
        pane: usize,
        start: u32,
        end: u32,
        len: u32,
    },

    #[error("[TXM_CMD_003] difference block {block} does not exist ({count} blocks)")]
    BlockOutOfRange { block: usize, count: usize },

    #[error("[TXM_CMD_004] pin {pin} does not exist ({count} pins)")]
    PinOutOfRange { pin: usize, count: usize },

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error(transparent)]
    Range(#[from] RangeError),
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::PaneOutOfRange { .. } => "TXM_CMD_001",
            CommandError::LineRangeOutOfBounds { .. } => "TXM_CMD_002",
            CommandError::BlockOutOfRange { .. } => "TXM_CMD_003",
            CommandError::PinOutOfRange { .. } => "TXM_CMD_004",
            CommandError::Alignment(inner) => inner.code(),
            CommandError::Range(inner) => inner.code(),
        }
    }
}

/// Captures the content revision an out-of-band alignment was started from;
/// results are only installable while the revision still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentTicket {
    revision: u64,
}

struct Draft {
    label: &'static str,
    pins_before: Vec<Pin>,
    isolations_before: Vec<Isolation>,
    table_before: AlignmentTable,
    dirty_before: Vec<bool>,
    cursor_before: Option<usize>,
}

pub struct Document {
    panes: Vec<Pane>,
    baselines: Vec<Vec<Line>>,
    pool: LinePool,
    views: Vec<PaneView>,
    policy: EqualityPolicy,
    config: AlignConfig,
    pins: Vec<Pin>,
    isolations: Vec<Isolation>,
    table: AlignmentTable,
    index: DifferenceIndex,
    reference: usize,
    cursor: Option<usize>,
    undo: UndoStack,
    state: EditState,
    saved_depth: Option<usize>,
    revision: u64,
}

impl Document {
    /// Opens a comparison over loader-supplied sequences. The sequences are
    /// materialized into panes owned exclusively by this document.
    pub fn new(
        sequences: Vec<LineSequence>,
        policy: EqualityPolicy,
        config: AlignConfig,
    ) -> Result<Document, AlignmentError> {
        let mut pool = LinePool::new();
        let panes: Vec<Pane> = sequences
            .iter()
            .map(|seq| Pane::from_sequence(seq, &mut pool))
            .collect();
        let baselines: Vec<Vec<Line>> = panes.iter().map(|p| p.lines().to_vec()).collect();
        let views = alignment::build_views(&panes, &pool, &policy, &[]);
        let mut table = alignment::compute(&views, &[], &config)?;
        table.set_revision(1);
        let index = DifferenceIndex::build(&table, &panes, &pool, &policy, 0);

        Ok(Document {
            panes,
            baselines,
            pool,
            views,
            policy,
            config,
            pins: Vec::new(),
            isolations: Vec::new(),
            table,
            index,
            reference: 0,
            cursor: None,
            undo: UndoStack::default(),
            state: EditState::Clean,
            saved_depth: Some(0),
            revision: 1,
        })
    }

    pub fn apply(&mut self, command: Command) -> Result<ViewUpdate, CommandError> {
        match command {
            Command::Edit { pane, range, lines } => self.edit(pane, range, lines),
            Command::Pin { lines } => self.pin(lines),
            Command::Unpin { pin } => self.unpin(pin),
            Command::Isolate { pane, range } => self.isolate(pane, range),
            Command::RealignAll => self.realign_all(),
            Command::Navigate { direction } => Ok(self.navigate(direction)),
            Command::CopyBlock { block, src, dst } => self.copy_block(block, src, dst),
            Command::CopyInto { src, dst, rows } => self.copy_into(src, dst, rows),
            Command::MergeOrdered { first, second, dst } => {
                self.merge_ordered(first, second, dst)
            }
            Command::Undo => Ok(self.undo_command()),
            Command::Redo => Ok(self.redo_command()),
            Command::DismissAllEdits => self.dismiss_all_edits(),
        }
    }

    // ---- accessors -------------------------------------------------------

    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn line_text(&self, pane: usize, line: u32) -> &str {
        self.pool
            .resolve(self.panes[pane].lines()[line as usize].content)
    }

    pub fn table(&self) -> &AlignmentTable {
        &self.table
    }

    pub fn differences(&self) -> &DifferenceIndex {
        &self.index
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn isolations(&self) -> &[Isolation] {
        &self.isolations
    }

    pub fn policy(&self) -> &EqualityPolicy {
        &self.policy
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    pub fn reference(&self) -> usize {
        self.reference
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn history(&self) -> &UndoStack {
        &self.undo
    }

    // ---- non-command configuration --------------------------------------

    /// Changes the equality options; full recompute and re-classification.
    /// Not undoable.
    pub fn set_policy(&mut self, policy: EqualityPolicy) -> Result<(), AlignmentError> {
        let views = alignment::build_views(&self.panes, &self.pool, &policy, &self.isolations);
        let mut table = alignment::compute(&views, &self.pins, &self.config)?;
        self.policy = policy;
        self.views = views;
        table.set_revision(self.revision);
        self.table = table;
        self.rebuild_index();
        Ok(())
    }

    pub fn set_reference(&mut self, pane: usize) -> Result<(), CommandError> {
        self.check_pane(pane)?;
        self.reference = pane;
        self.rebuild_index();
        Ok(())
    }

    /// Content-plus-dirty-flag projection of one pane for the persistence
    /// collaborator.
    pub fn pane_snapshot(&self, pane: usize) -> Result<crate::collab::PaneSnapshot, CommandError> {
        self.check_pane(pane)?;
        let p = &self.panes[pane];
        Ok(crate::collab::PaneSnapshot {
            pane,
            label: p.label().to_owned(),
            lines: p
                .lines()
                .iter()
                .map(|line| self.pool.resolve(line.content).to_owned())
                .collect(),
            dirty: p.dirty(),
            stamp: p.stamp(),
        })
    }

    /// Confirmation from the external persistence collaborator that the
    /// current content reached storage; the only `Dirty -> Clean` transition.
    pub fn confirm_saved(&mut self) {
        for pane in &mut self.panes {
            pane.mark_saved();
        }
        self.saved_depth = Some(self.undo.undo_depth());
        self.state = EditState::Clean;
    }

    // ---- stale-result handling (logical cancellation) --------------------

    pub fn alignment_ticket(&self) -> AlignmentTicket {
        AlignmentTicket {
            revision: self.revision,
        }
    }

    /// Pure full computation against current state; pair with a ticket when
    /// running it between user events.
    pub fn compute_detached(&self) -> Result<AlignmentTable, AlignmentError> {
        alignment::compute(&self.views, &self.pins, &self.config)
    }

    /// Installs an out-of-band result unless the document moved on since the
    /// ticket was taken. Stale results are discarded, never applied.
    pub fn try_install_table(&mut self, ticket: AlignmentTicket, mut table: AlignmentTable) -> bool {
        if ticket.revision != self.revision {
            return false;
        }
        table.set_revision(self.revision);
        self.table = table;
        self.rebuild_index();
        true
    }

    // ---- command handlers ------------------------------------------------

    fn edit(
        &mut self,
        pane: usize,
        range: Range<u32>,
        lines: Vec<String>,
    ) -> Result<ViewUpdate, CommandError> {
        self.check_pane(pane)?;
        self.check_range(pane, &range)?;
        let new_len =
            self.panes[pane].line_count() - (range.end - range.start) + lines.len() as u32;
        self.check_capacity(new_len)?;

        let draft = self.begin("edit");
        let structural = self.adjust_pins_isolations(pane, &range, lines.len() as u32);
        let splice = self.splice_pane(pane, range.start, range.end - range.start, &lines);
        let edit = SpliceEdit {
            pane,
            at: range.start,
            removed: range.end - range.start,
            inserted: lines.len() as u32,
        };
        let affected = self.realign_spliced(structural, &edit)?;
        self.commit(draft, vec![splice]);
        Ok(self.update(affected, false))
    }

    fn pin(&mut self, lines: Vec<u32>) -> Result<ViewUpdate, CommandError> {
        // Build and align the candidate pin set before committing anything.
        let mut candidate = self.pins.clone();
        let position = candidate.partition_point(|pin| pin.lines[0] < *lines.first().unwrap_or(&0));
        candidate.insert(position, Pin { lines });
        let mut table = alignment::compute(&self.views, &candidate, &self.config)?;

        let draft = self.begin("pin");
        self.pins = candidate;
        self.revision += 1;
        table.set_revision(self.revision);
        self.table = table;
        self.rebuild_index();
        self.commit(draft, Vec::new());
        Ok(self.update(0..self.table.row_count(), false))
    }

    fn unpin(&mut self, pin: usize) -> Result<ViewUpdate, CommandError> {
        if pin >= self.pins.len() {
            return Err(CommandError::PinOutOfRange {
                pin,
                count: self.pins.len(),
            });
        }

        let mut candidate = self.pins.clone();
        candidate.remove(pin);
        let mut table = alignment::compute(&self.views, &candidate, &self.config)?;

        let draft = self.begin("unpin");
        self.pins = candidate;
        self.revision += 1;
        table.set_revision(self.revision);
        self.table = table;
        self.rebuild_index();
        self.commit(draft, Vec::new());
        Ok(self.update(0..self.table.row_count(), false))
    }

    fn isolate(&mut self, pane: usize, range: Range<u32>) -> Result<ViewUpdate, CommandError> {
        self.check_pane(pane)?;
        self.check_range(pane, &range)?;

        let mut candidate = self.isolations.clone();
        candidate.push(Isolation {
            pane: pane as u32,
            range,
        });
        let views = alignment::build_views(&self.panes, &self.pool, &self.policy, &candidate);
        let mut table = alignment::compute(&views, &self.pins, &self.config)?;

        let draft = self.begin("isolate");
        self.isolations = candidate;
        self.views = views;
        self.revision += 1;
        table.set_revision(self.revision);
        self.table = table;
        self.rebuild_index();
        self.commit(draft, Vec::new());
        Ok(self.update(0..self.table.row_count(), false))
    }

    fn realign_all(&mut self) -> Result<ViewUpdate, CommandError> {
        let views = alignment::build_views(&self.panes, &self.pool, &self.policy, &[]);
        let mut table = alignment::compute(&views, &[], &self.config)?;

        let draft = self.begin("realign_all");
        self.pins.clear();
        self.isolations.clear();
        self.views = views;
        self.revision += 1;
        table.set_revision(self.revision);
        self.table = table;
        self.rebuild_index();
        self.commit(draft, Vec::new());
        Ok(self.update(0..self.table.row_count(), false))
    }

    fn navigate(&mut self, direction: Direction) -> ViewUpdate {
        let NavResult { block, wrapped } = self.index.navigate(self.cursor, direction);
        self.cursor = block;
        self.update(0..0, wrapped)
    }

    fn copy_block(
        &mut self,
        block: usize,
        src: usize,
        dst: usize,
    ) -> Result<ViewUpdate, CommandError> {
        let rows = self
            .index
            .block(block)
            .ok_or(CommandError::BlockOutOfRange {
                block,
                count: self.index.blocks().len(),
            })?
            .rows
            .clone();
        let edit = merge::copy_selection(&self.table, rows, src, dst, &self.panes, &self.pool)?;
        self.apply_merge_edit("copy_block", edit)
    }

    fn copy_into(
        &mut self,
        src: usize,
        dst: usize,
        rows: Range<u32>,
    ) -> Result<ViewUpdate, CommandError> {
        let edit = merge::copy_into(&self.table, rows, src, dst, &self.panes, &self.pool)?;
        self.apply_merge_edit("copy_into", edit)
    }

    /// Applies one planned merge edit with the same realignment path as a
    /// plain content edit.
    fn apply_merge_edit(
        &mut self,
        label: &'static str,
        edit: LineEdit,
    ) -> Result<ViewUpdate, CommandError> {
        let pane = edit.pane;
        let new_len = self.panes[pane].line_count() - (edit.range.end - edit.range.start)
            + edit.replacement.len() as u32;
        self.check_capacity(new_len)?;

        let draft = self.begin(label);
        let structural =
            self.adjust_pins_isolations(pane, &edit.range, edit.replacement.len() as u32);
        let splice = self.splice_pane(
            pane,
            edit.range.start,
            edit.range.end - edit.range.start,
            &edit.replacement,
        );
        let splice_edit = SpliceEdit {
            pane,
            at: edit.range.start,
            removed: edit.range.end - edit.range.start,
            inserted: edit.replacement.len() as u32,
        };
        let affected = self.realign_spliced(structural, &splice_edit)?;
        self.commit(draft, vec![splice]);
        Ok(self.update(affected, false))
    }

    fn merge_ordered(
        &mut self,
        first: usize,
        second: usize,
        dst: usize,
    ) -> Result<ViewUpdate, CommandError> {
        for pane in [first, second, dst] {
            self.check_pane(pane)?;
        }
        for src in [first, second] {
            if src == dst {
                return Err(CommandError::Range(RangeError::SamePane { pane: src }));
            }
        }
        // Coarse growth bound: dst can at most gain every source line.
        let source_total: u32 =
            self.panes[first].line_count() + self.panes[second].line_count();
        self.check_capacity(self.panes[dst].line_count() + source_total)?;

        let draft = self.begin("merge_ordered");
        let mut splices = Vec::new();
        let mut skipped = 0u32;

        for source in [first, second] {
            // Blocks are re-derived per pass; the second pass sees (and
            // overwrites) what the first one wrote.
            let blocks: Vec<Range<u32>> = self
                .index
                .blocks()
                .iter()
                .map(|b| b.rows.clone())
                .collect();
            for rows in blocks.into_iter().rev() {
                match merge::copy_selection(
                    &self.table,
                    rows,
                    source,
                    dst,
                    &self.panes,
                    &self.pool,
                ) {
                    Ok(edit) => {
                        self.adjust_pins_isolations(
                            edit.pane,
                            &edit.range,
                            edit.replacement.len() as u32,
                        );
                        splices.push(self.splice_pane(
                            edit.pane,
                            edit.range.start,
                            edit.range.end - edit.range.start,
                            &edit.replacement,
                        ));
                    }
                    Err(RangeError::NothingToCopy { .. }) => skipped += 1,
                    Err(other) => return Err(other.into()),
                }
            }

            self.views =
                alignment::build_views(&self.panes, &self.pool, &self.policy, &self.isolations);
            let mut table = alignment::compute(&self.views, &self.pins, &self.config)?;
            self.revision += 1;
            table.set_revision(self.revision);
            self.table = table;
            self.rebuild_index();
        }

        self.commit(draft, splices);
        let mut update = self.update(0..self.table.row_count(), false);
        if skipped > 0 {
            update
                .warnings
                .push(format!("{skipped} block(s) had no source content and were skipped"));
        }
        Ok(update)
    }

    fn undo_command(&mut self) -> ViewUpdate {
        let Some(transaction) = self.undo.pop_undo() else {
            return self.update(0..0, false);
        };

        for splice in transaction.splices.iter().rev() {
            self.panes[splice.pane].splice(
                splice.at,
                splice.inserted.len() as u32,
                splice.removed.clone(),
            );
        }
        self.restore_alignment_state(
            transaction.pins_before.clone(),
            transaction.isolations_before.clone(),
            transaction.table_before.clone(),
            &transaction.dirty_before,
            transaction.cursor_before,
        );
        self.undo.park_undone(transaction);
        self.refresh_state();
        self.update(0..self.table.row_count(), false)
    }

    fn redo_command(&mut self) -> ViewUpdate {
        let Some(transaction) = self.undo.pop_redo() else {
            return self.update(0..0, false);
        };

        for splice in &transaction.splices {
            self.panes[splice.pane].splice(
                splice.at,
                splice.removed.len() as u32,
                splice.inserted.clone(),
            );
        }
        self.restore_alignment_state(
            transaction.pins_after.clone(),
            transaction.isolations_after.clone(),
            transaction.table_after.clone(),
            &transaction.dirty_after,
            transaction.cursor_after,
        );
        self.undo.park_redone(transaction);
        self.refresh_state();
        self.update(0..self.table.row_count(), false)
    }

    fn dismiss_all_edits(&mut self) -> Result<ViewUpdate, CommandError> {
        // Baseline lengths were accepted at load, so this compute is checked
        // before any state is touched.
        let restored: Vec<Pane> = self
            .panes
            .iter()
            .zip(&self.baselines)
            .map(|(pane, baseline)| {
                let mut pane = pane.clone();
                pane.restore(baseline.clone(), false);
                pane
            })
            .collect();
        let views = alignment::build_views(&restored, &self.pool, &self.policy, &[]);
        let mut table = alignment::compute(&views, &[], &self.config)?;

        self.panes = restored;
        self.pins.clear();
        self.isolations.clear();
        self.undo.clear();
        self.cursor = None;
        self.revision += 1;
        table.set_revision(self.revision);
        self.table = table;
        self.views = views;
        self.rebuild_index();
        self.saved_depth = Some(0);
        self.state = EditState::Clean;
        Ok(self.update(0..self.table.row_count(), false))
    }

    // ---- internals -------------------------------------------------------

    fn check_pane(&self, pane: usize) -> Result<(), CommandError> {
        if pane >= self.panes.len() {
            return Err(CommandError::PaneOutOfRange {
                pane,
                count: self.panes.len(),
            });
        }
        Ok(())
    }

    fn check_range(&self, pane: usize, range: &Range<u32>) -> Result<(), CommandError> {
        let len = self.panes[pane].line_count();
        if range.start > range.end || range.end > len {
            return Err(CommandError::LineRangeOutOfBounds {
                pane,
                start: range.start,
                end: range.end,
                len,
            });
        }
        Ok(())
    }

    /// Pre-mutation limit check, so a post-mutation realignment can never be
    /// the first thing to fail.
    fn check_capacity(&self, new_len: u32) -> Result<(), CommandError> {
        if new_len > self.config.max_align_lines
            && self.config.on_limit_exceeded == LimitBehavior::ReturnError
        {
            return Err(CommandError::Alignment(AlignmentError::LimitsExceeded {
                lines: new_len,
                max_lines: self.config.max_align_lines,
            }));
        }
        Ok(())
    }

    fn begin(&mut self, label: &'static str) -> Draft {
        self.state = EditState::Editing;
        Draft {
            label,
            pins_before: self.pins.clone(),
            isolations_before: self.isolations.clone(),
            table_before: self.table.clone(),
            dirty_before: self.panes.iter().map(|p| p.dirty()).collect(),
            cursor_before: self.cursor,
        }
    }

    fn commit(&mut self, draft: Draft, splices: Vec<Splice>) {
        // A saved point that only lived in the discarded redo branch is gone.
        if let Some(depth) = self.saved_depth {
            if depth > self.undo.undo_depth() {
                self.saved_depth = None;
            }
        }
        self.undo.push(Transaction {
            label: draft.label,
            splices,
            pins_before: draft.pins_before,
            pins_after: self.pins.clone(),
            isolations_before: draft.isolations_before,
            isolations_after: self.isolations.clone(),
            table_before: draft.table_before,
            table_after: self.table.clone(),
            dirty_before: draft.dirty_before,
            dirty_after: self.panes.iter().map(|p| p.dirty()).collect(),
            cursor_before: draft.cursor_before,
            cursor_after: self.cursor,
        });
        self.refresh_state();
    }

    fn refresh_state(&mut self) {
        self.state = if self.saved_depth == Some(self.undo.undo_depth()) {
            EditState::Clean
        } else {
            EditState::Dirty
        };
    }

    /// Drops pins/isolations invalidated by an edit and shifts the rest.
    /// Returns true when something beyond plain shifting changed, which
    /// forces a full (rather than incremental) realignment.
    fn adjust_pins_isolations(&mut self, pane: usize, range: &Range<u32>, inserted: u32) -> bool {
        let delta = inserted as i64 - (range.end - range.start) as i64;
        let mut structural = false;

        self.pins.retain(|pin| {
            let hit = pin.lines[pane] >= range.start && pin.lines[pane] < range.end;
            if hit {
                structural = true;
            }
            !hit
        });
        for pin in &mut self.pins {
            if pin.lines[pane] >= range.end {
                pin.lines[pane] = (pin.lines[pane] as i64 + delta) as u32;
            }
        }

        let mut kept = Vec::with_capacity(self.isolations.len());
        for mut iso in std::mem::take(&mut self.isolations) {
            if iso.pane as usize != pane || iso.range.end <= range.start {
                kept.push(iso);
            } else if iso.range.start >= range.end {
                iso.range = ((iso.range.start as i64 + delta) as u32)
                    ..((iso.range.end as i64 + delta) as u32);
                kept.push(iso);
            } else {
                // The edit reached into the isolated region; its extent is no
                // longer meaningful.
                structural = true;
            }
        }
        self.isolations = kept;

        structural
    }

    fn splice_pane(&mut self, pane: usize, at: u32, remove: u32, replacement: &[String]) -> Splice {
        let inserted: Vec<Line> = replacement
            .iter()
            .map(|content| Line {
                content: self.pool.intern(content),
                source_line: None,
                modified: true,
            })
            .collect();
        let removed = self.panes[pane].splice(at, remove, inserted.clone());
        let Document {
            views,
            panes,
            pool,
            policy,
            isolations,
            ..
        } = self;
        views[pane].splice(
            at,
            remove,
            inserted.len() as u32,
            pane,
            &panes[pane],
            pool,
            policy,
            isolations,
        );
        Splice {
            pane,
            at,
            removed,
            inserted,
        }
    }

    /// Realigns after a single-pane splice: incrementally when the edit's
    /// segment is intact, fully when pins or isolations were dropped.
    fn realign_spliced(
        &mut self,
        structural: bool,
        edit: &SpliceEdit,
    ) -> Result<Range<u32>, CommandError> {
        self.revision += 1;
        if structural {
            self.views =
                alignment::build_views(&self.panes, &self.pool, &self.policy, &self.isolations);
            let mut table = alignment::compute(&self.views, &self.pins, &self.config)?;
            table.set_revision(self.revision);
            self.table = table;
            self.rebuild_index();
            return Ok(0..self.table.row_count());
        }

        let mut table = alignment::compute_incremental(
            &self.table,
            &self.views,
            &self.pins,
            &self.config,
            edit,
        )?;
        table.set_revision(self.revision);
        self.table = table;
        self.rebuild_index();
        Ok(self.segment_rows(edit.pane, edit.at))
    }

    /// Row span of the pin-bounded segment containing a line of one pane.
    fn segment_rows(&self, pane: usize, at: u32) -> Range<u32> {
        let k = self.pins.partition_point(|pin| pin.lines[pane] < at);
        let start = if k == 0 {
            0
        } else {
            self.table.pin_rows[k - 1] + 1
        };
        let end = self
            .table
            .pin_rows
            .get(k)
            .copied()
            .unwrap_or_else(|| self.table.row_count());
        start..end
    }

    fn restore_alignment_state(
        &mut self,
        pins: Vec<Pin>,
        isolations: Vec<Isolation>,
        table: AlignmentTable,
        dirty: &[bool],
        cursor: Option<usize>,
    ) {
        self.pins = pins;
        self.isolations = isolations;
        self.revision += 1;
        let mut table = table;
        table.set_revision(self.revision);
        self.table = table;
        for (pane, &was_dirty) in self.panes.iter_mut().zip(dirty) {
            if !was_dirty {
                pane.mark_saved();
            }
        }
        self.cursor = cursor;
        self.views =
            alignment::build_views(&self.panes, &self.pool, &self.policy, &self.isolations);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index =
            DifferenceIndex::build(&self.table, &self.panes, &self.pool, &self.policy, self.reference);
        if let Some(cursor) = self.cursor {
            if cursor >= self.index.blocks().len() {
                self.cursor = None;
            }
        }
    }

    fn update(&self, affected_rows: Range<u32>, wrapped: bool) -> ViewUpdate {
        ViewUpdate {
            affected_rows,
            cursor: self.cursor,
            wrapped,
            state: self.state,
            warnings: Vec::new(),
        }
    }
}
