//! Merge commands: block copy, union merge, ordered multi-source merge.

mod common;

use common::{document, pane_text};
use text_merge::{Command, RangeError, CommandError};

#[test]
fn copy_block_replaces_destination_side() {
    let mut doc = document(&[&["a", "b", "c"], &["a", "x", "c"]]);
    let update = doc
        .apply(Command::CopyBlock {
            block: 0,
            src: 0,
            dst: 1,
        })
        .expect("copy");

    assert_eq!(pane_text(&doc, 1), vec!["a", "b", "c"]);
    assert!(doc.differences().is_empty());
    assert!(update.affected_rows.start <= 1 && update.affected_rows.end >= 2);
}

#[test]
fn copy_block_back_is_an_identity_on_the_source() {
    let mut doc = document(&[&["a", "b1", "b2", "c"], &["a", "x", "c"]]);
    let original_src = pane_text(&doc, 0);
    let block_rows = doc.differences().blocks()[0].rows.clone();

    doc.apply(Command::CopyBlock {
        block: 0,
        src: 0,
        dst: 1,
    })
    .expect("copy forward");
    assert_eq!(pane_text(&doc, 1), original_src);

    // Copying back over the same rows is the identity now.
    doc.apply(Command::CopyInto {
        src: 1,
        dst: 0,
        rows: block_rows,
    })
    .map(|_| ())
    .or_else(|err| match err {
        // The block became Same, so there may be nothing for src to add.
        CommandError::Range(RangeError::NothingToCopy { .. }) => Ok(()),
        other => Err(other),
    })
    .expect("copy back");
    assert_eq!(pane_text(&doc, 0), original_src);
}

#[test]
fn undo_restores_the_overwritten_side() {
    let mut doc = document(&[&["a", "b", "c"], &["a", "x", "c"]]);
    doc.apply(Command::CopyBlock {
        block: 0,
        src: 0,
        dst: 1,
    })
    .expect("copy");
    assert_eq!(pane_text(&doc, 1), vec!["a", "b", "c"]);

    doc.apply(Command::Undo).expect("undo");
    assert_eq!(pane_text(&doc, 1), vec!["a", "x", "c"]);
}

#[test]
fn copy_pure_insertion_block_into_the_shorter_pane() {
    let mut doc = document(&[&["a", "c"], &["a", "x1", "x2", "c"]]);
    doc.apply(Command::CopyBlock {
        block: 0,
        src: 1,
        dst: 0,
    })
    .expect("copy");
    assert_eq!(pane_text(&doc, 0), vec!["a", "x1", "x2", "c"]);
}

#[test]
fn copy_pure_deletion_block_removes_destination_lines() {
    let mut doc = document(&[&["a", "x1", "x2", "c"], &["a", "c"]]);
    let err = doc
        .apply(Command::CopyBlock {
            block: 0,
            src: 1,
            dst: 0,
        })
        .expect_err("source side of the block is all gaps");
    assert_eq!(err.code(), "TXM_MERGE_001");
    // Nothing moved.
    assert_eq!(pane_text(&doc, 0), vec!["a", "x1", "x2", "c"]);
}

#[test]
fn copy_into_keeps_destination_only_rows() {
    let mut doc = document(&[&["a", "mine", "c"], &["a", "theirs", "c"]]);
    let rows = doc.differences().blocks()[0].rows.clone();
    doc.apply(Command::CopyInto {
        src: 1,
        dst: 0,
        rows,
    })
    .map(|_| ())
    .or_else(|err| match err {
        CommandError::Range(RangeError::NothingToCopy { .. }) => Ok(()),
        other => Err(other),
    })
    .expect("union merge");
    // "mine" is present in dst at that row, so the union keeps it.
    assert_eq!(pane_text(&doc, 0), vec!["a", "mine", "c"]);
}

#[test]
fn copy_into_adds_source_only_rows_without_deleting() {
    let mut doc = document(&[&["a", "keep", "c"], &["a", "extra", "keep", "c"]]);
    // Block is the "extra" insertion row.
    let rows = doc.differences().blocks()[0].rows.clone();
    doc.apply(Command::CopyInto {
        src: 1,
        dst: 0,
        rows,
    })
    .expect("union merge");
    assert_eq!(pane_text(&doc, 0), vec!["a", "extra", "keep", "c"]);
}

#[test]
fn ordered_merge_later_source_wins_on_conflict() {
    // left / base / right; merge left then right into the base pane.
    let mut doc = document(&[&["1", "2"], &["1", "X", "2"], &["1", "Y", "2"]]);
    let update = doc
        .apply(Command::MergeOrdered {
            first: 0,
            second: 2,
            dst: 1,
        })
        .expect("ordered merge");

    assert_eq!(pane_text(&doc, 1), vec!["1", "Y", "2"]);
    // The left pass had nothing to copy on the conflict row.
    assert!(!update.warnings.is_empty());
}

#[test]
fn ordered_merge_applies_non_conflicting_changes_from_both() {
    let mut doc = document(&[
        &["a", "L", "b", "c", "d"],
        &["a", "b", "c", "d"],
        &["a", "b", "c", "R", "d"],
    ]);
    doc.apply(Command::MergeOrdered {
        first: 0,
        second: 2,
        dst: 1,
    })
    .expect("ordered merge");
    assert_eq!(pane_text(&doc, 1), vec!["a", "L", "b", "c", "R", "d"]);
}

#[test]
fn ordered_merge_is_one_undo_step() {
    let mut doc = document(&[&["1", "2"], &["1", "X", "2"], &["1", "Y", "2"]]);
    doc.apply(Command::MergeOrdered {
        first: 0,
        second: 2,
        dst: 1,
    })
    .expect("ordered merge");
    assert_eq!(doc.history().undo_depth(), 1);

    doc.apply(Command::Undo).expect("undo");
    assert_eq!(pane_text(&doc, 1), vec!["1", "X", "2"]);
}

#[test]
fn merge_into_the_source_pane_is_rejected() {
    let mut doc = document(&[&["a"], &["b"]]);
    let err = doc
        .apply(Command::MergeOrdered {
            first: 0,
            second: 1,
            dst: 1,
        })
        .expect_err("second == dst");
    assert_eq!(err.code(), "TXM_MERGE_004");
}
