//! Incremental recomputation: equivalence with full recompute and locality.

mod common;

use common::{document, edit, pane_text, sequences};
use text_merge::{
    AlignConfig, Command, Document, EqualityPolicy,
};

/// A document rebuilt from the current pane text must align identically to
/// the incrementally-maintained one.
fn assert_matches_fresh_recompute(doc: &Document) {
    let panes: Vec<Vec<String>> = (0..doc.pane_count()).map(|p| pane_text(doc, p)).collect();
    let pane_refs: Vec<Vec<&str>> = panes
        .iter()
        .map(|lines| lines.iter().map(String::as_str).collect())
        .collect();
    let slices: Vec<&[&str]> = pane_refs.iter().map(Vec::as_slice).collect();

    let fresh = text_merge::align(
        &sequences(&slices),
        doc.pins(),
        doc.isolations(),
        doc.policy(),
        doc.config(),
    )
    .expect("fresh alignment");
    assert_eq!(doc.table(), &fresh);
}

#[test]
fn edits_between_pins_match_a_full_recompute() {
    let mut doc = document(&[
        &["h1", "a", "b", "mid", "c", "d", "h2"],
        &["h1", "a", "b", "mid", "c", "d", "h2"],
    ]);
    doc.apply(Command::Pin {
        lines: vec![3, 3],
    })
    .expect("pin");

    // Replacement below the pin.
    edit(&mut doc, 0, 5..6, &["D1", "D2"]);
    assert_matches_fresh_recompute(&doc);

    // Insertion above the pin (shifts it).
    edit(&mut doc, 1, 1..1, &["pre"]);
    assert_matches_fresh_recompute(&doc);

    // Deletion at the very top.
    edit(&mut doc, 0, 0..1, &[]);
    assert_matches_fresh_recompute(&doc);
}

#[test]
fn edit_below_a_pin_leaves_rows_above_untouched() {
    let mut doc = document(&[
        &["a", "b", "anchor", "c", "d"],
        &["a", "B", "anchor", "c", "d"],
    ]);
    doc.apply(Command::Pin {
        lines: vec![2, 2],
    })
    .expect("pin");
    let pin_row = doc.table().pin_rows[0];
    let rows_above: Vec<_> = doc.table().rows[..pin_row as usize].to_vec();

    let update = doc
        .apply(Command::Edit {
            pane: 0,
            range: 4..5,
            lines: vec!["edited".into()],
        })
        .expect("edit");

    // The reported span stays below the pin.
    assert!(update.affected_rows.start > pin_row);
    assert_eq!(&doc.table().rows[..pin_row as usize], rows_above.as_slice());
    assert_matches_fresh_recompute(&doc);
}

#[test]
fn merge_commands_keep_the_table_consistent() {
    let mut doc = document(&[
        &["a", "left", "b", "c"],
        &["a", "b", "right", "c"],
    ]);
    doc.apply(Command::CopyBlock {
        block: 0,
        src: 0,
        dst: 1,
    })
    .expect("copy");
    assert_matches_fresh_recompute(&doc);

    doc.apply(Command::Undo).expect("undo");
    assert_matches_fresh_recompute(&doc);
}

#[test]
fn repeated_small_edits_never_corrupt_coverage() {
    let base: Vec<String> = (0..60).map(|i| format!("line {i}")).collect();
    let base_refs: Vec<&str> = base.iter().map(String::as_str).collect();
    let mut doc = Document::new(
        sequences(&[&base_refs, &base_refs]),
        EqualityPolicy::default(),
        AlignConfig::default(),
    )
    .expect("document");

    doc.apply(Command::Pin {
        lines: vec![20, 20],
    })
    .expect("pin");
    doc.apply(Command::Pin {
        lines: vec![40, 40],
    })
    .expect("pin");

    for at in [5u32, 25, 45, 0, 59] {
        edit(&mut doc, 0, at..at + 1, &["churn", "more churn"]);
        assert_matches_fresh_recompute(&doc);
    }

    let lens: Vec<u32> = doc.panes().iter().map(|p| p.line_count()).collect();
    assert_eq!(doc.table().invariant_violation(&lens), None);
}
