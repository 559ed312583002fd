//! Folding pairwise alignments into the common N-way grid.
//!
//! Pane 0 of each segment acts as the reference. Reference lines matched by
//! at least one pane become anchor rows; between consecutive anchor rows each
//! pane's unmatched run is laid out top-aligned, so the k-th leftover line of
//! every pane shares a row. With two panes this reproduces the classic
//! side-by-side layout where a deleted run and an inserted run pair up into
//! changed rows.

use crate::alignment::pairwise::PairAlignment;
use crate::line_view::LineMeta;
use crate::table::AlignmentRow;

/// `slices[0]` is the reference; `pairs[i]` aligns it with `slices[i + 1]`.
/// All indices are absolute pane line indices.
pub(crate) fn fold_rows(slices: &[&[LineMeta]], pairs: &[PairAlignment]) -> Vec<AlignmentRow> {
    let npanes = slices.len();
    debug_assert_eq!(pairs.len(), npanes - 1, "one pairwise alignment per non-reference pane");

    let reference = slices[0];
    let ref_len = reference.len();
    let ref_base = reference.first().map(|m| m.index).unwrap_or(0);

    // Per non-reference pane: reference slot -> matched absolute line.
    let mut match_of_ref: Vec<Vec<Option<u32>>> = vec![vec![None; ref_len]; npanes - 1];
    for (pane, pair) in pairs.iter().enumerate() {
        for &(ref_abs, other_abs) in &pair.matched {
            match_of_ref[pane][(ref_abs - ref_base) as usize] = Some(other_abs);
        }
    }

    let mut rows = Vec::new();
    let mut cursors: Vec<usize> = vec![0; npanes]; // slice-local, cursors[0] = reference
    let mut ref_slot = 0usize;

    while ref_slot < ref_len {
        let anchored = match_of_ref.iter().any(|m| m[ref_slot].is_some());
        if !anchored {
            ref_slot += 1;
            continue;
        }

        emit_gap_rows(&mut rows, slices, &mut cursors, ref_slot, &match_of_ref);

        // The anchor row itself.
        let mut cells: Vec<Option<u32>> = Vec::with_capacity(npanes);
        cells.push(Some(reference[ref_slot].index));
        for (pane, matches) in match_of_ref.iter().enumerate() {
            match matches[ref_slot] {
                Some(abs) => {
                    cells.push(Some(abs));
                    cursors[pane + 1] = (abs - slices[pane + 1][0].index) as usize + 1;
                }
                None => cells.push(None),
            }
        }
        rows.push(AlignmentRow { cells });
        cursors[0] = ref_slot + 1;
        ref_slot += 1;
    }

    emit_gap_rows(&mut rows, slices, &mut cursors, ref_len, &match_of_ref);
    rows
}

/// Rows for all panes' unmatched runs before the anchor at `ref_slot`
/// (`ref_len` for the final gap). A pane contributes its pending lines only
/// when its next match is at this anchor, or when this is the final gap.
/// Non-isolated leftovers pair up top-aligned; isolated lines are emitted on
/// rows of their own once no pane has a non-isolated line pending.
fn emit_gap_rows(
    rows: &mut Vec<AlignmentRow>,
    slices: &[&[LineMeta]],
    cursors: &mut [usize],
    ref_slot: usize,
    match_of_ref: &[Vec<Option<u32>>],
) {
    let npanes = slices.len();
    let final_gap = ref_slot == slices[0].len();

    let mut runs: Vec<(usize, usize)> = Vec::with_capacity(npanes); // (start, end) slice-local
    runs.push((cursors[0], ref_slot));
    for (pane, matches) in match_of_ref.iter().enumerate() {
        let slice = slices[pane + 1];
        let end = if final_gap {
            slice.len()
        } else {
            match matches[ref_slot] {
                Some(abs) => (abs - slice.first().map(|m| m.index).unwrap_or(0)) as usize,
                None => cursors[pane + 1], // pending lines wait for their own match
            }
        };
        runs.push((cursors[pane + 1], end));
    }

    let mut pending: Vec<usize> = runs.iter().map(|&(start, _)| start).collect();
    loop {
        let mut cells: Vec<Option<u32>> = vec![None; npanes];
        let mut advanced = false;

        for pane in 0..npanes {
            if pending[pane] < runs[pane].1 && !slices[pane][pending[pane]].isolated {
                cells[pane] = Some(slices[pane][pending[pane]].index);
                pending[pane] += 1;
                advanced = true;
            }
        }

        if !advanced {
            // Only isolated lines (or nothing) remain; one row each.
            match (0..npanes).find(|&pane| pending[pane] < runs[pane].1) {
                Some(pane) => {
                    cells[pane] = Some(slices[pane][pending[pane]].index);
                    pending[pane] += 1;
                }
                None => break,
            }
        }

        rows.push(AlignmentRow { cells });
    }

    for (pane, &(_, end)) in runs.iter().enumerate() {
        cursors[pane] = end;
    }
}

/// Index-by-index rows without content matching; the limit-exceeded fallback.
pub(crate) fn positional_rows(slices: &[&[LineMeta]]) -> Vec<AlignmentRow> {
    let longest = slices.iter().map(|s| s.len()).max().unwrap_or(0);
    (0..longest)
        .map(|offset| AlignmentRow {
            cells: slices
                .iter()
                .map(|slice| slice.get(offset).map(|m| m.index))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_view::{FrequencyClass, LineMeta};

    fn metas(base: u32, keys: &[u64]) -> Vec<LineMeta> {
        keys.iter()
            .enumerate()
            .map(|(idx, &key)| LineMeta {
                index: base + idx as u32,
                key,
                class: FrequencyClass::Common,
                isolated: false,
            })
            .collect()
    }

    #[test]
    fn isolated_leftovers_get_rows_of_their_own() {
        let reference = metas(0, &[1, 2]);
        let mut other = metas(0, &[9, 2]);
        other[0].isolated = true;
        let rows = fold_rows(&[&reference, &other], &[pair(&[(1, 1)])]);
        let cells: Vec<_> = rows.iter().map(|r| r.cells.clone()).collect();
        assert_eq!(
            cells,
            vec![
                vec![Some(0), None],
                vec![None, Some(0)],
                vec![Some(1), Some(1)],
            ]
        );
    }

    fn pair(matched: &[(u32, u32)]) -> PairAlignment {
        PairAlignment {
            matched: matched.to_vec(),
        }
    }

    #[test]
    fn two_pane_change_pairs_into_one_row() {
        // a b c / a x c
        let a = metas(0, &[1, 2, 3]);
        let b = metas(0, &[1, 9, 3]);
        let rows = fold_rows(&[&a, &b], &[pair(&[(0, 0), (2, 2)])]);
        let cells: Vec<_> = rows.iter().map(|r| r.cells.clone()).collect();
        assert_eq!(
            cells,
            vec![
                vec![Some(0), Some(0)],
                vec![Some(1), Some(1)],
                vec![Some(2), Some(2)],
            ]
        );
    }

    #[test]
    fn unbalanced_runs_pad_with_gaps() {
        // a b c d / a d : b and c become reference-only rows.
        let a = metas(0, &[1, 2, 3, 4]);
        let b = metas(0, &[1, 4]);
        let rows = fold_rows(&[&a, &b], &[pair(&[(0, 0), (3, 1)])]);
        let cells: Vec<_> = rows.iter().map(|r| r.cells.clone()).collect();
        assert_eq!(
            cells,
            vec![
                vec![Some(0), Some(0)],
                vec![Some(1), None],
                vec![Some(2), None],
                vec![Some(3), Some(1)],
            ]
        );
    }

    #[test]
    fn three_pane_leftovers_share_rows() {
        // ref 1 2 / mid 1 X 2 / right 1 Y 2
        let reference = metas(0, &[1, 2]);
        let mid = metas(0, &[1, 77, 2]);
        let right = metas(0, &[1, 88, 2]);
        let rows = fold_rows(
            &[&reference, &mid, &right],
            &[pair(&[(0, 0), (1, 2)]), pair(&[(0, 0), (1, 2)])],
        );
        let cells: Vec<_> = rows.iter().map(|r| r.cells.clone()).collect();
        assert_eq!(
            cells,
            vec![
                vec![Some(0), Some(0), Some(0)],
                vec![None, Some(1), Some(1)],
                vec![Some(1), Some(2), Some(2)],
            ]
        );
    }

    #[test]
    fn pane_pending_lines_wait_for_their_own_match() {
        // ref A B / other x B : x sits before other's match at B, so it must
        // flush into the gap before B's row, not before A's.
        let reference = metas(0, &[1, 2]);
        let other = metas(0, &[9, 2]);
        let rows = fold_rows(&[&reference, &other], &[pair(&[(1, 1)])]);
        let cells: Vec<_> = rows.iter().map(|r| r.cells.clone()).collect();
        assert_eq!(
            cells,
            vec![
                vec![Some(0), Some(0)],
                vec![Some(1), Some(1)],
            ]
        );
    }

    #[test]
    fn absolute_indices_survive_offset_slices() {
        let a = metas(10, &[1, 2]);
        let b = metas(20, &[1, 2]);
        let rows = fold_rows(&[&a, &b], &[pair(&[(10, 20), (11, 21)])]);
        assert_eq!(rows[0].cells, vec![Some(10), Some(20)]);
        assert_eq!(rows[1].cells, vec![Some(11), Some(21)]);
    }

    #[test]
    fn positional_rows_pad_shorter_panes() {
        let a = metas(0, &[1, 2, 3]);
        let b = metas(0, &[7]);
        let rows = positional_rows(&[&a, &b]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cells, vec![Some(0), Some(0)]);
        assert_eq!(rows[2].cells, vec![Some(2), None]);
    }
}
