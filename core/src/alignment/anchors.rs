//! Anchor discovery and chain construction.
//!
//! Anchors are lines whose key is unique in both panes of a pairwise
//! alignment; they are the fixed points the gap strategies work between. The
//! chain step selects the maximal anchor subset that preserves relative order
//! on both sides via longest increasing subsequence, discarding crossings.

use rustc_hash::FxHashMap;

use crate::hashing::LineKey;
use crate::line_view::LineMeta;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Anchor {
    /// Line index on the reference side.
    pub a: u32,
    /// Line index on the other side.
    pub b: u32,
}

pub(crate) fn discover_anchors(a: &[LineMeta], b: &[LineMeta]) -> Vec<Anchor> {
    let mut a_unique: FxHashMap<LineKey, u32> = FxHashMap::default();
    for meta in a {
        if meta.is_anchorable() {
            a_unique.insert(meta.key, meta.index);
        }
    }

    b.iter()
        .filter(|meta| meta.is_anchorable())
        .filter_map(|meta| {
            a_unique.get(&meta.key).map(|&a_idx| Anchor {
                a: a_idx,
                b: meta.index,
            })
        })
        .collect()
}

/// Sorts by the `b` side, then keeps the LIS on the `a` side, so the result
/// is strictly increasing in both panes.
pub(crate) fn chain_anchors(mut anchors: Vec<Anchor>) -> Vec<Anchor> {
    anchors.sort_by_key(|anchor| anchor.b);
    let indices = lis_indices(&anchors, |anchor| anchor.a);
    indices.into_iter().map(|idx| anchors[idx]).collect()
}

fn lis_indices<T, F>(items: &[T], key: F) -> Vec<usize>
where
    F: Fn(&T) -> u32,
{
    let mut piles: Vec<usize> = Vec::new();
    let mut predecessors: Vec<Option<usize>> = vec![None; items.len()];

    for (idx, item) in items.iter().enumerate() {
        let k = key(item);
        let pos = piles
            .binary_search_by_key(&k, |&pile_idx| key(&items[pile_idx]))
            .unwrap_or_else(|insert_pos| insert_pos);

        if pos > 0 {
            predecessors[idx] = Some(piles[pos - 1]);
        }

        if pos == piles.len() {
            piles.push(idx);
        } else {
            piles[pos] = idx;
        }
    }

    let Some(&last) = piles.last() else {
        return Vec::new();
    };

    let mut result: Vec<usize> = Vec::new();
    let mut current = last;
    loop {
        result.push(current);
        if let Some(prev) = predecessors[current] {
            current = prev;
        } else {
            break;
        }
    }
    result.reverse();
    result
}
