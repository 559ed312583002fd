//! Precomputed per-pane line metadata for alignment.
//!
//! The engine never aligns raw text. Each pane gets a [`PaneView`] holding one
//! [`LineMeta`] per line: the policy-normalized 64-bit key, plus a frequency
//! class used for anchor discovery. Isolated regions are salted so their keys
//! match nothing in any other pane.

use rustc_hash::FxHashMap;

use crate::config::EqualityPolicy;
use crate::hashing::{LineKey, is_blank_line, line_key, salt_key};
use crate::pane::Pane;
use crate::pool::LinePool;
use crate::table::Isolation;

/// Anchor quality of a line within its pane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrequencyClass {
    /// Key appears exactly once in the pane; eligible as an anchor.
    Unique,
    /// Key repeats; poor anchor quality.
    Common,
    /// Blank or whitespace-only; never anchors.
    Blank,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LineMeta {
    pub index: u32,
    pub key: LineKey,
    pub class: FrequencyClass,
    /// Inside an isolated region: salted key, and never shares a row with
    /// another pane's line.
    pub isolated: bool,
}

impl LineMeta {
    pub(crate) fn is_anchorable(&self) -> bool {
        self.class == FrequencyClass::Unique
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PaneView {
    pub meta: Vec<LineMeta>,
}

impl PaneView {
    pub(crate) fn build(
        pane_idx: usize,
        pane: &Pane,
        pool: &LinePool,
        policy: &EqualityPolicy,
        isolations: &[Isolation],
    ) -> PaneView {
        let mut view = PaneView {
            meta: Vec::with_capacity(pane.lines().len()),
        };
        for (idx, line) in pane.lines().iter().enumerate() {
            let content = pool.resolve(line.content);
            let (key, isolated) = keyed(content, idx as u32, pane_idx, policy, isolations);
            view.meta.push(LineMeta {
                index: idx as u32,
                key,
                class: if is_blank_line(content) {
                    FrequencyClass::Blank
                } else {
                    FrequencyClass::Common
                },
                isolated,
            });
        }
        view.reclassify();
        view
    }

    /// Updates the cached view after a pane splice without re-hashing
    /// untouched lines. `removed` lines at `at` were replaced by the pane's
    /// current `at..at + inserted` range.
    pub(crate) fn splice(
        &mut self,
        at: u32,
        removed: u32,
        inserted: u32,
        pane_idx: usize,
        pane: &Pane,
        pool: &LinePool,
        policy: &EqualityPolicy,
        isolations: &[Isolation],
    ) {
        let at = at as usize;
        let fresh: Vec<LineMeta> = (at..at + inserted as usize)
            .map(|idx| {
                let content = pool.resolve(pane.lines()[idx].content);
                let (key, isolated) = keyed(content, idx as u32, pane_idx, policy, isolations);
                LineMeta {
                    index: idx as u32,
                    key,
                    class: if is_blank_line(content) {
                        FrequencyClass::Blank
                    } else {
                        FrequencyClass::Common
                    },
                    isolated,
                }
            })
            .collect();
        self.meta.splice(at..at + removed as usize, fresh).for_each(drop);
        for (idx, meta) in self.meta.iter_mut().enumerate() {
            meta.index = idx as u32;
        }
        self.reclassify();
    }

    /// Frequency classes depend on whole-pane key counts; recount after any
    /// content change.
    fn reclassify(&mut self) {
        let mut counts: FxHashMap<LineKey, u32> = FxHashMap::default();
        for meta in &self.meta {
            *counts.entry(meta.key).or_insert(0) += 1;
        }
        for meta in &mut self.meta {
            if meta.class == FrequencyClass::Blank {
                continue;
            }
            meta.class = if counts.get(&meta.key).copied().unwrap_or(0) == 1 {
                FrequencyClass::Unique
            } else {
                FrequencyClass::Common
            };
        }
    }
}

fn keyed(
    content: &str,
    index: u32,
    pane_idx: usize,
    policy: &EqualityPolicy,
    isolations: &[Isolation],
) -> (LineKey, bool) {
    let key = line_key(content, policy);
    for (ordinal, iso) in isolations.iter().enumerate() {
        if iso.pane as usize == pane_idx && iso.range.contains(&index) {
            // Salt is per isolation record, so the region cannot match any
            // other pane, nor a differently-isolated region of its own pane.
            return (salt_key(key, (ordinal as u64) + 1), true);
        }
    }
    (key, false)
}
