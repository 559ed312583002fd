//! Pairwise alignment of one pane against the reference.
//!
//! Pipeline: trim the common prefix and suffix, then fill the middle with a
//! per-gap strategy — direct LCS for small gaps, anchor partitioning with
//! recursion for large ones, positional matching once the recursion and work
//! limits are spent. Matches are equal-key pairs only; pairing of non-equal
//! leftovers into shared rows happens later in the fold step.

use crate::alignment::anchors::{chain_anchors, discover_anchors};
use crate::config::AlignConfig;
use crate::line_view::LineMeta;

/// Equal-line correspondences between the reference (`a`) side and the other
/// (`b`) side, strictly increasing in both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PairAlignment {
    pub matched: Vec<(u32, u32)>,
}

pub(crate) fn align_pair(a: &[LineMeta], b: &[LineMeta], config: &AlignConfig) -> PairAlignment {
    let mut matched = Vec::new();

    // Common prefix.
    let mut prefix = 0usize;
    while prefix < a.len() && prefix < b.len() && a[prefix].key == b[prefix].key {
        matched.push((a[prefix].index, b[prefix].index));
        prefix += 1;
    }

    // Common suffix, not overlapping the prefix.
    let mut suffix = 0usize;
    while suffix < a.len() - prefix
        && suffix < b.len() - prefix
        && a[a.len() - 1 - suffix].key == b[b.len() - 1 - suffix].key
    {
        suffix += 1;
    }

    align_range(
        &a[prefix..a.len() - suffix],
        &b[prefix..b.len() - suffix],
        config,
        0,
        &mut matched,
    );

    for offset in (0..suffix).rev() {
        matched.push((a[a.len() - 1 - offset].index, b[b.len() - 1 - offset].index));
    }

    debug_assert!(
        matched
            .windows(2)
            .all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1),
        "pairwise matches must be strictly increasing in both panes"
    );

    PairAlignment { matched }
}

fn align_range(
    a: &[LineMeta],
    b: &[LineMeta],
    config: &AlignConfig,
    depth: u32,
    out: &mut Vec<(u32, u32)>,
) {
    if a.is_empty() || b.is_empty() {
        return;
    }

    // Anchors first, so unique content lines can never lose their match to a
    // nearby blank or boilerplate line in the LCS. Only trivial gaps skip the
    // anchor pass.
    let tiny = a.len() <= config.small_gap_threshold as usize
        && b.len() <= config.small_gap_threshold as usize;
    let within_work_limit = a.len().saturating_mul(b.len()) <= config.lcs_dp_work_limit;

    if !tiny && depth < config.max_recursion_depth {
        let anchors = chain_anchors(discover_anchors(a, b));
        if !anchors.is_empty() {
            let base_a = a[0].index;
            let base_b = b[0].index;
            let mut prev_a = 0usize;
            let mut prev_b = 0usize;
            for anchor in &anchors {
                let local_a = (anchor.a - base_a) as usize;
                let local_b = (anchor.b - base_b) as usize;
                align_range(
                    &a[prev_a..local_a],
                    &b[prev_b..local_b],
                    config,
                    depth + 1,
                    out,
                );
                out.push((anchor.a, anchor.b));
                prev_a = local_a + 1;
                prev_b = local_b + 1;
            }
            align_range(&a[prev_a..], &b[prev_b..], config, depth + 1, out);
            return;
        }
    }

    if within_work_limit {
        lcs_match(a, b, out);
    } else {
        positional_match(a, b, out);
    }
}

/// O(n*m) LCS over keys. On ties the backtrack consumes the reference side
/// first, which keeps matches on the earliest reference line.
fn lcs_match(a: &[LineMeta], b: &[LineMeta], out: &mut Vec<(u32, u32)>) {
    let m = a.len();
    let n = b.len();

    let mut dp = vec![vec![0u32; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            if a[i].key == b[j].key {
                dp[i][j] = dp[i + 1][j + 1] + 1;
            } else {
                dp[i][j] = dp[i + 1][j].max(dp[i][j + 1]);
            }
        }
    }

    let mut i = 0usize;
    let mut j = 0usize;
    while i < m && j < n {
        if a[i].key == b[j].key {
            out.push((a[i].index, b[j].index));
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
}

/// Last-resort pairing for oversized gaps: walk both sides in step and keep
/// only the equal-key pairs that happen to line up.
fn positional_match(a: &[LineMeta], b: &[LineMeta], out: &mut Vec<(u32, u32)>) {
    for (ma, mb) in a.iter().zip(b.iter()) {
        if ma.key == mb.key {
            out.push((ma.index, mb.index));
        }
    }
}
