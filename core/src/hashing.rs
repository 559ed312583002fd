//! Line normalization and key computation.
//!
//! Alignment never compares line text directly; it compares 64-bit keys of the
//! policy-normalized content. Normalizations apply in a fixed order (end-of-line
//! form, whitespace, case, blankness) so that combined options stay
//! order-independent for the caller.

use std::borrow::Cow;

use xxhash_rust::xxh64::Xxh64;

use crate::config::EqualityPolicy;

pub(crate) type LineKey = u64;

pub(crate) const XXH64_SEED: u64 = 0;
const KEY_MIX_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Whether the line is empty or whitespace-only (after stripping a trailing CR).
pub(crate) fn is_blank_line(content: &str) -> bool {
    content
        .strip_suffix('\r')
        .unwrap_or(content)
        .chars()
        .all(char::is_whitespace)
}

/// Applies every enabled normalization, borrowing when nothing changes.
pub(crate) fn normalize_line<'a>(content: &'a str, policy: &EqualityPolicy) -> Cow<'a, str> {
    let mut text: Cow<'a, str> = Cow::Borrowed(content);

    if policy.ignore_eol {
        if let Some(stripped) = text.strip_suffix('\r') {
            text = Cow::Owned(stripped.to_owned());
        }
    }

    if policy.ignore_blank_lines && is_blank_line(&text) {
        return Cow::Borrowed("");
    }

    if policy.ignore_all_whitespace {
        if text.contains(char::is_whitespace) {
            text = Cow::Owned(text.chars().filter(|c| !c.is_whitespace()).collect());
        }
    } else if policy.ignore_whitespace_change {
        text = collapse_whitespace(text);
    }

    if policy.ignore_case && text.chars().any(char::is_uppercase) {
        text = Cow::Owned(text.to_lowercase());
    }

    text
}

/// Policy-aware equality; the single predicate classification relies on.
pub(crate) fn lines_equal(a: &str, b: &str, policy: &EqualityPolicy) -> bool {
    normalize_line(a, policy) == normalize_line(b, policy)
}

pub(crate) fn line_key(content: &str, policy: &EqualityPolicy) -> LineKey {
    let normalized = normalize_line(content, policy);
    let mut hasher = Xxh64::new(XXH64_SEED);
    hasher.update(normalized.as_bytes());
    hasher.digest()
}

/// Mixes an isolation salt into a key so salted lines match nothing else.
pub(crate) fn salt_key(key: LineKey, salt: u64) -> LineKey {
    key.rotate_left(13) ^ salt.wrapping_mul(KEY_MIX_CONSTANT)
}

fn collapse_whitespace(text: Cow<'_, str>) -> Cow<'_, str> {
    let trimmed = text.trim();
    let needs_collapse = {
        let mut prev_ws = false;
        let mut collapse = false;
        for c in trimmed.chars() {
            let ws = c.is_whitespace();
            if ws && (prev_ws || c != ' ') {
                collapse = true;
                break;
            }
            prev_ws = ws;
        }
        collapse
    };

    if !needs_collapse {
        if trimmed.len() == text.len() {
            return text;
        }
        return Cow::Owned(trimmed.to_owned());
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut prev_ws = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !prev_ws {
                out.push(' ');
            }
            prev_ws = true;
        } else {
            out.push(c);
            prev_ws = false;
        }
    }
    Cow::Owned(out)
}
