//! Fuzzy similarity between two cell values.
//!
//! Every cell pair of a comparison goes through [`similarity`], so this is the
//! hot path. Both metrics work on Unicode scalar values of the normalized
//! strings and return a percentage in `[0, 100]`.

use crate::models::Metric;
use crate::normalize::normalize;

/// Similarity percentage of two raw cell values under `metric`.
///
/// Both values are normalized first. Two empty values are identical (100),
/// exactly one empty value is maximally different (0).
pub fn similarity(a: &str, b: &str, metric: Metric) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 100.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    match metric {
        Metric::CharacterOverlap => character_overlap(&a, &b),
        Metric::EditDistance => edit_distance_ratio(&a, &b),
    }
}

/// Character-overlap percentage: `2 * common / (len_a + len_b) * 100`.
///
/// `common` is the number of characters matched by repeatedly taking the
/// longest common substring and recursing on both sides of it. Operands are
/// put in a canonical order first so ties between equally long substrings
/// resolve the same way whichever side is passed first.
pub fn character_overlap(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let common = common_chars(first, second);

    (common * 2) as f64 * 100.0 / total as f64
}

/// Normalized Levenshtein percentage: `100 * (1 - dist / max_len)`, floored at 0.
pub fn edit_distance_ratio(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 100.0;
    }

    let dist = levenshtein(a, b);
    let sim = 100.0 * (1.0 - dist as f64 / max_len as f64);
    sim.max(0.0)
}

/// Levenshtein edit distance (unit cost insert/delete/substitute).
///
/// Two-row Wagner-Fischer, O(len_a * len_b) time, O(min) space.
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    // Keep the shorter sequence in the inner loop
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let m = short.len();

    if m == 0 {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr: Vec<usize> = vec![0; m + 1];

    for (j, &cl) in long.iter().enumerate() {
        curr[0] = j + 1;

        for i in 1..=m {
            let cost = usize::from(short[i - 1] != cl);
            curr[i] = (prev[i] + 1)
                .min(curr[i - 1] + 1)
                .min(prev[i - 1] + cost);
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m]
}

/// Total characters in common via recursive longest-common-substring matching.
fn common_chars(a: &[char], b: &[char]) -> usize {
    let (pos_a, pos_b, len) = longest_common_substring(a, b);
    if len == 0 {
        return 0;
    }

    len + common_chars(&a[..pos_a], &b[..pos_b])
        + common_chars(&a[pos_a + len..], &b[pos_b + len..])
}

/// First longest common substring as `(start_a, start_b, len)`.
///
/// Scans `a` positions in order, then `b` positions; only a strictly longer
/// run replaces the current best.
#[inline]
fn longest_common_substring(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);

    for i in 0..a.len() {
        // Nothing left in `a` can beat the current best
        if a.len() - i <= best.2 {
            break;
        }
        for j in 0..b.len() {
            if b.len() - j <= best.2 {
                break;
            }
            let mut len = 0;
            while i + len < a.len() && j + len < b.len() && a[i + len] == b[j + len] {
                len += 1;
            }
            if len > best.2 {
                best = (i, j, len);
            }
        }
    }

    best
}
