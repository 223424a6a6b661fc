//! Fuzzy string comparison (spec §4.2).
//!
//! A pure collaborator: symmetric, reflexive, bounded in CPU time. Built on
//! `similar`'s matched-block ratio, the same "ratcliff/obershelp"-style
//! metric `difflib.SequenceMatcher.ratio()` computes.

use similar::{DiffOp, TextDiff};

/// Responses longer than this are considered unreliable for a single direct
/// fuzzy comparison; the classifier falls back to the large-body tie-break
/// above this length (spec §4.8.7-8).
pub const MAX_FUZZY_LENGTH: usize = 4096;

/// Similarity of `a` and `b`, normalized to `[0.0, 1.0]`. `1.0` means
/// identical; `0.0` means no characters in common, at the granularity
/// `similar`'s matcher operates at. Symmetric and reflexive.
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let diff = TextDiff::from_chars(a, b);
    let matched: usize = diff
        .ops()
        .iter()
        .map(|op| match op {
            DiffOp::Equal { len, .. } => *len,
            _ => 0,
        })
        .sum();

    (2 * matched) as f64 / total as f64
}

/// True when `a` and `b` are similar at or above `ratio`.
///
/// A length-ratio short-circuit skips the (relatively expensive)
/// character-level diff when the two strings can't possibly reach the
/// target ratio — a 10-byte body can never be 90% similar to a 10,000-byte
/// one.
#[must_use]
pub fn fuzzy_equal(a: &str, b: &str, ratio: f64) -> bool {
    if a == b {
        return true;
    }

    let (la, lb) = (a.len(), b.len());
    if la == 0 || lb == 0 {
        return la == lb;
    }

    let length_ratio = la.min(lb) as f64 / la.max(lb) as f64;
    if length_ratio < ratio {
        return false;
    }

    similarity_ratio(a, b) >= ratio
}

#[cfg(test)]
mod tests {
    use super::{fuzzy_equal, similarity_ratio};

    #[test]
    fn identical_strings_are_fully_similar() {
        assert!((similarity_ratio("hello world", "hello world") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn two_empty_strings_are_similar() {
        assert!(fuzzy_equal("", "", 0.90));
    }

    #[test]
    fn wildly_different_lengths_short_circuit_to_false() {
        assert!(!fuzzy_equal("x", "x".repeat(1000).as_str(), 0.90));
    }

    #[test]
    fn near_identical_templates_are_fuzzy_equal() {
        let a = "<html>404 Not Found: the page you requested is missing</html>";
        let b = "<html>404 Not Found: the page you requested is gone</html>";
        assert!(fuzzy_equal(a, b, 0.90));
    }

    #[test]
    fn unrelated_content_is_not_fuzzy_equal() {
        let a = "<html>404 Not Found</html>";
        let b = "<html>Welcome back, here is your order history</html>";
        assert!(!fuzzy_equal(a, b, 0.90));
    }

    #[test]
    fn is_symmetric() {
        let a = "one two three four";
        let b = "one two three five";
        assert_eq!(
            (similarity_ratio(a, b) * 1000.0).round(),
            (similarity_ratio(b, a) * 1000.0).round()
        );
    }
}
