//! Diff extraction: isolate the substrings two strings don't share.
//!
//! Operates at line granularity: this is what makes it useful for
//! "subtracting shared boilerplate" (spec §4.3) — a multi-kilobyte shared
//! header/footer collapses to nothing, leaving only the lines that
//! actually vary between the two inputs.

use similar::{ChangeTag, TextDiff};

/// Returns `(a_only, b_only)`: the lines of `a` and `b` not common to both,
/// concatenated in order. `diff(a, b)` is `diff(b, a)` with the two halves
/// swapped.
#[must_use]
pub fn diff(a: &str, b: &str) -> (String, String) {
    let text_diff = TextDiff::from_lines(a, b);

    let mut a_only = String::new();
    let mut b_only = String::new();

    for change in text_diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => a_only.push_str(change.value()),
            ChangeTag::Insert => b_only.push_str(change.value()),
            ChangeTag::Equal => {}
        }
    }

    (a_only, b_only)
}
