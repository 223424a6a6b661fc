//! Body cleaning: redact volatile tokens so two otherwise-identical pages
//! compare equal (spec §4.1's MUST; dynamic-token set per SPEC_FULL.md §D).
//!
//! Mirrors the shape of a redaction module built around a small battery of
//! `regex::Regex` patterns, each applied independently and in a fixed order.

use std::sync::OnceLock;

use regex::Regex;

const PLACEHOLDER: &str = "<REDACTED>";

struct Patterns {
    dynamic_token: Regex,
    timestamp_iso8601: Regex,
    timestamp_rfc2822: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            dynamic_token: Regex::new(
                r"(?i)\b(?:session|token|csrf|nonce|request-id|correlation-id)[\w-]*\s*[:=]\s*[A-Za-z0-9+/_=-]{16,}",
            )
            .expect("dynamic token pattern is a valid regex"),
            timestamp_iso8601: Regex::new(
                r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?",
            )
            .expect("ISO-8601 pattern is a valid regex"),
            timestamp_rfc2822: Regex::new(
                r"(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun), \d{2} (?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec) \d{4} \d{2}:\d{2}:\d{2} GMT",
            )
            .expect("RFC-2822 pattern is a valid regex"),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::new)
}

/// Redact volatile content from a raw response body before it becomes part
/// of a signature: the requested URL and its last path segment when
/// reflected verbatim, dynamic-token-shaped strings, and timestamps.
#[must_use]
pub fn clean_body(raw_body: &str, requested_url: &str, last_segment: &str) -> String {
    let mut out = raw_body.to_string();

    if !requested_url.is_empty() {
        out = out.replace(requested_url, PLACEHOLDER);
    }
    if last_segment.len() >= 3 {
        out = out.replace(last_segment, PLACEHOLDER);
    }

    let p = patterns();
    out = p.dynamic_token.replace_all(&out, PLACEHOLDER).into_owned();
    out = p.timestamp_iso8601.replace_all(&out, PLACEHOLDER).into_owned();
    out = p.timestamp_rfc2822.replace_all(&out, PLACEHOLDER).into_owned();

    out
}
