//! Coarse document classification, used to short-circuit cross-type
//! comparisons before the fuzzy comparator runs (spec §4.1, §4.8.4).

use std::str::FromStr;

/// Deterministic from `body` and an optional `Content-Type` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocType {
    Empty,
    Html,
    PlainText,
    Image,
    Binary,
}

impl DocType {
    #[must_use]
    pub fn classify(body: &[u8], content_type: Option<&str>) -> Self {
        if body.is_empty() {
            return Self::Empty;
        }

        if let Some(ct) = content_type {
            let ct = ct.to_ascii_lowercase();
            if ct.starts_with("image/") {
                return Self::Image;
            }
            if ct.contains("html") {
                return Self::Html;
            }
            if ct.starts_with("text/") || ct.contains("json") || ct.contains("xml") {
                return Self::PlainText;
            }
        }

        match std::str::from_utf8(body) {
            Ok(text) => {
                let head = text.trim_start();
                let head = &head[..head.len().min(512)];
                let lower = head.to_ascii_lowercase();
                if lower.starts_with("<!doctype html") || lower.starts_with("<html") || lower.contains("<body") {
                    Self::Html
                } else {
                    Self::PlainText
                }
            }
            Err(_) => Self::Binary,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Html => "html",
            Self::PlainText => "plaintext",
            Self::Image => "image",
            Self::Binary => "binary",
        }
    }
}

impl FromStr for DocType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(Self::Empty),
            "html" => Ok(Self::Html),
            "plaintext" => Ok(Self::PlainText),
            "image" => Ok(Self::Image),
            "binary" => Ok(Self::Binary),
            _ => Err(()),
        }
    }
}
