//! A cached 404 signature: the cleaned fingerprint of a forced-404 response
//! for a directory, or of a response already proven to be a 404 (spec §4.4).

use crate::doc_type::DocType;
use crate::url::{NormalizedPath, Url};

/// Immutable after construction except for `diff`, which is populated at
/// most once, under the signature store's per-path single-flight guard
/// (spec §4.8.a).
#[derive(Debug, Clone)]
pub struct FourOhFourResponse {
    pub url: Url,
    pub id: u64,
    pub code: u16,
    pub doc_type: DocType,
    pub normalized_path: NormalizedPath,
    pub body: String,
    pub diff: Option<String>,
}

impl FourOhFourResponse {
    #[must_use]
    pub fn new(url: Url, id: u64, code: u16, doc_type: DocType, normalized_path: NormalizedPath, body: String) -> Self {
        Self { url, id, code, doc_type, normalized_path, body, diff: None }
    }

    /// Returns a copy with `diff` set, for the large-body tie-break's
    /// cache write-back (spec §4.8.a.2-3).
    #[must_use]
    pub fn with_diff(mut self, diff: String) -> Self {
        self.diff = Some(diff);
        self
    }
}
