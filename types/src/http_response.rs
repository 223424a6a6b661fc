//! A minimal HTTP response, as handed to the classifier by the transport
//! layer (out of scope for this crate — see `HttpOpener` in `s404-core`).

use std::borrow::Cow;

use crate::url::Url;

/// One HTTP response, carried by value into the classifier.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Opaque identifier for diagnostics (spec §3). Not interpreted.
    pub id: u64,
    pub url: Url,
    pub code: u16,
    pub reason: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Lossily-decoded body text, used wherever the classifier needs to
    /// treat the body as a string.
    #[must_use]
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Order-preserving header bag. Lookups are case-insensitive per HTTP
/// semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `"Name: value\r\n"` per header, the surface `string_match_404` is
    /// matched against alongside the raw body (SPEC_FULL.md §D).
    #[must_use]
    pub fn serialized(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.0 {
            out.push_str(k);
            out.push_str(": ");
            out.push_str(v);
            out.push_str("\r\n");
        }
        out
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
