//! URL slicing primitives.
//!
//! Parsing and general URL semantics are an external concern; this wrapper
//! only adds the directory-slicing primitives the classifier's decision
//! tree keys its caches by.

use std::fmt;

use thiserror::Error;

/// A parsed HTTP(S) URL, as consumed by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url(url::Url);

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),
}

impl Url {
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        Ok(Self(url::Url::parse(raw)?))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// scheme + host[:port] + directory, with any trailing filename stripped.
    fn directory_string(&self) -> String {
        let mut out = format!("{}://{}", self.0.scheme(), self.0.host_str().unwrap_or_default());
        if let Some(port) = self.0.port() {
            out.push(':');
            out.push_str(&port.to_string());
        }

        let path = self.0.path();
        let dir = path.rfind('/').map_or("/", |idx| &path[..=idx]);
        out.push_str(dir);
        out
    }

    /// Key for the signature store (spec §4.4): the directory containing
    /// this URL, independent of filename.
    #[must_use]
    pub fn normalized_path(&self) -> NormalizedPath {
        NormalizedPath(self.directory_string())
    }

    /// Key for the `always_404`/`never_404` configuration sets (spec §4.8,
    /// SPEC_FULL.md §C.4) — same granularity as `normalized_path` today,
    /// kept as a distinct type so the two keyspaces can't be swapped by
    /// accident if they diverge later.
    #[must_use]
    pub fn domain_path(&self) -> DomainPath {
        DomainPath(self.directory_string())
    }

    /// Build a sibling URL in this URL's directory with the given filename.
    pub fn join_filename(&self, filename: &str) -> Result<Url, UrlError> {
        Ok(Url(self.0.join(filename)?))
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str())
    }
}

/// Directory-scoped signature-store key. See [`Url::normalized_path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directory-scoped key for the `always_404`/`never_404` configuration sets.
/// See [`Url::domain_path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainPath(String);

impl DomainPath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
