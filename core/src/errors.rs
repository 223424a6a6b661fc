//! Error types for the classifier's stateful components.
//!
//! Per spec §7, none of these propagate out of `Classifier::is_404` — they
//! are observed internally, logged, and folded into the conservative
//! "not a 404" fallback.

use thiserror::Error;

use crate::opener::OpenerError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("signature store backend error: {0}")]
    Backend(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("transport error while forcing a 404 under {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: OpenerError,
    },
    #[error("could not build a probe URL under {0} after several attempts")]
    UrlConstruction(String),
}
