//! Pure, stateless collaborators consumed by the classifier: the fuzzy
//! comparator, the diff extractor, body cleaning, and fingerprint
//! construction. No IO, no async.

pub mod clean;
pub mod diff;
pub mod fingerprint;
pub mod fuzzy;

pub use clean::clean_body;
pub use fingerprint::build as build_fingerprint;
pub use fuzzy::{MAX_FUZZY_LENGTH, fuzzy_equal, similarity_ratio};
