//! The soft-404 classification engine: the decision algorithm, the
//! per-path known-404 cache, the single-flight probe guard, short-lived
//! memoization of recent classifications, and the forced-404 prober
//! contract (spec §4.4-§4.9).

pub mod classifier;
pub mod errors;
pub mod guard;
pub mod memo;
pub mod opener;
pub mod prober;
mod randalnum;
pub mod store;

pub use classifier::Classifier;
pub use errors::{ProbeError, StoreError};
pub use guard::SingleFlightGuard;
pub use memo::RecentDecisionMemo;
pub use opener::{HttpOpener, OpenerError, ProbeRequest, WorkerPool};
pub use store::SignatureStore;

/// Similarity threshold for the fuzzy comparator (spec §6).
pub const IS_EQUAL_RATIO: f64 = 0.90;

/// Status codes that, paired with a known-404 baseline that is itself
/// coded 404, short-circuit the complex rules to "not a 404" — the server
/// demonstrably *can* answer with a real 404 for this directory, and chose
/// not to for this query (spec §4.8.3, §6, SPEC_FULL.md §C.3).
pub const NOT_404_RESPONSE_CODES: [u16; 7] = [200, 500, 301, 302, 303, 307, 401];

/// Default in-memory tier size for the signature store (spec §6).
pub const MAX_404_IN_MEMORY: usize = 50;

/// Sentinel reason phrase for a synthetic, empty 204 produced by a
/// transport layer that swallows request errors rather than propagating
/// them (spec §4.8.3.5, §6).
pub const NO_CONTENT_MSG: &str = "No Content (synthetic)";
