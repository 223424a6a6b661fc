//! Forced-404 Prober (spec §4.5): issues one HTTP GET to a random,
//! almost-certainly-nonexistent sibling path and returns its cleaned
//! signature, to be cached as the directory's known-404 baseline.

use s404_types::{FourOhFourResponse, Url};
use s404_utils::build_fingerprint;

use crate::errors::ProbeError;
use crate::opener::{HttpOpener, ProbeRequest};
use crate::randalnum::rand_alnum;

/// Probe filenames are 8-char random alphanumeric strings, matching the
/// original's `rand_alnum(8)` for forced-404 paths.
const PROBE_FILENAME_LEN: usize = 8;

/// Bounds retries against `exclude` collisions; at this length a second
/// collision is astronomically unlikely, so running out means something
/// is wrong with URL construction, not bad luck.
const MAX_ATTEMPTS: usize = 10;

/// Build a sibling URL under `reference_url`'s directory, not present in
/// `exclude`, and fetch it through `opener`. Returns the cleaned
/// signature of the response.
pub fn probe(
    opener: &dyn HttpOpener,
    reference_url: &Url,
    trace_id: &str,
    exclude: &[Url],
) -> Result<FourOhFourResponse, ProbeError> {
    for _ in 0..MAX_ATTEMPTS {
        let filename = rand_alnum(PROBE_FILENAME_LEN);
        let candidate = reference_url
            .join_filename(&filename)
            .map_err(|_| ProbeError::UrlConstruction(reference_url.to_string()))?;

        if exclude.contains(&candidate) {
            continue;
        }

        tracing::debug!(trace_id, url = %candidate, "issuing forced-404 probe");

        let response = opener
            .send(&ProbeRequest { url: candidate.clone() })
            .map_err(|source| ProbeError::Transport { url: candidate.to_string(), source })?;

        return Ok(build_fingerprint(&response));
    }

    Err(ProbeError::UrlConstruction(reference_url.to_string()))
}
