//! Classifier (spec §4.8): the top-level decision algorithm. Composes the
//! memo, single-flight guard, signature store and prober into `is_404`.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use s404_config::ClassifierConfig;
use s404_types::{FourOhFourResponse, HttpResponse, NormalizedPath};
use s404_utils::diff::diff as str_diff;
use s404_utils::{MAX_FUZZY_LENGTH, build_fingerprint, fuzzy_equal};

use crate::errors::StoreError;
use crate::guard::SingleFlightGuard;
use crate::memo::{self, RecentDecisionMemo};
use crate::opener::{HttpOpener, WorkerPool};
use crate::randalnum::rand_alnum;
use crate::store::SignatureStore;
use crate::{IS_EQUAL_RATIO, MAX_404_IN_MEMORY, NOT_404_RESPONSE_CODES, NO_CONTENT_MSG, prober};

/// Outcome of one classification, carried internally so the single
/// structured diagnostic at the end of `is_404` can name the branch that
/// fired (SPEC_FULL.md §C.2) without logging at every early return.
struct Verdict {
    is_404: bool,
    reason: &'static str,
    known_404_id: Option<u64>,
}

impl Verdict {
    fn basic(is_404: bool, reason: &'static str) -> Self {
        Self { is_404, reason, known_404_id: None }
    }

    fn complex(is_404: bool, reason: &'static str, known_404_id: u64) -> Self {
        Self { is_404, reason, known_404_id: Some(known_404_id) }
    }
}

/// One scan's classifier instance: owns the signature store, the
/// recent-decision memo, and the single-flight guard, and late-binds the
/// HTTP transport and worker pool (spec §4.9). Re-architected per spec §9
/// as an explicitly-constructed object rather than a process-wide
/// singleton — the scan session owns it and passes it to whoever needs to
/// classify a response.
pub struct Classifier {
    config: ClassifierConfig,
    store: SignatureStore,
    memo: RecentDecisionMemo,
    guard: SingleFlightGuard,
    opener: RwLock<Option<Arc<dyn HttpOpener>>>,
    worker_pool: RwLock<Option<Arc<dyn WorkerPool>>>,
    store_capacity: usize,
    memo_capacity: usize,
}

impl Classifier {
    /// New classifier backed by a SQLite file at `store_path` for the
    /// cold signature tier (spec §4.4, §6).
    pub fn new(config: ClassifierConfig, store_path: &Path) -> Result<Self, StoreError> {
        Self::with_capacities(config, store_path.into(), MAX_404_IN_MEMORY, memo::DEFAULT_CAPACITY)
    }

    /// New classifier with an in-memory cold tier — convenient for tests
    /// and short-lived scans that don't need the cold tier to survive a
    /// crash mid-scan.
    pub fn new_in_memory(config: ClassifierConfig) -> Result<Self, StoreError> {
        Self::with_capacities(config, StoreBacking::Memory, MAX_404_IN_MEMORY, memo::DEFAULT_CAPACITY)
    }

    fn with_capacities(
        config: ClassifierConfig,
        backing: StoreBacking,
        store_capacity: usize,
        memo_capacity: usize,
    ) -> Result<Self, StoreError> {
        let store = backing.open(store_capacity)?;
        Ok(Self {
            config,
            store,
            memo: RecentDecisionMemo::new(memo_capacity),
            guard: SingleFlightGuard::new(),
            opener: RwLock::new(None),
            worker_pool: RwLock::new(None),
            store_capacity,
            memo_capacity,
        })
    }

    /// Late-bind the HTTP transport collaborator (spec §6).
    pub fn set_opener(&self, opener: Arc<dyn HttpOpener>) {
        *self.opener.write().unwrap_or_else(PoisonError::into_inner) = Some(opener);
    }

    /// Late-bind the worker pool used by the prober (spec §6). Opaque to
    /// the core — never called into, only threaded through.
    pub fn set_worker_pool(&self, pool: Arc<dyn WorkerPool>) {
        *self.worker_pool.write().unwrap_or_else(PoisonError::into_inner) = Some(pool);
    }

    /// Discard all per-scan state — signature store, memo, guard, and the
    /// bound transport/worker pool — and start fresh (spec §4.9: "prior
    /// scan state must not leak into a new scan").
    pub fn reset(&mut self, config: ClassifierConfig, store_path: Option<&Path>) -> Result<(), StoreError> {
        let backing = match store_path {
            Some(p) => StoreBacking::File(p.to_path_buf()),
            None => StoreBacking::Memory,
        };

        self.store = backing.open(self.store_capacity)?;
        self.config = config;
        self.memo = RecentDecisionMemo::new(self.memo_capacity);
        self.guard = SingleFlightGuard::new();
        *self.opener.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.worker_pool.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    /// The decision algorithm (spec §4.8). Never panics, never returns an
    /// error: a transport or store failure falls back to the conservative
    /// "not a 404" result per spec §7.
    #[must_use]
    pub fn is_404(&self, response: &HttpResponse) -> bool {
        let trace_id = rand_alnum(8);

        if let Some(decision) = self.memo.get(response.url.as_str(), &response.body) {
            tracing::debug!(trace_id, url = %response.url, response_id = response.id, decision, "memo hit, skipping classification");
            return decision;
        }

        let path_key = response.url.normalized_path();
        let verdict = self.guard.with_guard(path_key.as_str(), || self.classify(response, &trace_id));

        tracing::debug!(
            trace_id,
            url = %response.url,
            response_id = response.id,
            code = response.code,
            body_len = response.body.len(),
            decision = verdict.is_404,
            reason = verdict.reason,
            known_404_id = verdict.known_404_id,
            "classification decision"
        );

        self.memo.put(response.url.as_str(), &response.body, verdict.is_404);
        verdict.is_404
    }

    fn classify(&self, response: &HttpResponse, trace_id: &str) -> Verdict {
        if let Some(verdict) = self.basic_rules(response) {
            return verdict;
        }
        self.complex_rules(response, trace_id)
    }

    /// Spec §4.8.3: first match wins, short-circuit true/false.
    fn basic_rules(&self, response: &HttpResponse) -> Option<Verdict> {
        let domain_path = response.url.domain_path();

        if self.config.is_always_404(domain_path.as_str()) {
            return Some(Verdict::basic(true, "always_404 override"));
        }

        if self.config.is_never_404(domain_path.as_str()) {
            return Some(Verdict::basic(false, "never_404 override"));
        }

        if let Some(marker) = self.config.string_match_404()
            && response_contains(response, marker)
        {
            return Some(Verdict::basic(true, "string_match_404 literal found"));
        }

        if response.code == 404 {
            return Some(Verdict::basic(true, "status code 404"));
        }

        if response.code == 204 && response.reason == NO_CONTENT_MSG && response.headers.is_empty() {
            return Some(Verdict::basic(true, "synthetic 204 from error-swallowing proxy"));
        }

        None
    }

    /// Spec §4.8.4: consults the signature store, populating it via the
    /// prober on miss.
    fn complex_rules(&self, response: &HttpResponse, trace_id: &str) -> Verdict {
        let query = build_fingerprint(response);

        let Some(known_404) = self.known_404_for(&query.normalized_path, response, trace_id) else {
            return Verdict::basic(false, "no known-404 available (no opener bound, or probe failed)");
        };

        if NOT_404_RESPONSE_CODES.contains(&query.code) && known_404.code == 404 {
            return Verdict::complex(false, "known-404 demonstrates a real 404 status for this area", known_404.id);
        }

        if query.doc_type != known_404.doc_type {
            return Verdict::complex(false, "document type mismatch with known 404", known_404.id);
        }

        if query.body == known_404.body {
            return Verdict::complex(true, "exact body match with known 404", known_404.id);
        }

        if !fuzzy_equal(&known_404.body, &query.body, IS_EQUAL_RATIO) {
            return Verdict::complex(false, "similarity below threshold", known_404.id);
        }

        if query.body.len() < MAX_FUZZY_LENGTH {
            return Verdict::complex(true, "fuzzy match trusted at this body length", known_404.id);
        }

        self.large_body_tie_break(known_404, &query, response, trace_id)
    }

    fn known_404_for(&self, key: &NormalizedPath, response: &HttpResponse, trace_id: &str) -> Option<FourOhFourResponse> {
        if let Some(sig) = self.store.get(key) {
            return Some(sig);
        }

        let opener_guard = self.opener.read().unwrap_or_else(PoisonError::into_inner);
        let opener = opener_guard.as_ref()?;

        match prober::probe(opener.as_ref(), &response.url, trace_id, &[]) {
            Ok(sig) => {
                self.store.put(key, sig.clone());
                Some(sig)
            }
            Err(e) => {
                tracing::warn!(trace_id, error = %e, "forced-404 probe failed, treating path as unclassifiable");
                None
            }
        }
    }

    /// Spec §4.8.a: large-body tie-break via a second forced-404 probe.
    fn large_body_tie_break(
        &self,
        known_404: FourOhFourResponse,
        query: &FourOhFourResponse,
        response: &HttpResponse,
        trace_id: &str,
    ) -> Verdict {
        let known_404 = if known_404.diff.is_some() {
            known_404
        } else {
            match self.populate_diff(known_404, response, trace_id) {
                Some(updated) => updated,
                None => return Verdict::basic(false, "second forced-404 probe failed, cannot tie-break"),
            }
        };

        let known_404_id = known_404.id;
        let diff_x = known_404.diff.clone().unwrap_or_default();

        if diff_x.is_empty() {
            return Verdict::complex(false, "the two forced-404 probes were byte-identical", known_404_id);
        }

        let (_, diff_y) = str_diff(&known_404.body, &query.body);

        if fuzzy_equal(&diff_x, &diff_y, IS_EQUAL_RATIO) {
            Verdict::complex(true, "large-body tie-break: diff regions match", known_404_id)
        } else {
            Verdict::complex(false, "large-body tie-break: diff regions differ", known_404_id)
        }
    }

    /// First large-body classification for this path: probes a second,
    /// different forced-404 and caches the diff against the first (spec
    /// §4.8.a.2). Runs under the per-path guard already held by the
    /// caller, so the write-back race-free (SPEC_FULL.md §C.5).
    fn populate_diff(&self, known_404: FourOhFourResponse, response: &HttpResponse, trace_id: &str) -> Option<FourOhFourResponse> {
        let opener_guard = self.opener.read().unwrap_or_else(PoisonError::into_inner);
        let opener = opener_guard.as_ref()?;

        let known_404_2 = prober::probe(opener.as_ref(), &response.url, trace_id, std::slice::from_ref(&known_404.url)).ok()?;
        let (diff_1, _) = str_diff(&known_404.body, &known_404_2.body);
        let updated = known_404.with_diff(diff_1);

        self.store.put(&updated.normalized_path.clone(), updated.clone());
        Some(updated)
    }
}

fn response_contains(response: &HttpResponse, marker: &str) -> bool {
    response.headers.serialized().contains(marker) || response.body_str().contains(marker)
}

/// Where the signature store's cold tier lives.
enum StoreBacking {
    File(std::path::PathBuf),
    Memory,
}

impl From<&Path> for StoreBacking {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl StoreBacking {
    fn open(&self, capacity: usize) -> Result<SignatureStore, StoreError> {
        match self {
            Self::File(path) => SignatureStore::open(path, capacity),
            Self::Memory => SignatureStore::open_in_memory(capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use s404_config::ClassifierConfig;
    use s404_types::{Headers, HttpResponse, Url};

    use super::Classifier;
    use crate::opener::{HttpOpener, OpenerError, ProbeRequest};

    /// Returns one scripted body per call, in order; repeats the last
    /// body once the script runs out.
    struct ScriptedOpener {
        bodies: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedOpener {
        fn new(bodies: &[&str]) -> Self {
            Self::from_owned(bodies.iter().map(ToString::to_string).collect())
        }

        fn from_owned(bodies: Vec<String>) -> Self {
            Self { bodies: Mutex::new(bodies), calls: AtomicUsize::new(0) }
        }
    }

    impl HttpOpener for ScriptedOpener {
        fn send(&self, request: &ProbeRequest) -> Result<HttpResponse, OpenerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut bodies = self.bodies.lock().unwrap();
            let body = if bodies.len() > 1 { bodies.remove(0) } else { bodies.first().cloned().unwrap_or_default() };
            Ok(HttpResponse {
                id: 100 + self.calls.load(Ordering::SeqCst) as u64,
                url: request.url.clone(),
                code: 200,
                reason: "OK".to_string(),
                headers: Headers::new(),
                body: body.into_bytes(),
            })
        }
    }

    /// Echoes the probed URL back into the body, the way a server that
    /// reflects the requested path into its not-found page would.
    struct EchoOpener {
        calls: AtomicUsize,
    }

    impl HttpOpener for EchoOpener {
        fn send(&self, request: &ProbeRequest) -> Result<HttpResponse, OpenerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse {
                id: 42,
                url: request.url.clone(),
                code: 200,
                reason: "OK".to_string(),
                headers: Headers::new(),
                body: format!("<html>Not Found at {}</html>", request.url).into_bytes(),
            })
        }
    }

    fn response(id: u64, url: &str, code: u16, reason: &str, body: &str) -> HttpResponse {
        HttpResponse {
            id,
            url: Url::parse(url).unwrap(),
            code,
            reason: reason.to_string(),
            headers: Headers::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn real_404_status_short_circuits_without_probing() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let r = response(1, "http://h/x/a", 404, "Not Found", "whatever");
        assert!(classifier.is_404(&r));
    }

    #[test]
    fn synthetic_204_from_proxy_is_a_404() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let r = response(1, "http://h/x/a", 204, "No Content (synthetic)", "");
        assert!(classifier.is_404(&r));
    }

    #[test]
    fn always_404_override_wins_regardless_of_content() {
        // Per spec §4 and scenario 7, the override keys are directories
        // (`domain_path`), not full URLs.
        let mut always = HashSet::new();
        always.insert("http://h/adm/".to_string());
        let config = ClassifierConfig::new(always, HashSet::new(), None);
        let classifier = Classifier::new_in_memory(config).unwrap();

        let r = response(1, "http://h/adm/login", 200, "OK", "Welcome, admin dashboard");
        assert!(classifier.is_404(&r));
    }

    #[test]
    fn never_404_override_wins_over_everything_but_always_404() {
        let mut never = HashSet::new();
        never.insert("http://h/keep/".to_string());
        let config = ClassifierConfig::new(HashSet::new(), never, None);
        let classifier = Classifier::new_in_memory(config).unwrap();

        let r = response(1, "http://h/keep/a", 404, "Not Found", "gone");
        assert!(!classifier.is_404(&r));
    }

    #[test]
    fn string_match_marker_forces_404() {
        let config = ClassifierConfig::new(HashSet::new(), HashSet::new(), Some("CUSTOM-NOT-FOUND".to_string()));
        let classifier = Classifier::new_in_memory(config).unwrap();

        let r = response(1, "http://h/x/a", 200, "OK", "oops: CUSTOM-NOT-FOUND marker here");
        assert!(classifier.is_404(&r));
    }

    #[test]
    fn custom_soft_404_matches_probe_after_cleaning() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let opener = Arc::new(EchoOpener { calls: AtomicUsize::new(0) });
        classifier.set_opener(opener.clone());

        let query = response(1, "http://h/x/missing", 200, "OK", "<html>Not Found at http://h/x/missing</html>");
        assert!(classifier.is_404(&query));
        assert_eq!(opener.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn true_content_is_not_a_404() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let opener = Arc::new(ScriptedOpener::new(&["<html>Not Found</html>"]));
        classifier.set_opener(opener);

        let query = response(1, "http://h/x/a", 200, "OK", "<html>Welcome, user Alice. Here are 42 items.</html>");
        assert!(!classifier.is_404(&query));
    }

    #[test]
    fn doc_type_mismatch_is_never_a_404_regardless_of_similarity() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let opener = Arc::new(ScriptedOpener::new(&["<html>Not Found</html>"]));
        classifier.set_opener(opener);

        // Plain text versus the probe's HTML: different doc types short-circuit
        // before the fuzzy comparator ever runs, regardless of textual overlap.
        let query = response(1, "http://h/x/a", 200, "OK", "Not Found: the resource does not exist");
        assert!(!classifier.is_404(&query));
    }

    #[test]
    fn memo_hit_skips_reclassification_and_reprobing() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let opener = Arc::new(ScriptedOpener::new(&["<html>Not Found</html>"]));
        classifier.set_opener(opener.clone());

        let query = response(1, "http://h/x/a", 200, "OK", "<html>Not Found</html>");
        assert!(classifier.is_404(&query));
        assert!(classifier.is_404(&query));

        assert_eq!(opener.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_opener_bound_falls_back_conservatively_to_false() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let query = response(1, "http://h/x/a", 200, "OK", "<html>anything</html>");
        assert!(!classifier.is_404(&query));
    }

    /// The line a large templated 404 page varies per probe: a fixed
    /// prefix/suffix around an 8-char token, long enough relative to the
    /// token that two tokens still yield a high character-level ratio.
    fn missing_line(token: &str) -> String {
        format!(
            "missing: {token} the requested resource could not be located on this particular server at this time\n"
        )
    }

    #[test]
    fn large_body_tie_break_positive() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let boilerplate = "shared boilerplate line\n".repeat(400);
        let probe_1 = format!("{boilerplate}{}", missing_line("randtok1"));
        let probe_2 = format!("{boilerplate}{}", missing_line("randtok2"));
        let opener = Arc::new(ScriptedOpener::from_owned(vec![probe_1, probe_2]));
        classifier.set_opener(opener.clone());

        let query_body = format!("{boilerplate}{}", missing_line("randtok3"));
        let query = response(1, "http://h/y/a", 200, "OK", &query_body);

        assert!(classifier.is_404(&query));
        assert_eq!(opener.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn large_body_tie_break_negative() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let boilerplate = "shared boilerplate line\n".repeat(400);
        let probe_1 = format!("{boilerplate}{}", missing_line("randtok1"));
        let probe_2 = format!("{boilerplate}{}", missing_line("randtok2"));
        let opener = Arc::new(ScriptedOpener::from_owned(vec![probe_1, probe_2]));
        classifier.set_opener(opener.clone());

        let query_body = format!("{boilerplate}Product page: Widget 17, in stock now, buy today\n");
        let query = response(1, "http://h/y/a", 200, "OK", &query_body);

        assert!(!classifier.is_404(&query));
        assert_eq!(opener.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn idempotent_diff_cache_avoids_a_second_probe_on_repeat() {
        let classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let boilerplate = "shared boilerplate line\n".repeat(400);
        let probe_1 = format!("{boilerplate}{}", missing_line("randtok1"));
        let probe_2 = format!("{boilerplate}{}", missing_line("randtok2"));
        let opener = Arc::new(ScriptedOpener::from_owned(vec![probe_1, probe_2]));
        classifier.set_opener(opener.clone());

        let first_query = response(1, "http://h/y/a", 200, "OK", &format!("{boilerplate}{}", missing_line("randtok3")));
        assert!(classifier.is_404(&first_query));
        assert_eq!(opener.calls.load(Ordering::SeqCst), 2);

        // Different body, same path: the diff is already cached, so this
        // classification must not issue a third probe.
        let second_query = response(2, "http://h/y/a", 200, "OK", &format!("{boilerplate}{}", missing_line("randtok4")));
        assert!(classifier.is_404(&second_query));
        assert_eq!(opener.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_discards_store_and_requires_opener_rebind() {
        let mut classifier = Classifier::new_in_memory(ClassifierConfig::default()).unwrap();
        let opener = Arc::new(ScriptedOpener::new(&["<html>Not Found</html>"]));
        classifier.set_opener(opener);

        let query = response(1, "http://h/x/a", 200, "OK", "<html>Not Found</html>");
        assert!(classifier.is_404(&query));

        classifier.reset(ClassifierConfig::default(), None).unwrap();

        // No opener bound after reset: falls back conservatively.
        assert!(!classifier.is_404(&query));
    }
}
