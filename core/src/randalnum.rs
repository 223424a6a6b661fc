//! Random alphanumeric string generation: probe filenames and
//! per-classification trace ids (spec §4.5, SPEC_FULL.md §C.1).

const ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[must_use]
pub fn rand_alnum(len: usize) -> String {
    (0..len).map(|_| ALNUM[rand::random::<usize>() % ALNUM.len()] as char).collect()
}
