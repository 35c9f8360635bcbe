//! Tests for MirrorPool substitution and bookkeeping.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::MirrorPool;
use crate::repo::{Repo, RepoId};

const M0: &str = "https://m0.example/repo";
const M1: &str = "https://m1.example/repo";
const M2: &str = "https://m2.example/repo";
const M3: &str = "https://m3.example/repo";

fn repo() -> Repo {
    Repo::new(1, M0, [M1, M2, M3])
}

#[test]
fn last_working_defaults_to_address() {
    let pool = MirrorPool::new();
    assert_eq!(pool.get_last_working_mirror(&repo()), M0);
}

#[test]
fn record_then_get_roundtrip() {
    let pool = MirrorPool::new();
    let r = repo();
    pool.record_working_mirror(&r, M2);
    assert_eq!(pool.get_last_working_mirror(&r), M2);
    pool.record_working_mirror(&r, M3);
    assert_eq!(pool.get_last_working_mirror(&r), M3);
}

#[test]
fn record_keeps_url_exactly_as_given() {
    let pool = MirrorPool::new();
    let r = repo();
    let url = "https://m2.example/repo/";
    pool.record_working_mirror(&r, url);
    assert_eq!(pool.get_last_working_mirror(&r), url);
}

#[test]
fn entries_are_per_repo() {
    let pool = MirrorPool::new();
    let a = repo();
    let b = Repo::new(2, "https://b.example/repo", ["https://b2.example/repo"]);
    pool.record_working_mirror(&a, M1);
    assert_eq!(pool.get_last_working_mirror(&b), "https://b.example/repo");
    assert_eq!(pool.entries(), vec![(RepoId(1), M1.to_string())]);
}

#[test]
fn substitute_moves_away_from_address_first() {
    let pool = MirrorPool::new();
    let r = repo();
    let mut rng = StdRng::seed_from_u64(5);
    let url = format!("{M0}/index-v1.jar");
    let next = pool.substitute_mirror(&url, &r, &mut rng).unwrap();
    assert!(!next.starts_with(M0));
    assert!(next.ends_with("/index-v1.jar"));
    let recorded = pool.get_last_working_mirror(&r);
    assert_eq!(next, format!("{recorded}/index-v1.jar"));
}

#[test]
fn consecutive_substitutions_never_repeat_mirror() {
    let pool = MirrorPool::new();
    let r = repo();
    let mut rng = StdRng::seed_from_u64(17);
    let mut url = format!("{M0}/icons/app.png");
    let mut previous = M0.to_string();
    for _ in 0..100 {
        url = pool.substitute_mirror(&url, &r, &mut rng).unwrap();
        let current = pool.get_last_working_mirror(&r);
        assert_ne!(current, previous);
        assert!(url.starts_with(&current));
        previous = current;
    }
}

#[test]
fn substitute_with_single_candidate_is_deterministic() {
    let pool = MirrorPool::new();
    let r = Repo::new(3, M0, Vec::<String>::new());
    let mut rng = StdRng::seed_from_u64(1);
    let url = format!("{M0}/x.apk");
    assert_eq!(pool.substitute_mirror(&url, &r, &mut rng).unwrap(), url);
    assert_eq!(pool.get_last_working_mirror(&r), M0);
}

#[test]
fn substitute_non_matching_url_is_noop_but_records() {
    let pool = MirrorPool::new();
    let r = repo();
    let mut rng = StdRng::seed_from_u64(2);
    let url = "https://unrelated.example/x.apk";
    assert_eq!(pool.substitute_mirror(url, &r, &mut rng).unwrap(), url);
    assert_ne!(pool.get_last_working_mirror(&r), M0);
}

#[test]
fn clear_forgets_everything() {
    let pool = MirrorPool::new();
    let r = repo();
    pool.record_working_mirror(&r, M1);
    pool.clear();
    assert_eq!(pool.get_last_working_mirror(&r), M0);
    assert!(pool.entries().is_empty());
}

#[test]
fn mirror_for_url_prefers_longest_prefix() {
    let r = Repo::new(
        4,
        "https://a.example/repo",
        ["https://a.example/repo/archive"],
    );
    assert_eq!(
        MirrorPool::mirror_for_url(&r, "https://a.example/repo/archive/x.apk").as_deref(),
        Some("https://a.example/repo/archive")
    );
    assert_eq!(
        MirrorPool::mirror_for_url(&r, "https://a.example/repo/x.apk").as_deref(),
        Some("https://a.example/repo")
    );
    assert_eq!(MirrorPool::mirror_for_url(&r, "https://zzz/x"), None);
}
