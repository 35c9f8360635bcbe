//! Tests for repo descriptors.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;

fn repo() -> Repo {
    Repo::new(
        7,
        "https://f-droid.org/repo/",
        [
            "https://mirror1.example.org/fdroid/repo",
            "https://mirror2.example.org/fdroid/repo/",
        ],
    )
}

#[test]
fn new_normalises_trailing_slashes() {
    let r = repo();
    assert_eq!(r.address, "https://f-droid.org/repo");
    assert_eq!(r.mirrors[1], "https://mirror2.example.org/fdroid/repo");
}

#[test]
fn mirror_list_starts_with_address_and_dedups() {
    let r = Repo::new(
        1,
        "https://a.example/repo",
        [
            "https://a.example/repo",
            "https://b.example/repo",
            "https://b.example/repo/",
        ],
    );
    assert_eq!(
        r.mirror_list(),
        vec!["https://a.example/repo", "https://b.example/repo"]
    );
    assert_eq!(r.mirror_count(), 1);
    assert!(r.has_mirrors());
}

#[test]
fn only_mirror_equal_to_address_means_no_mirrors() {
    let r = Repo::new(1, "https://a.example/repo", ["https://a.example/repo/"]);
    assert_eq!(r.mirror_count(), 0);
    assert!(!r.has_mirrors());
}

#[test]
fn empty_mirrors_means_no_mirrors() {
    let r = Repo::new(1, "https://a.example/repo", Vec::<String>::new());
    assert!(!r.has_mirrors());
    assert_eq!(r.mirror_list(), vec!["https://a.example/repo"]);
}

#[test]
fn user_mirrors_count_as_mirrors() {
    let r = Repo::new(1, "https://a.example/repo", Vec::<String>::new())
        .with_user_mirrors(["https://local.example/repo/"]);
    assert_eq!(r.mirror_count(), 1);
    assert_eq!(r.mirror_list()[1], "https://local.example/repo");
}

#[test]
fn onion_mirrors_filtered_without_tor() {
    let r = Repo::new(
        1,
        "https://a.example/repo",
        ["http://abcdefghijklmnop.onion/repo", "https://b.example/repo"],
    );
    assert_eq!(r.mirror_count(), 1);
    let with_tor = r.clone().with_tor(true);
    assert_eq!(with_tor.mirror_count(), 2);
}

#[test]
fn is_onion_detects_hidden_services() {
    assert!(is_onion("http://xyz.onion/fdroid/repo"));
    assert!(!is_onion("https://onion.example.org/repo"));
}

#[test]
fn resolve_joins_relative_paths() {
    let r = repo();
    assert_eq!(
        r.resolve("index-v1.jar"),
        "https://f-droid.org/repo/index-v1.jar"
    );
    assert_eq!(
        r.resolve("/icons/app.png"),
        "https://f-droid.org/repo/icons/app.png"
    );
    assert_eq!(
        r.resolve("https://other.example/x.apk"),
        "https://other.example/x.apk"
    );
}

#[test]
fn validate_rejects_bad_urls() {
    assert!(repo().validate().is_ok());
    let bad = Repo::new(2, "ftp://a.example/repo", Vec::<String>::new());
    assert!(bad.validate().is_err());
    let garbage = Repo::new(3, "https://a.example/repo", ["not a url"]);
    assert!(garbage.validate().is_err());
}

#[test]
fn get_random_mirror_avoids_excluded() {
    let r = repo();
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let m = r.get_random_mirror(&r.address, &mut rng).unwrap();
        assert_ne!(m, r.address);
    }
}

#[test]
fn get_random_mirror_with_single_candidate_returns_it() {
    let r = Repo::new(1, "https://a.example/repo", Vec::<String>::new());
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(
        r.get_random_mirror("https://a.example/repo", &mut rng),
        Ok("https://a.example/repo".to_string())
    );
}

#[test]
fn from_index_json_reads_repo_section() {
    let json = br#"{
        "repo": {
            "timestamp": 1700000000000,
            "version": 21,
            "name": "F-Droid",
            "address": "https://f-droid.org/repo",
            "mirrors": [
                "https://f-droid.org/repo",
                "https://ftp.fau.de/fdroid/repo",
                "http://fdroidorg6cooksyluodepej4erfctzk7rrjpjbbr6wx24jh3lqyfwyd.onion/fdroid/repo"
            ]
        },
        "apps": [],
        "packages": {}
    }"#;
    let r = Repo::from_index_json(1, json).unwrap();
    assert_eq!(r.name.as_deref(), Some("F-Droid"));
    assert_eq!(r.address, "https://f-droid.org/repo");
    assert_eq!(r.mirrors.len(), 3);
    assert_eq!(r.mirror_count(), 1);
}

#[test]
fn from_index_json_rejects_missing_repo() {
    assert!(Repo::from_index_json(1, br#"{"apps": []}"#).is_err());
}
