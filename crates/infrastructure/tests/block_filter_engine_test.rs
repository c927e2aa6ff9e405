mod helpers;

use helpers::MockBlocklistRepository;
use sinkhole_dns_application::ports::{BlockFilterEnginePort, FilterDecision};
use sinkhole_dns_domain::StoreFailurePolicy;
use sinkhole_dns_infrastructure::dns::BlockFilterEngine;
use std::num::NonZeroUsize;
use std::sync::Arc;

fn engine_with(repo: &MockBlocklistRepository, capacity: usize) -> BlockFilterEngine {
    BlockFilterEngine::new(
        Arc::new(repo.clone()),
        NonZeroUsize::new(capacity).unwrap(),
        StoreFailurePolicy::Allow,
    )
}

// ── hierarchy ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_subdomain_of_blocked_parent_is_blocked() {
    let repo = MockBlocklistRepository::with_domains(&["ads.example.com"]);
    let engine = engine_with(&repo, 100);

    assert!(engine.is_blocked("pixel.ads.example.com").await);
    assert!(engine.is_blocked("ads.example.com").await);
}

#[tokio::test]
async fn test_parent_of_blocked_domain_is_not_blocked() {
    let repo = MockBlocklistRepository::with_domains(&["ads.example.com"]);
    let engine = engine_with(&repo, 100);

    assert!(!engine.is_blocked("example.com").await);
    assert!(!engine.is_blocked("notads.example.com").await);
}

#[tokio::test]
async fn test_all_suffixes_checked_in_one_lookup_longest_first() {
    let repo = MockBlocklistRepository::new();
    let engine = engine_with(&repo, 100);

    engine.is_blocked("a.b.example.com").await;

    assert_eq!(repo.calls(), 1);
    assert_eq!(
        repo.lookups()[0],
        vec!["a.b.example.com", "b.example.com", "example.com", "com"]
    );
}

#[tokio::test]
async fn test_matching_is_case_insensitive_and_ignores_trailing_dot() {
    let repo = MockBlocklistRepository::with_domains(&["tracker.net"]);
    let engine = engine_with(&repo, 100);

    assert!(engine.is_blocked("CDN.Tracker.NET.").await);
    assert_eq!(repo.lookups()[0][0], "cdn.tracker.net");
}

#[tokio::test]
async fn test_root_name_is_never_blocked_and_skips_store() {
    let repo = MockBlocklistRepository::with_domains(&["com"]);
    let engine = engine_with(&repo, 100);

    assert!(!engine.is_blocked("").await);
    assert!(!engine.is_blocked(".").await);
    assert_eq!(repo.calls(), 0);
    assert_eq!(engine.cache_stats().entries, 0);
}

#[tokio::test]
async fn test_check_maps_to_filter_decision() {
    let repo = MockBlocklistRepository::with_domains(&["ads.example.com"]);
    let engine = engine_with(&repo, 100);

    assert_eq!(engine.check("x.ads.example.com").await, FilterDecision::Block);
    assert_eq!(engine.check("openai.com").await, FilterDecision::Allow);
}

// ── memoization ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_repeat_query_is_answered_from_cache() {
    let repo = MockBlocklistRepository::with_domains(&["ads.example.com"]);
    let engine = engine_with(&repo, 100);

    assert!(engine.is_blocked("pixel.ads.example.com").await);
    assert!(engine.is_blocked("pixel.ads.example.com").await);
    assert!(engine.is_blocked("PIXEL.ads.example.com.").await);

    assert_eq!(repo.calls(), 1);
    let stats = engine.cache_stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_allow_decisions_are_cached_too() {
    let repo = MockBlocklistRepository::new();
    let engine = engine_with(&repo, 100);

    assert!(!engine.is_blocked("openai.com").await);
    assert!(!engine.is_blocked("openai.com").await);
    assert_eq!(repo.calls(), 1);
}

#[tokio::test]
async fn test_cached_decision_survives_block_set_change() {
    let repo = MockBlocklistRepository::new();
    let engine = engine_with(&repo, 100);

    assert!(!engine.is_blocked("late.example.com").await);
    repo.add("late.example.com");

    assert!(!engine.is_blocked("late.example.com").await);

    engine.clear_cache();
    assert!(engine.is_blocked("late.example.com").await);
}

#[tokio::test]
async fn test_lru_capacity_two_evicts_oldest() {
    let repo = MockBlocklistRepository::new();
    let engine = engine_with(&repo, 2);

    engine.is_blocked("a.com").await;
    engine.is_blocked("b.com").await;
    engine.is_blocked("c.com").await;
    assert_eq!(repo.calls(), 3);
    assert!(!engine.is_cached("a.com"));
    assert!(engine.is_cached("b.com"));
    assert!(engine.is_cached("c.com"));

    engine.is_blocked("a.com").await;
    assert_eq!(repo.calls(), 4);
    assert_eq!(engine.cache_stats().entries, 2);
}

// ── store failures ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_store_failure_fails_open_by_default_and_is_not_cached() {
    let repo = MockBlocklistRepository::with_domains(&["ads.example.com"]);
    repo.set_should_fail(true);
    let engine = engine_with(&repo, 100);

    assert!(!engine.is_blocked("ads.example.com").await);
    assert!(!engine.is_cached("ads.example.com"));

    repo.set_should_fail(false);
    assert!(engine.is_blocked("ads.example.com").await);
    assert_eq!(repo.calls(), 2);
}

#[tokio::test]
async fn test_store_failure_fails_closed_when_configured() {
    let repo = MockBlocklistRepository::new();
    repo.set_should_fail(true);
    let engine = BlockFilterEngine::new(
        Arc::new(repo.clone()),
        NonZeroUsize::new(16).unwrap(),
        StoreFailurePolicy::Block,
    );

    assert!(engine.is_blocked("openai.com").await);
    assert!(!engine.is_cached("openai.com"));
}

// ── concurrency ────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_agree() {
    let repo = MockBlocklistRepository::with_domains(&["ads.example.com"]);
    let engine = Arc::new(engine_with(&repo, 1000));

    let mut handles = Vec::new();
    for i in 0..64 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let domain = if i % 2 == 0 {
                format!("h{}.ads.example.com", i % 8)
            } else {
                format!("h{}.example.org", i % 8)
            };
            (i, engine.is_blocked(&domain).await)
        }));
    }

    for handle in handles {
        let (i, blocked) = handle.await.unwrap();
        assert_eq!(blocked, i % 2 == 0);
    }
    assert!(engine.cache_stats().entries <= 8);
}
