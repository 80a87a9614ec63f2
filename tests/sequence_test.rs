//! Integration tests for sequence code allocation.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use cdnstore_database::{MemorySequenceRepository, SequenceRepository};
use cdnstore_entity::sequence::{DateTag, NewSequenceCounter};
use cdnstore_service::SequenceAllocator;

use helpers::{GROUP_ALIAS, TestApp, is_fallback};

#[tokio::test]
async fn test_fallback_then_seeded_sequence() {
    let app = TestApp::new().await;

    let code = app.allocator.next_code(GROUP_ALIAS, true).await.unwrap();
    assert!(is_fallback(&code), "{code}");
    assert_eq!(app.sequence_repo.write_count().await, 0);

    app.seed_counter().await;
    let today = DateTag::today();

    let first = app.allocator.next_code(GROUP_ALIAS, true).await.unwrap();
    assert_eq!(first, format!("{}0001{}", today.year_month(), today.day()));

    let second = app.allocator.next_code(GROUP_ALIAS, true).await.unwrap();
    assert_eq!(second, format!("{}0002{}", today.year_month(), today.day()));

    let counter = app.allocator.counter(GROUP_ALIAS).await.unwrap();
    assert_eq!(counter.queue, 3);
}

#[tokio::test]
async fn test_prefix_and_suffix_wrap_code() {
    let app = TestApp::new().await;
    app.allocator
        .seed("invoice", Some("INV-".into()), Some("-X".into()))
        .await
        .unwrap();
    let today = DateTag::today();

    let code = app.allocator.next_code("invoice", false).await.unwrap();
    assert_eq!(
        code,
        format!("INV-{}0001{}-X", today.year_month(), today.day())
    );
}

#[tokio::test]
async fn test_duplicate_seed_conflicts() {
    let app = TestApp::new().await;
    app.seed_counter().await;

    let err = app.allocator.seed(GROUP_ALIAS, None, None).await.unwrap_err();
    assert_eq!(err.kind, cdnstore_core::error::ErrorKind::Conflict);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_are_unique() {
    const TASKS: usize = 20;

    let today = DateTag::parse("250615").unwrap();
    let repo = MemorySequenceRepository::new();
    repo.create(&NewSequenceCounter::starting(GROUP_ALIAS, &today))
        .await
        .unwrap();

    let allocator = Arc::new(SequenceAllocator::new(Arc::new(repo.clone())));

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let allocator = allocator.clone();
            let today = today.clone();
            tokio::spawn(async move {
                allocator.next_code_on(GROUP_ALIAS, true, &today).await
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        let code = handle.await.unwrap().unwrap();
        assert!(codes.insert(code.clone()), "duplicate code {code}");
    }

    let expected: HashSet<String> = (1..=TASKS)
        .map(|q| format!("2506{q:04}15"))
        .collect();
    assert_eq!(codes, expected);

    let counter = repo.find_by_alias(GROUP_ALIAS).await.unwrap().unwrap();
    assert_eq!(counter.queue, TASKS as i32 + 1);
}
