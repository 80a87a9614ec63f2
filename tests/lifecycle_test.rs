//! Integration tests for the asset lifecycle.

mod helpers;

use cdnstore_core::error::ErrorKind;
use cdnstore_core::types::{PageRequest, SoftDeleteScope};
use cdnstore_database::AssetRepository;
use cdnstore_entity::asset::{AssetFilter, SizeLabel};

use helpers::TestApp;

#[tokio::test]
async fn test_soft_delete_hides_from_default_lookups() {
    let app = TestApp::new().await;
    app.seed_counter().await;
    let group = app.upload_png(800, 400, None, None).await.unwrap();
    let original = group.original().unwrap().clone();

    app.lifecycle.delete(original.id).await.unwrap();

    assert!(
        app.assets
            .get(original.id, SoftDeleteScope::Active)
            .await
            .unwrap_err()
            .is_not_found()
    );
    let found = app
        .assets
        .get(original.id, SoftDeleteScope::OnlyDeleted)
        .await
        .unwrap();
    assert!(found.is_deleted());

    // Soft deletion keeps the file.
    assert!(app.disk_path(&original.file_path).exists());

    let active = app
        .assets
        .count(&AssetFilter::default())
        .await
        .unwrap();
    assert_eq!(active as usize, group.len() - 1);
}

#[tokio::test]
async fn test_restore_requires_soft_deleted() {
    let app = TestApp::new().await;
    app.seed_counter().await;
    let group = app.upload_png(800, 400, None, None).await.unwrap();
    let id = group.original().unwrap().id;

    let err = app.lifecycle.restore(id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    app.lifecycle.delete(id).await.unwrap();
    let restored = app.lifecycle.restore(id).await.unwrap();
    assert!(!restored.is_deleted());
}

#[tokio::test]
async fn test_group_purge_removes_rows_and_files() {
    let app = TestApp::new().await;
    app.seed_counter().await;
    let group = app.upload_png(1400, 700, None, None).await.unwrap();
    let other = app.upload_png(400, 200, None, None).await.unwrap();
    assert_eq!(group.len(), 4);

    app.lifecycle.delete_group(&group.code, None).await.unwrap();
    let purged = app
        .lifecycle
        .force_delete_group(&group.code, None)
        .await
        .unwrap();
    assert_eq!(purged.len(), 4);

    for asset in &purged {
        assert!(!app.disk_path(&asset.file_path).exists(), "{}", asset.file_path);
    }
    assert!(
        app.asset_repo
            .find_by_group_code(&group.code, None, SoftDeleteScope::WithDeleted)
            .await
            .unwrap()
            .is_empty()
    );

    let remaining: Vec<String> = other.assets.iter().map(|a| a.file_path.clone()).collect();
    let mut expected = remaining.clone();
    expected.sort();
    assert_eq!(app.stored_files(), expected);
}

#[tokio::test]
async fn test_group_operations_with_size_filter() {
    let app = TestApp::new().await;
    app.seed_counter().await;
    let group = app.upload_png(1000, 500, None, None).await.unwrap();
    let small: SizeLabel = "small".parse().unwrap();

    let deleted = app
        .lifecycle
        .delete_group(&group.code, Some(&small))
        .await
        .unwrap();
    assert_eq!(deleted.len(), 1);

    let active = app
        .assets
        .group(&group.code, None, SoftDeleteScope::Active)
        .await
        .unwrap();
    assert_eq!(active.len(), group.len() - 1);
    assert!(active.assets.iter().all(|a| a.size_label != small));

    let err = app
        .lifecycle
        .restore_group("NO-SUCH-GROUP", None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_listing_pages_newest_first() {
    let app = TestApp::new().await;
    app.seed_counter().await;
    for _ in 0..3 {
        app.upload_png(200, 100, None, None).await.unwrap();
    }

    let filter = AssetFilter {
        size_label: Some(SizeLabel::original()),
        ..AssetFilter::default()
    };
    let first = app
        .assets
        .list(&PageRequest::new(1, 2), &filter)
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.total_items, 3);

    let second = app
        .assets
        .list(&PageRequest::new(2, 2), &filter)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(first.items[0].created_at >= second.items[0].created_at);
}
