//! Integration tests for uploads.

mod helpers;

use cdnstore_core::error::ErrorKind;
use cdnstore_entity::asset::{NewAsset, SizeLabel, SubjectKind};
use cdnstore_service::UploadRequest;
use uuid::Uuid;

use helpers::{TestApp, is_fallback, png};

#[tokio::test]
async fn test_upload_writes_original_and_variants() {
    let app = TestApp::new().await;
    app.seed_counter().await;

    let group = app.upload_png(900, 600, Some("product"), Some(7)).await.unwrap();

    let original = group.original().unwrap();
    assert!(original.has_optimized);
    assert_eq!(original.subject_kind, Some(SubjectKind::Product));
    assert_eq!(original.subject_id, Some(7));
    assert!(original.file_path.starts_with("images/product/"));

    let labels: Vec<&str> = group.variants().map(|a| a.size_label.as_str()).collect();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&"small"));
    assert!(labels.contains(&"medium"));

    for asset in &group.assets {
        assert_eq!(asset.group_code, group.code);
        let on_disk = std::fs::metadata(app.disk_path(&asset.file_path)).unwrap();
        assert_eq!(on_disk.len() as i64, asset.file_size_bytes);
    }
    assert_eq!(app.stored_files().len(), 3);

    let small: SizeLabel = "small".parse().unwrap();
    let variant = group.assets.iter().find(|a| a.size_label == small).unwrap();
    let decoded = image::open(app.disk_path(&variant.file_path)).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (320, 213));
}

#[tokio::test]
async fn test_upload_without_counter_uses_fallback_code() {
    let app = TestApp::new().await;

    let group = app.upload_png(300, 200, None, None).await.unwrap();
    assert!(is_fallback(&group.code), "{}", group.code);
    // Nothing wider than the source gets derived.
    assert_eq!(group.len(), 1);
}

#[tokio::test]
async fn test_failed_variant_batch_leaves_nothing_behind() {
    let app = TestApp::new().await;
    app.seed_counter().await;
    app.asset_repo.fail_batch_at(Some(1)).await;

    let err = app.upload_png(1600, 800, None, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);

    assert!(app.asset_repo.snapshot().await.is_empty());
    assert!(app.stored_files().is_empty(), "{:?}", app.stored_files());
}

#[tokio::test]
async fn test_create_variants_is_all_or_nothing() {
    let app = TestApp::new().await;
    let batch: Vec<NewAsset> = ["small", "medium", "large", "xlarge"]
        .into_iter()
        .map(|label| NewAsset {
            group_code: "G-BATCH".into(),
            size_label: label.parse().unwrap(),
            file_name: format!("a_{label}.png"),
            file_path: format!("images/gallery/a_{label}.png"),
            file_size_bytes: 1,
            owner_id: Uuid::nil(),
            subject: None,
            is_private: false,
            description: String::new(),
            has_optimized: false,
        })
        .collect();

    app.asset_repo.fail_batch_at(Some(batch.len() / 2)).await;
    assert!(app.assets.create_variants(&batch).await.is_err());
    assert!(app.asset_repo.snapshot().await.is_empty());

    app.asset_repo.fail_batch_at(None).await;
    let created = app.assets.create_variants(&batch).await.unwrap();
    assert_eq!(created.len(), batch.len());
}

#[tokio::test]
async fn test_rejects_disallowed_mime_type() {
    let app = TestApp::new().await;

    let err = app
        .upload
        .upload(UploadRequest {
            original_name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            data: png(10, 10),
            directory: None,
            owner_id: Uuid::nil(),
            subject_kind: None,
            subject_id: None,
            description: String::new(),
            is_private: false,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_rejects_directory_traversal() {
    let app = TestApp::new().await;
    app.seed_counter().await;

    let err = app.upload_png(100, 100, Some("../etc"), None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.asset_repo.snapshot().await.is_empty());
}
