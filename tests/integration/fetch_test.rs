//! End-to-end fetch tests against LocalStack.
//!
//! Each test uses its own bucket, uploads a small namespace and mirrors it
//! into a temporary directory through the real S3 backend.

use std::sync::Arc;

use bg_error::ErrorKind;
use bg_fetcher::{
    FetchConfig, Fetcher, NamespaceLister, NoopProgress, S3Backend, create_s3_client,
};
use tempfile::TempDir;

use crate::common::{LocalStackTestContext, generate_payload};

async fn context() -> Option<LocalStackTestContext> {
    let ctx = LocalStackTestContext::new().await;
    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return None;
    }
    Some(ctx)
}

async fn backend(ctx: &LocalStackTestContext, bucket: &str) -> Arc<S3Backend> {
    let client = create_s3_client(&ctx.s3_config(bucket)).await.unwrap();
    Arc::new(S3Backend::new(client))
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_fetch_whole_bucket() {
    let Some(ctx) = context().await else { return };

    let bucket = "bg-fetch-whole-bucket";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.empty_bucket(bucket).await.unwrap();

    let readme = b"read me first".to_vec();
    let cat = generate_payload(64 * 1024 + 17, 7);
    ctx.put_object(bucket, "docs/", Vec::new()).await.unwrap();
    ctx.put_object(bucket, "docs/readme.txt", readme.clone())
        .await
        .unwrap();
    ctx.put_object(bucket, "images/cat.png", cat.clone())
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let fetcher = Fetcher::new(
        backend(&ctx, bucket).await,
        bucket,
        None,
        FetchConfig::new().with_destination(dir.path()),
    );

    let stats = fetcher.run(&NoopProgress).await.unwrap();

    assert_eq!(stats.entries_processed(), 3);
    assert_eq!(stats.folders_created, 1);
    assert!(dir.path().join("docs").is_dir());
    assert_eq!(std::fs::read(dir.path().join("docs/readme.txt")).unwrap(), readme);
    assert_eq!(std::fs::read(dir.path().join("images/cat.png")).unwrap(), cat);

    ctx.empty_bucket(bucket).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_fetch_folder_only() {
    let Some(ctx) = context().await else { return };

    let bucket = "bg-fetch-folder";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.empty_bucket(bucket).await.unwrap();

    ctx.put_object(bucket, "reports/2024/q1.csv", b"q1".to_vec())
        .await
        .unwrap();
    ctx.put_object(bucket, "reports/2024/deep/q2.csv", b"q2".to_vec())
        .await
        .unwrap();
    ctx.put_object(bucket, "other/skip.csv", b"skip".to_vec())
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let fetcher = Fetcher::new(
        backend(&ctx, bucket).await,
        bucket,
        Some("reports/".to_string()),
        FetchConfig::new().with_destination(dir.path()),
    );

    let stats = fetcher.run(&NoopProgress).await.unwrap();

    assert_eq!(stats.files_downloaded, 2);
    assert!(dir.path().join("reports/2024/q1.csv").is_file());
    assert!(dir.path().join("reports/2024/deep/q2.csv").is_file());
    assert!(!dir.path().join("other").exists());

    ctx.empty_bucket(bucket).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_listing_spans_multiple_pages() {
    let Some(ctx) = context().await else { return };

    let bucket = "bg-fetch-pagination";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.empty_bucket(bucket).await.unwrap();

    // ListObjectsV2 returns at most 1000 keys per page
    for i in 0..1005 {
        ctx.put_object(bucket, &format!("many/file_{i:04}.txt"), vec![b'x'])
            .await
            .unwrap();
    }

    let lister = NamespaceLister::new(backend(&ctx, bucket).await, bucket);
    let entries = lister.list("").await.unwrap();
    assert_eq!(entries.len(), 1005);

    ctx.empty_bucket(bucket).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_missing_bucket_is_listing_error() {
    let Some(ctx) = context().await else { return };

    let dir = TempDir::new().unwrap();
    let bucket = "bg-fetch-does-not-exist";
    let fetcher = Fetcher::new(
        backend(&ctx, bucket).await,
        bucket,
        None,
        FetchConfig::new().with_destination(dir.path()),
    );

    let err = fetcher.run(&NoopProgress).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteListing);
}
