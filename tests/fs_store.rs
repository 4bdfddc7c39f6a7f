mod common;

use statcard::{
    AssetStore, DisposalTracker, FsAssetStore,
    assemble::{fetch_asset, fetch_optional},
};

#[test]
fn fs_store_reads_blobs_by_logical_name() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("portrait_1"), common::solid_png(4, 4, [1, 2, 3, 255]))
        .unwrap();

    let store = FsAssetStore::new(dir.path());
    assert!(store.exists("portrait_1"));
    assert!(!store.exists("portrait_2"));

    let tracker = DisposalTracker::new();
    let handle = fetch_asset(&store, &tracker, "portrait_1").unwrap();
    assert_eq!(handle.image.dimensions(), (4, 4));
    assert_eq!(tracker.live(), 1);
    drop(handle);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn fs_store_missing_blob_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsAssetStore::new(dir.path());

    let tracker = DisposalTracker::new();
    let err = fetch_asset(&store, &tracker, "ghost").unwrap_err();
    assert!(err.is_not_found());
    assert!(fetch_optional(&store, &tracker, "ghost").unwrap().is_none());
}

#[test]
fn fs_store_rejects_path_like_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsAssetStore::new(dir.path());
    assert!(!store.exists("../escape"));
    assert!(store.open_read("../escape").is_err());
}

#[test]
fn fs_store_undecodable_blob_is_an_asset_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken"), b"not an image").unwrap();

    let store = FsAssetStore::new(dir.path());
    let tracker = DisposalTracker::new();
    let err = fetch_asset(&store, &tracker, "broken").unwrap_err();
    assert!(err.to_string().contains("decode asset 'broken'"));
    assert_eq!(tracker.live(), 0);
}
