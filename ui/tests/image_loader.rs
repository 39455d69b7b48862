use httpmock::prelude::*;
use tempfile::tempdir;
use ui::{ImageLoader, ImageLoaderError};

#[tokio::test]
async fn test_download_cached() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/images/a.jpg");
        then.status(200).body("jpegbytes");
    });

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), 2);
    let url = server.url("/images/a.jpg");

    loader.load(&url).await.unwrap();
    let cached = loader.cache_path_for(&url);
    assert!(cached.starts_with(dir.path().join("media")));
    assert_eq!(std::fs::read(&cached).unwrap(), b"jpegbytes");
    mock.assert_hits(1);

    loader.load(&url).await.unwrap();
    mock.assert_hits(1);
}

#[tokio::test]
async fn test_distinct_urls_use_distinct_cache_files() {
    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), 1);
    let a = loader.cache_path_for("https://example.com/images/a.jpg");
    let b = loader.cache_path_for("https://example.com/images/b.jpg");
    assert_ne!(a, b);
    assert_eq!(a, loader.cache_path_for("https://example.com/images/a.jpg"));
}

#[tokio::test]
async fn test_not_found_and_gone_are_missing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/images/missing.jpg");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/images/gone.jpg");
        then.status(410);
    });

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), 1);
    for path in ["/images/missing.jpg", "/images/gone.jpg"] {
        let err = loader.load(&server.url(path)).await.err().unwrap();
        assert!(err.is_missing(), "got {:?}", err);
    }
}

#[tokio::test]
async fn test_server_errors_are_transient() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/images/busy.jpg");
        then.status(503);
    });
    server.mock(|when, then| {
        when.method(GET).path("/images/limited.jpg");
        then.status(429);
    });

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), 1);
    for path in ["/images/busy.jpg", "/images/limited.jpg"] {
        let err = loader.load(&server.url(path)).await.err().unwrap();
        assert!(matches!(err, ImageLoaderError::Request(_)), "got {:?}", err);
        assert!(!err.is_missing());
    }

    // Nothing listens on port 9 locally.
    let err = loader.load("http://127.0.0.1:9/images/a.jpg").await.err().unwrap();
    assert!(matches!(err, ImageLoaderError::Request(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_cache_dir_holds_only_complete_files() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/images/a.jpg");
        then.status(200).body("jpegbytes");
    });
    server.mock(|when, then| {
        when.method(GET).path("/images/b.jpg");
        then.status(503);
    });

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), 2);
    let url = server.url("/images/a.jpg");
    loader.load(&url).await.unwrap();
    assert!(loader.load(&server.url("/images/b.jpg")).await.is_err());

    let entries: Vec<_> = std::fs::read_dir(dir.path().join("media"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries, vec![loader.cache_path_for(&url)]);
}

#[tokio::test]
async fn test_empty_body_is_missing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/images/empty.jpg");
        then.status(200).body("");
    });

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), 1);
    let url = server.url("/images/empty.jpg");
    let err = loader.load(&url).await.err().unwrap();
    assert!(matches!(err, ImageLoaderError::Missing(_)));
    assert!(!loader.cache_path_for(&url).exists());
}

#[tokio::test]
async fn test_local_files() {
    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().join("cache"), 1);

    let present = dir.path().join("present.jpg");
    std::fs::write(&present, b"img").unwrap();
    let url = url::Url::from_file_path(&present).unwrap();
    assert!(loader.load(url.as_str()).await.is_ok());

    let empty = dir.path().join("empty.jpg");
    std::fs::write(&empty, b"").unwrap();
    let url = url::Url::from_file_path(&empty).unwrap();
    assert!(matches!(
        loader.load(url.as_str()).await,
        Err(ImageLoaderError::Missing(_))
    ));

    let url = url::Url::from_file_path(dir.path().join("gone.jpg")).unwrap();
    assert!(matches!(
        loader.load(url.as_str()).await,
        Err(ImageLoaderError::Missing(_))
    ));
}

#[tokio::test]
async fn test_rejects_bad_urls() {
    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), 1);
    assert!(matches!(
        loader.load("not a url").await,
        Err(ImageLoaderError::InvalidUrl(_))
    ));
    assert!(matches!(
        loader.load("mem://images/a.jpg").await,
        Err(ImageLoaderError::UnsupportedScheme(s)) if s == "mem"
    ));
}
