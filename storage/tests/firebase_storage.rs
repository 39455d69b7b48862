use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::json;
use std::sync::{Arc, Mutex};
use storage::{FirebaseStorage, ObjectStore, ProgressCallback, StorageError};

fn client(server: &Server) -> FirebaseStorage {
    FirebaseStorage::with_base_url("memorial".into(), server.url_str(""))
}

#[tokio::test]
async fn resumable_upload_reports_progress() {
    let server = Server::run();
    let session = server.url_str("/upload/session-1");
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/v0/b/memorial/o"),
            request::query(url_decoded(contains(("name", "images/mum.jpg")))),
            request::headers(contains(("x-goog-upload-command", "start"))),
        ])
        .respond_with(status_code(200).append_header("X-Goog-Upload-URL", session)),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/upload/session-1"),
            request::headers(contains(("x-goog-upload-command", "upload, finalize"))),
            request::headers(contains(("x-goog-upload-offset", "0"))),
        ])
        .respond_with(json_encoded(json!({
            "name": "images/mum.jpg",
            "downloadTokens": "tok"
        }))),
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let progress: ProgressCallback = Arc::new(move |sent, total| {
        sink.lock().unwrap().push((sent, total));
    });

    client(&server)
        .upload("images/mum.jpg", b"hello".to_vec(), "image/jpeg", Some(progress))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.first(), Some(&(0, 5)));
    assert_eq!(seen.last(), Some(&(5, 5)));
}

#[tokio::test]
async fn download_url_uses_first_token() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path(
            "GET",
            "/v0/b/memorial/o/images%2Fmum.jpg",
        ))
        .respond_with(json_encoded(json!({
            "name": "images/mum.jpg",
            "downloadTokens": "first,second"
        }))),
    );

    let url = client(&server).download_url("images/mum.jpg").await.unwrap();
    assert!(url.ends_with("/v0/b/memorial/o/images%2Fmum.jpg?alt=media&token=first"));
}

#[tokio::test]
async fn delete_missing_object_is_not_found() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path(
            "DELETE",
            "/v0/b/memorial/o/thumbnails%2Fclip.mp4_thumbnail.jpg",
        ))
        .respond_with(status_code(404)),
    );

    let err = client(&server)
        .delete("thumbnails/clip.mp4_thumbnail.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn list_follows_page_tokens() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v0/b/memorial/o"),
            request::query(url_decoded(contains(("prefix", "images/")))),
            request::query(url_decoded(not(contains(key("pageToken"))))),
        ])
        .respond_with(json_encoded(json!({
            "items": [{"name": "images/a.jpg"}],
            "nextPageToken": "p2"
        }))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v0/b/memorial/o"),
            request::query(url_decoded(contains(("pageToken", "p2")))),
        ])
        .respond_with(json_encoded(json!({
            "items": [{"name": "images/b.mp4"}]
        }))),
    );

    let keys = client(&server).list("images/").await.unwrap();
    assert_eq!(keys, vec!["images/a.jpg".to_string(), "images/b.mp4".to_string()]);
}
