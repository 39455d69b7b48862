use httptest::{matchers::*, responders::*, Expectation, Server};
use records::{FirestoreRecords, RecordDocument, RecordError, RecordStore};
use serde_json::json;

const COLLECTION_PATH: &str = "/projects/memorial/databases/(default)/documents/images";

fn client(server: &Server) -> FirestoreRecords {
    FirestoreRecords::with_base_url("memorial".into(), "images".into(), server.url_str(""))
}

#[tokio::test]
async fn read_all_pages_through_collection() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", COLLECTION_PATH),
            request::query(url_decoded(not(contains(key("pageToken"))))),
        ])
        .respond_with(json_encoded(json!({
            "documents": [{
                "name": "projects/memorial/databases/(default)/documents/images/a.jpg",
                "fields": {
                    "imageUrl": {"stringValue": "http://x/a.jpg"},
                    "fileName": {"stringValue": "a.jpg"},
                    "fileType": {"stringValue": "image"},
                    "uploadedAt": {"timestampValue": "2024-02-01T08:30:00Z"}
                }
            }],
            "nextPageToken": "next"
        }))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", COLLECTION_PATH),
            request::query(url_decoded(contains(("pageToken", "next")))),
        ])
        .respond_with(json_encoded(json!({
            "documents": [{
                "name": "projects/memorial/databases/(default)/documents/images/broken",
                "fields": {"imageUrl": {"stringValue": "http://x/broken"}}
            }]
        }))),
    );

    let docs = client(&server).read_all().await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "a.jpg");
    assert!(docs[0].uploaded_at.is_some());
    assert_eq!(docs[1].file_name, None);
}

#[tokio::test]
async fn commit_batch_sends_update_writes() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/projects/memorial/databases/(default)/documents:commit"),
            request::body(json_decoded(eq(json!({
                "writes": [{
                    "update": {
                        "name": "projects/memorial/databases/(default)/documents/images/a.jpg",
                        "fields": {
                            "imageUrl": {"stringValue": "u"},
                            "fileName": {"stringValue": "a.jpg"},
                            "fileType": {"stringValue": "image"}
                        }
                    }
                }]
            })))),
        ])
        .respond_with(json_encoded(json!({"writeResults": [{}]}))),
    );

    let doc = RecordDocument {
        id: "a.jpg".into(),
        media_url: Some("u".into()),
        file_name: Some("a.jpg".into()),
        media_type: Some("image".into()),
        ..Default::default()
    };
    client(&server).commit_batch(vec![doc]).await.unwrap();
}

#[tokio::test]
async fn failed_delete_is_backend_error() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path(
            "DELETE",
            "/projects/memorial/databases/(default)/documents/images/a.jpg",
        ))
        .respond_with(status_code(403).body("PERMISSION_DENIED")),
    );

    let err = client(&server).delete("a.jpg").await.unwrap_err();
    match err {
        RecordError::BackendError(msg) => assert!(msg.contains("PERMISSION_DENIED")),
        other => panic!("unexpected error: {:?}", other),
    }
}
