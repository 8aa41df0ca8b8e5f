//! End-to-end tests of the HTTP API over the in-memory store.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
}

// -- accounts ----------------------------------------------------------------

#[tokio::test]
async fn test_register_hides_password_and_rejects_duplicates() {
    let app = TestApp::new().await;
    let body = json!({
        "fullname": "Ada Lovelace",
        "email": "Ada@Test.com",
        "password": "password123",
        "password_conf": "password123",
    });

    let first = app.request("POST", "/api/users", Some(body.clone()), None).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.data()["email"], "ada@test.com");
    assert!(first.data().get("password_hash").is_none());

    let second = app.request("POST", "/api/users", Some(body), None).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;
    let mismatch = json!({
        "fullname": "Ada",
        "email": "ada@test.com",
        "password": "password123",
        "password_conf": "password124",
    });
    let response = app.request("POST", "/api/users", Some(mismatch), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "VALIDATION");

    let short = json!({
        "fullname": "Ada",
        "email": "ada@test.com",
        "password": "short",
        "password_conf": "short",
    });
    let response = app.request("POST", "/api/users", Some(short), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;
    app.register("Ada", "ada@test.com", "password123").await;

    let body = json!({ "email": "ada@test.com", "password": "password999" });
    let response = app.request("POST", "/api/auth/login", Some(body), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let body = json!({ "email": "nobody@test.com", "password": "password123" });
    let response = app.request("POST", "/api/auth/login", Some(body), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// -- access ------------------------------------------------------------------

#[tokio::test]
async fn test_file_routes_require_token() {
    let app = TestApp::new().await;
    let (user, _) = app.signed_in("ada").await;

    let path = format!("/api/users/{user}/files");
    let response = app.request("GET", &path, None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.request("GET", &path, None, Some("not-a-token")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_other_users_tree_is_off_limits() {
    let app = TestApp::new().await;
    let (ada, ada_token) = app.signed_in("ada").await;
    let (bob, bob_token) = app.signed_in("bob").await;
    let docs = app.folder(&ada, &ada_token, "Docs", None).await;

    // Bob naming Ada in the path.
    let response = app
        .request("GET", &format!("/api/users/{ada}/files"), None, Some(&bob_token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Bob asking for Ada's node under his own path.
    let response = app
        .request("GET", &format!("/api/users/{bob}/files/{docs}"), None, Some(&bob_token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    let app = TestApp::new().await;
    let (user, token) = app.signed_in("ada").await;
    let response = app
        .request("GET", &format!("/api/users/{user}/files/folder-1"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// -- folders -----------------------------------------------------------------

#[tokio::test]
async fn test_docs_and_reports() {
    let app = TestApp::new().await;
    let (user, token) = app.signed_in("ada").await;

    let docs = app.folder(&user, &token, "Docs", None).await;
    let reports = app.folder(&user, &token, "Reports", Some(&docs)).await;

    let response = app
        .request("GET", &format!("/api/users/{user}/files/{docs}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["kind"], "folder");
    assert_eq!(data["tag"], docs.as_str());
    assert_eq!(data["last_index"], 1);
    assert_eq!(data["parent_id"], "0");
    let children = data["children"].as_array().expect("children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["id"], reports.as_str());
    assert_eq!(children[0]["tag"], format!("{docs}#1"));

    // Docs cannot go below its own child.
    let response = app
        .request(
            "PUT",
            &format!("/api/users/{user}/files/{docs}"),
            Some(json!({ "parent_id": reports })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error(), "CYCLE_REJECTED");

    // Reports to the top level with an explicit null.
    let response = app
        .request(
            "PUT",
            &format!("/api/users/{user}/files/{reports}"),
            Some(json!({ "parent_id": null })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["parent_id"], "0");
    assert_eq!(response.data()["tag"], reports.as_str());

    let listing = app
        .request("GET", &format!("/api/users/{user}/files"), None, Some(&token))
        .await;
    assert_eq!(listing.data().as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_create_folder_in_missing_parent() {
    let app = TestApp::new().await;
    let (user, token) = app.signed_in("ada").await;
    let body = json!({ "name": "x", "parent_id": "00000000-0000-0000-0000-000000000001" });
    let response = app
        .request("POST", &format!("/api/users/{user}/folders"), Some(body), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rename_and_empty_update() {
    let app = TestApp::new().await;
    let (user, token) = app.signed_in("ada").await;
    let docs = app.folder(&user, &token, "Docs", None).await;
    let path = format!("/api/users/{user}/files/{docs}");

    let response = app
        .request("PUT", &path, Some(json!({ "name": "Papers" })), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["name"], "Papers");

    let response = app.request("PUT", &path, Some(json!({})), Some(&token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// -- files -------------------------------------------------------------------

#[tokio::test]
async fn test_upload_into_folder() {
    let app = TestApp::new().await;
    let (user, token) = app.signed_in("ada").await;
    let docs = app.folder(&user, &token, "Docs", None).await;

    let response = app
        .upload(&user, &token, "my notes.txt", b"hello papers", Some(&docs))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let data = response.data();
    assert_eq!(data["kind"], "file");
    assert_eq!(data["name"], "my_notes.txt");
    assert_eq!(data["size"], 12);
    assert_eq!(data["parent_id"], docs.as_str());
    let uri = data["uri"].as_str().expect("uri");
    assert!(uri.starts_with(&format!("upload/{user}/")), "{uri}");
    assert!(uri.ends_with("/my_notes.txt"), "{uri}");
    assert_eq!(
        std::fs::read(app.blob_path(uri)).expect("blob on disk"),
        b"hello papers"
    );

    let folder = app
        .request("GET", &format!("/api/users/{user}/files/{docs}"), None, Some(&token))
        .await;
    assert_eq!(folder.data()["objects"][0], data["id"]);
    assert_eq!(folder.data()["last_index"], 0);
}

#[tokio::test]
async fn test_same_name_uploads_keep_separate_blobs() {
    let app = TestApp::new().await;
    let (user, token) = app.signed_in("ada").await;
    let a = app.folder(&user, &token, "A", None).await;
    let b = app.folder(&user, &token, "B", None).await;

    let first = app.upload(&user, &token, "q1.pdf", b"first", Some(&a)).await;
    let second = app.upload(&user, &token, "q1.pdf", b"second", Some(&b)).await;
    let first_uri = first.data()["uri"].as_str().expect("uri").to_string();
    let second_uri = second.data()["uri"].as_str().expect("uri").to_string();
    assert_ne!(first_uri, second_uri);

    let response = app
        .request(
            "DELETE",
            &format!("/api/users/{user}/files/{}?hard=true", first.id()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!app.blob_path(&first_uri).exists());
    assert_eq!(
        std::fs::read(app.blob_path(&second_uri)).expect("second blob"),
        b"second"
    );
}

#[tokio::test]
async fn test_upload_rejects_disallowed_extension_and_missing_file() {
    let app = TestApp::new().await;
    let (user, token) = app.signed_in("ada").await;

    let response = app.upload(&user, &token, "run.sh", b"#!/bin/sh", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.upload(&user, &token, "../..", b"x", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_all_and_soft_delete() {
    let app = TestApp::new().await;
    let (user, token) = app.signed_in("ada").await;
    let docs = app.folder(&user, &token, "Docs", None).await;
    let inner = app
        .upload(&user, &token, "inner.txt", b"inner", Some(&docs))
        .await
        .id();

    let root = app
        .request("GET", &format!("/api/users/{user}/files"), None, Some(&token))
        .await;
    assert_eq!(root.data().as_array().map(Vec::len), Some(1));
    let all = app
        .request("GET", &format!("/api/users/{user}/files?all=true"), None, Some(&token))
        .await;
    assert_eq!(all.data().as_array().map(Vec::len), Some(2));

    let response = app
        .request("DELETE", &format!("/api/users/{user}/files/{docs}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["nodes"], 2);
    assert_eq!(response.data()["hard"], false);

    let file = app
        .request("GET", &format!("/api/users/{user}/files/{inner}"), None, Some(&token))
        .await;
    assert_eq!(file.data()["status"], false);

    let root = app
        .request("GET", &format!("/api/users/{user}/files"), None, Some(&token))
        .await;
    assert_eq!(root.data().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_hard_delete_removes_blobs() {
    let app = TestApp::new().await;
    let (user, token) = app.signed_in("ada").await;
    let docs = app.folder(&user, &token, "Docs", None).await;
    let sub = app.folder(&user, &token, "Sub", Some(&docs)).await;
    let upload = app.upload(&user, &token, "deep.pdf", b"%PDF", Some(&sub)).await;
    let uri = upload.data()["uri"].as_str().expect("uri").to_string();
    assert!(app.blob_path(&uri).exists());

    let response = app
        .request(
            "DELETE",
            &format!("/api/users/{user}/files/{docs}?hard=true"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["nodes"], 3);
    assert_eq!(response.data()["blobs"], 1);
    assert!(!app.blob_path(&uri).exists());

    for id in [&docs, &sub] {
        let response = app
            .request("GET", &format!("/api/users/{user}/files/{id}"), None, Some(&token))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}
