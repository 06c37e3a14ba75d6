use engine::catalog::{
    AccountService, CatalogClient, CatalogConfig, CatalogError, Credentials, HttpCatalog, Report,
    Session,
};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

// Helper module for catalog client testing
mod catalog_helpers {
    use super::*;

    pub fn config(server: &MockServer) -> CatalogConfig {
        CatalogConfig {
            endpoint: server.base_url(),
            api_key: Some("test-key".to_string()),
            request_timeout: Duration::from_secs(5),
            ..CatalogConfig::default()
        }
    }

    pub fn client(server: &MockServer) -> HttpCatalog {
        HttpCatalog::new(config(server)).unwrap()
    }

    pub fn session() -> Session {
        Session {
            id: "sess1".to_string(),
            user_id: "user1".to_string(),
            secret: "session-secret".to_string(),
        }
    }
}

use catalog_helpers::*;

#[test]
fn test_requires_endpoint() {
    let result = HttpCatalog::new(CatalogConfig::default());
    assert!(matches!(result, Err(CatalogError::NotConfigured(_))));
}

#[tokio::test]
async fn test_list_themes_sends_project_headers() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/databases/reskin/collections/themes/documents")
            .header("X-Appwrite-Project", "reskin")
            .header("X-Appwrite-Key", "test-key");
        then.status(200).json_body(json!({
            "total": 2,
            "documents": [
                {"$id": "t1", "name": "Cool", "author": "ann", "description": "d",
                 "preview": "https://p/1.png", "file": "f1", "tags": ["dark"]},
                {"$id": "t2", "name": "Warm", "author": "bob", "file": "f2", "tags": "light"}
            ]
        }));
    });

    let themes = client(&server).list_themes().await.unwrap();

    list.assert();
    assert_eq!(themes.len(), 2);
    assert_eq!(themes[0].id, "t1");
    assert_eq!(themes[1].tags, vec!["light"]);
    assert_eq!(themes[1].description, "");
}

#[tokio::test]
async fn test_get_theme() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/databases/reskin/collections/themes/documents/t1");
        then.status(200).json_body(json!(
            {"$id": "t1", "name": "Cool", "author": "ann", "file": "f1"}
        ));
    });

    let theme = client(&server).get_theme("t1").await.unwrap();
    assert_eq!(theme.name, "Cool");
    assert_eq!(theme.file, "f1");
}

#[tokio::test]
async fn test_status_errors_are_surfaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/databases/reskin/collections/themes/documents/missing");
        then.status(404).body("Document not found");
    });

    let err = client(&server).get_theme("missing").await.unwrap_err();
    assert_eq!(
        err,
        CatalogError::Status {
            status: 404,
            body: "Document not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_invalid_json_is_invalid_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/databases/reskin/collections/themes/documents");
        then.status(200).body("<html>");
    });

    let err = client(&server).list_themes().await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_download_package() {
    let server = MockServer::start();
    let download = server.mock(|when, then| {
        when.method(GET)
            .path("/storage/buckets/themes/files/f1/download")
            .header("X-Appwrite-Project", "reskin");
        then.status(200).body(b"RSKN-package-bytes".to_vec());
    });

    let bytes = client(&server).download_package("f1", 1024).await.unwrap();

    download.assert();
    assert_eq!(bytes, b"RSKN-package-bytes");
}

#[tokio::test]
async fn test_download_enforces_size_limit() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/storage/buckets/themes/files/big/download");
        then.status(200).body(vec![0u8; 4096]);
    });

    let err = client(&server).download_package("big", 100).await.unwrap_err();
    assert_eq!(err, CatalogError::PayloadTooLarge { limit: 100 });
}

#[tokio::test]
async fn test_create_report() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/databases/reskin/collections/reports/documents")
            .body_includes("\"themeId\":\"t1\"")
            .body_includes("\"reporterId\":\"anonymous\"")
            .body_includes("\"reason\":\"malware\"");
        then.status(201).json_body(json!({"$id": "r1"}));
    });

    let report = Report::new("t1", None, "malware").unwrap();
    client(&server).create_report(&report).await.unwrap();

    create.assert();
}

#[tokio::test]
async fn test_blank_report_is_not_sent() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/databases/reskin/collections/reports/documents");
        then.status(201);
    });

    let report = Report {
        theme_id: "t1".to_string(),
        reporter_id: "anonymous".to_string(),
        reason: "  ".to_string(),
    };
    let err = client(&server).create_report(&report).await.unwrap_err();

    assert!(matches!(err, CatalogError::InvalidReport(_)));
    assert_eq!(create.calls(), 0);
}

#[tokio::test]
async fn test_sign_in_flow() {
    let server = MockServer::start();
    let sessions = server.mock(|when, then| {
        when.method(POST)
            .path("/account/sessions/email")
            .body_includes("\"email\":\"a@b.c\"");
        then.status(201)
            .json_body(json!({"$id": "sess1", "userId": "user1", "secret": "session-secret"}));
    });
    let account = server.mock(|when, then| {
        when.method(GET)
            .path("/account")
            .header("X-Appwrite-Session", "session-secret");
        then.status(200)
            .json_body(json!({"$id": "user1", "email": "a@b.c", "name": "Ann"}));
    });

    let client = client(&server);
    let session = client
        .create_session(&Credentials::new("a@b.c", "pw"))
        .await
        .unwrap();
    let identity = client.current_user(&session).await.unwrap();

    sessions.assert();
    account.assert();
    assert_eq!(session, catalog_helpers::session());
    assert_eq!(identity.id, "user1");
    assert_eq!(identity.name, "Ann");
}

#[tokio::test]
async fn test_create_account_and_recovery() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/account")
            .body_includes("\"name\":\"Ann\"");
        then.status(201)
            .json_body(json!({"$id": "user1", "email": "a@b.c", "name": "Ann"}));
    });
    let recovery = server.mock(|when, then| {
        when.method(POST)
            .path("/account/recovery")
            .body_includes("\"email\":\"a@b.c\"")
            .body_includes("set-new-password");
        then.status(201).json_body(json!({}));
    });

    let client = client(&server);
    let identity = client
        .create_account(Some("Ann"), &Credentials::new("a@b.c", "pw"))
        .await
        .unwrap();
    client.request_recovery("a@b.c").await.unwrap();

    create.assert();
    recovery.assert();
    assert_eq!(identity.email, "a@b.c");
}

#[tokio::test]
async fn test_delete_session() {
    let server = MockServer::start();
    let delete = server.mock(|when, then| {
        when.method(DELETE)
            .path("/account/sessions/sess1")
            .header("X-Appwrite-Session", "session-secret");
        then.status(204);
    });

    client(&server).delete_session(&session()).await.unwrap();
    delete.assert();
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_failure() {
    let config = CatalogConfig {
        endpoint: "http://127.0.0.1:9".to_string(),
        request_timeout: Duration::from_secs(2),
        ..CatalogConfig::default()
    };
    let err = HttpCatalog::new(config).unwrap().list_themes().await.unwrap_err();

    assert!(matches!(err, CatalogError::RequestFailed { .. }));
}
