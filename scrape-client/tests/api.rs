use scrape_client::{ClientError, ScrapeClient};
use scrape_core::domain::outcome::DownloadRef;
use scrape_core::domain::session::SessionId;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn start_scrape_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .and(body_json(json!({ "url": "https://example.com/clinic/" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "session_id": "1718000000000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    let ack = client
        .start_scrape("https://example.com/clinic/")
        .await
        .expect("start ok");

    assert_eq!(
        ack.accepted_session(),
        Some(&SessionId::new("1718000000000"))
    );
}

#[tokio::test]
async fn start_scrape_rejection_body_is_decoded_on_400() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "no url given"
        })))
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    let ack = client.start_scrape("https://example.com/").await.expect("ack");

    assert!(ack.accepted_session().is_none());
    assert_eq!(ack.error.as_deref(), Some("no url given"));
}

#[tokio::test]
async fn start_scrape_non_json_failure_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    let err = client.start_scrape("https://example.com/").await.unwrap_err();

    match err {
        ClientError::ApiError { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn get_progress_decodes_terminal_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "percentage": 100,
            "status": "done",
            "current_action": "",
            "completed": true,
            "clinic_count": 12,
            "result": {
                "success": true,
                "clinic_count": 12,
                "filename": "a.csv",
                "download_url": "/dl/a"
            }
        })))
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    let snapshot = client
        .get_progress(&SessionId::new("abc"))
        .await
        .expect("progress ok");

    assert!(snapshot.completed);
    assert_eq!(snapshot.percentage, 100);
    let result = snapshot.result.expect("result present");
    assert!(result.success);
    assert_eq!(result.filename.as_deref(), Some("a.csv"));
}

#[tokio::test]
async fn get_progress_unknown_session_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "session not found" })),
        )
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    let err = client
        .get_progress(&SessionId::new("missing"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("session not found"));
}

#[tokio::test]
async fn get_progress_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/abc"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    let err = client
        .get_progress(&SessionId::new("abc"))
        .await
        .unwrap_err();

    assert!(err.is_server_error());
}

#[tokio::test]
async fn get_progress_garbage_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    let err = client
        .get_progress(&SessionId::new("abc"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ParseError(_)));
}

#[tokio::test]
async fn cleanup_and_health() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cleanup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    assert!(client.cleanup().await.expect("cleanup ok").success);
    assert!(client.health().await.expect("health ok").is_ok());
}

#[tokio::test]
async fn cleanup_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cleanup"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    let err = client.cleanup().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn download_fetches_relative_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/clinics.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("name,address\n", "text/csv"))
        .mount(&server)
        .await;

    let client = ScrapeClient::new(server.uri());
    let bytes = client
        .download(&DownloadRef {
            url: "/download/clinics.csv".to_string(),
            filename: "clinics.csv".to_string(),
        })
        .await
        .expect("download ok");

    assert_eq!(bytes, b"name,address\n");
}

#[tokio::test]
async fn download_missing_file_is_not_found() {
    let server = MockServer::start().await;

    let client = ScrapeClient::new(server.uri());
    let err = client
        .download(&DownloadRef {
            url: "/download/gone.csv".to_string(),
            filename: "gone.csv".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotFound(ref name) if name == "gone.csv"));
}
