// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use chrono::TimeZone;
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{
    body_string_contains, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PATH: &str = "/w/api.php";

fn api_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), API_PATH)
}

fn session_for(server: &MockServer) -> WikiSession {
    WikiSession {
        http_client: reqwest::Client::new(),
        api_url: api_url(server),
        username: "ReportBot".to_string(),
    }
}

fn change(title: &str, user: &str, timestamp: &str, revid: u64) -> Value {
    json!({
        "type": "edit",
        "ns": 0,
        "title": title,
        "revid": revid,
        "old_revid": revid - 1,
        "user": user,
        "timestamp": timestamp,
        "comment": "tweak"
    })
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("meta", "tokens"))
        .and(query_param("type", "login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": { "tokens": { "logintoken": "abc123+\\" } }
        })))
        .mount(server)
        .await;
}

// --- login token ---

#[tokio::test]
async fn fetch_login_token_returns_token() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let token = client.fetch_login_token().await.unwrap();

    assert_eq!(token, "abc123+\\");
}

#[tokio::test]
async fn fetch_login_token_without_token_field_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "query": {} })))
        .mount(&server)
        .await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let err = client.fetch_login_token().await.unwrap_err();

    assert!(matches!(err, Error::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn fetch_login_token_http_failure_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let err = client.fetch_login_token().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn fetch_login_token_non_json_is_response_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login wall</html>"))
        .mount(&server)
        .await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let err = client.fetch_login_token().await.unwrap_err();

    assert!(matches!(err, Error::ResponseShape { .. }), "got {err:?}");
}

#[tokio::test]
async fn api_error_object_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": "readapidenied", "info": "You need read permission." }
        })))
        .mount(&server)
        .await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let err = client.fetch_login_token().await.unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("readapidenied"), "got {msg}");
    assert!(msg.contains("You need read permission."), "got {msg}");
}

// --- login ---

#[tokio::test]
async fn login_success_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("action=login"))
        .and(body_string_contains("lgname=ReportBot"))
        .and(body_string_contains("lgtoken=abc123%2B%5C"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": { "result": "Success", "lguserid": 7, "lgusername": "ReportBot" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let session = client
        .login("abc123+\\", "ReportBot", "hunter2")
        .await
        .unwrap();

    assert_eq!(session.username(), "ReportBot");
    assert_eq!(session.api_url(), api_url(&server));
}

#[tokio::test]
async fn login_failure_includes_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": {
                "result": "Failed",
                "reason": "Incorrect username or password entered."
            }
        })))
        .mount(&server)
        .await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let err = client
        .login("token", "ReportBot", "wrong")
        .await
        .err()
        .unwrap();

    match err {
        Error::Auth(msg) => {
            assert!(msg.contains("Failed"), "got {msg}");
            assert!(msg.contains("Incorrect username or password"), "got {msg}");
        }
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn login_failure_without_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "login": { "result": "NeedToken" } })),
        )
        .mount(&server)
        .await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let err = client.login("token", "ReportBot", "pw").await.err().unwrap();

    assert!(err.to_string().contains("No reason provided"), "got {err}");
}

#[tokio::test]
async fn login_response_without_result_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "warnings": {} })))
        .mount(&server)
        .await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let err = client.login("token", "ReportBot", "pw").await.err().unwrap();

    assert!(matches!(err, Error::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn session_cookie_is_sent_after_login() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "wiki_session=s3cr3t; Path=/; HttpOnly")
                .set_body_json(json!({ "login": { "result": "Success" } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("list", "recentchanges"))
        .and(header("cookie", "wiki_session=s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": { "recentchanges": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WikiClient::new(api_url(&server)).unwrap();
    let token = client.fetch_login_token().await.unwrap();
    let session = client.login(&token, "ReportBot", "pw").await.unwrap();

    let now = Utc::now();
    let changes = session
        .fetch_recent_changes(now, now - chrono::Duration::days(7))
        .await
        .unwrap();
    assert!(changes.is_empty());
}

// --- recent changes ---

#[tokio::test]
async fn recent_changes_sends_newer_bound_as_start() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("list", "recentchanges"))
        .and(query_param("rcprop", "title|timestamp|user|comment|ids"))
        .and(query_param("rclimit", "max"))
        .and(query_param("rcdir", "older"))
        .and(query_param("rcstart", "2024-01-13T23:59:59Z"))
        .and(query_param("rcend", "2024-01-07T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": { "recentchanges": [
                change("Main Page", "Alice", "2024-01-12T10:00:00Z", 11)
            ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let newer = Utc.with_ymd_and_hms(2024, 1, 13, 23, 59, 59).unwrap();
    let older = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();

    let changes = session.fetch_recent_changes(newer, older).await.unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].title, "Main Page");
    assert_eq!(changes[0].previous_revision_id, 10);
}

#[tokio::test]
async fn recent_changes_follows_continuation_until_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param_is_missing("rccontinue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "continue": { "rccontinue": "20240110120000|42", "continue": "-||" },
            "query": { "recentchanges": [
                change("A", "Alice", "2024-01-12T10:00:00Z", 50),
                change("B", "Bob", "2024-01-11T10:00:00Z", 49)
            ] }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("rccontinue", "20240110120000|42"))
        .and(query_param("continue", "-||"))
        .and(query_param("list", "recentchanges"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": { "recentchanges": [
                change("C", "Carol", "2024-01-10T12:00:00Z", 42)
            ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let now = Utc::now();
    let changes = session
        .fetch_recent_changes(now, now - chrono::Duration::days(7))
        .await
        .unwrap();

    let titles: Vec<&str> = changes.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn recent_changes_failure_on_later_page_discards_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param_is_missing("rccontinue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "continue": { "rccontinue": "next", "continue": "-||" },
            "query": { "recentchanges": [
                change("A", "Alice", "2024-01-12T10:00:00Z", 50)
            ] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("rccontinue", "next"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let now = Utc::now();
    let result = session
        .fetch_recent_changes(now, now - chrono::Duration::days(7))
        .await;

    assert!(matches!(result, Err(Error::Transport(_))), "got {result:?}");
}

#[tokio::test]
async fn recent_changes_without_list_is_response_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "batchcomplete": "" })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let now = Utc::now();
    let result = session
        .fetch_recent_changes(now, now - chrono::Duration::days(7))
        .await;

    assert!(
        matches!(result, Err(Error::ResponseShape { .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn recent_changes_rejects_stuck_continuation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "continue": { "rccontinue": "same", "continue": "-||" },
            "query": { "recentchanges": [] }
        })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let now = Utc::now();
    let result = session
        .fetch_recent_changes(now, now - chrono::Duration::days(7))
        .await;

    match result {
        Err(Error::ResponseShape { message, .. }) => {
            assert!(message.contains("did not advance"), "got {message}")
        }
        other => panic!("expected ResponseShape error, got {other:?}"),
    }
}

#[tokio::test]
async fn recent_changes_skips_suppressed_log_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": { "recentchanges": [
                change("Main Page", "Alice", "2024-01-12T10:00:00Z", 105),
                {
                    "type": "log",
                    "ns": 0,
                    "actionhidden": "",
                    "user": "Admin",
                    "timestamp": "2024-01-11T08:00:00Z",
                    "comment": ""
                },
                change("Help:FAQ", "Bob", "2024-01-10T16:45:00Z", 101)
            ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let now = Utc::now();
    let changes = session
        .fetch_recent_changes(now, now - chrono::Duration::days(7))
        .await
        .unwrap();

    let titles: Vec<_> = changes.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Main Page", "Help:FAQ"]);
}

#[tokio::test]
async fn recent_changes_with_malformed_entry_is_response_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "recentchanges": [
                { "title": "Main Page", "revid": 5, "timestamp": "yesterday" }
            ] }
        })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let now = Utc::now();
    let result = session
        .fetch_recent_changes(now, now - chrono::Duration::days(7))
        .await;

    assert!(
        matches!(result, Err(Error::ResponseShape { .. })),
        "got {result:?}"
    );
}

#[test]
fn param_value_unquotes_strings() {
    assert_eq!(param_value(&json!("-||")), "-||");
    assert_eq!(param_value(&json!(42)), "42");
}
