//! Telegram sink and notifier against a mock HTTP server

mod common;

use common::RecordingSleeper;
use cross_scanner::notify::{NotificationSink, Notifier, NotifyError, TelegramConfig, TelegramSink};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/bot123:abc/sendMessage";

fn sink(server: &MockServer) -> TelegramSink {
    TelegramSink::new(TelegramConfig {
        base_url: server.uri(),
        bot_token: "123:abc".to_string(),
        chat_id: "42".to_string(),
        timeout: Duration::from_secs(2),
        disable_notification: true,
    })
    .unwrap()
}

fn ok_body() -> Value {
    json!({"ok": true, "result": {"message_id": 1}})
}

#[tokio::test]
async fn test_deliver_posts_markdown_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({
            "chat_id": "42",
            "text": "*hello*",
            "parse_mode": "Markdown",
            "disable_notification": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    tokio_test::assert_ok!(sink(&server).deliver("*hello*").await);
}

#[tokio::test]
async fn test_error_status_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = sink(&server).deliver("x").await;
    assert!(matches!(result, Err(NotifyError::Status(502))));
}

#[tokio::test]
async fn test_ok_false_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": false, "description": "chat not found"})),
        )
        .mount(&server)
        .await;

    match sink(&server).deliver("x").await {
        Err(NotifyError::Rejected(reason)) => assert_eq!(reason, "chat not found"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_notifier_recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let notifier = Notifier::new(
        Arc::new(sink(&server)),
        sleeper.clone(),
        3,
        Duration::from_secs(5),
    );

    assert!(notifier.send("alert").await);
    assert_eq!(sleeper.recorded(), vec![Duration::from_secs(5)]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_notifier_drops_after_attempt_cap() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let notifier = Notifier::new(
        Arc::new(sink(&server)),
        sleeper.clone(),
        3,
        Duration::from_secs(5),
    );

    assert!(!notifier.send("alert").await);
    assert_eq!(sleeper.recorded().len(), 2);
}
