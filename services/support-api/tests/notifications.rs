//! Notification delivery against a mock messaging service

use std::time::Duration;

use support_api::{
    config::NotificationConfig,
    models::{TicketPatch, UpdateTicketRequest},
    notifications::{Notifier, drain},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path, query_param},
};

fn config(server: &MockServer) -> NotificationConfig {
    NotificationConfig {
        endpoint: format!("{}/owner", server.uri()),
        staff_endpoint: Some(format!("{}/staff", server.uri())),
        request_timeout_secs: 2,
        ..Default::default()
    }
}

/// Enqueue through a fresh notifier, then wait for the worker to drain
async fn deliver_all(config: &NotificationConfig, send: impl FnOnce(&Notifier)) {
    let (notifier, worker) = Notifier::channel(config).unwrap();
    let handle = worker.spawn();

    send(&notifier);
    drop(notifier);

    drain(handle, Duration::from_secs(5)).await;
}

#[tokio::test]
async fn test_owner_notification_is_form_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/owner"))
        .and(body_string_contains("accepter_id=1001"))
        .and(body_string_contains("super_connect_token=super_secret_key_2024"))
        .and(body_string_contains("sender_id=5259653323"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let patch = TicketPatch::from(UpdateTicketRequest {
        status: Some("закрыт".into()),
        category: None,
    });
    let config = NotificationConfig {
        staff_endpoint: None,
        ..config(&server)
    };
    deliver_all(&config, |notifier| notifier.ticket_updated(9, 1001, &patch)).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0].headers.get("content-type").unwrap();
    assert_eq!(content_type, "application/x-www-form-urlencoded");
}

#[tokio::test]
async fn test_staff_notification_uses_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/owner"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/staff"))
        .and(query_param("accepter_id", "5259653319"))
        .and(query_param("sender_id", "5259653323"))
        .and(query_param("message", "По вашему тикету 3 пришло новое сообщение"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    deliver_all(&config(&server), |notifier| {
        notifier.message_added(3, 42, ": спасибо")
    })
    .await;

    let requests = server.received_requests().await.unwrap();
    let staff = requests
        .iter()
        .find(|r| r.url.path() == "/staff")
        .unwrap();
    assert!(staff.body.is_empty());
}

#[tokio::test]
async fn test_failed_delivery_does_not_stop_worker() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/owner"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/staff"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    deliver_all(&config(&server), |notifier| {
        notifier.message_added(1, 10, "first");
        notifier.message_added(2, 20, "second");
    })
    .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
    assert_eq!(
        requests.iter().filter(|r| r.url.path() == "/staff").count(),
        2
    );
}

#[tokio::test]
async fn test_unreachable_service_is_tolerated() {
    let config = NotificationConfig {
        endpoint: "http://127.0.0.1:9/owner".into(),
        staff_endpoint: None,
        request_timeout_secs: 1,
        ..Default::default()
    };

    let (notifier, worker) = Notifier::channel(&config).unwrap();
    let handle = worker.spawn();
    notifier.message_added(1, 1, "lost");
    drop(notifier);

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker exits after the queue is drained")
        .unwrap();
}
