use std::sync::Arc;

use dovelink_client::{
    models::{NotificationType, ReadFilter},
    services::{
        api::{HistoryApi, NotificationApi},
        auth::{CredentialProvider, StaticCredentials, TokenStore},
    },
    ApiClient, AppState, ClientError, Config, SyncError,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, credentials: Arc<dyn CredentialProvider>) -> ApiClient {
    let config = Config::with_base_url(format!("{}/api", server.uri()));
    ApiClient::new(&config, credentials).unwrap()
}

fn notification_json(id: i64, is_read: bool) -> serde_json::Value {
    json!({
        "id": id,
        "notification_type": "admin_reply",
        "title": "管理员回复",
        "message": "已安排后勤处理",
        "is_read": is_read,
        "issue": 42,
        "sender_name": "后勤处",
        "created": "2024-05-01T08:00:00Z"
    })
}

#[tokio::test]
async fn test_unread_count_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/unread-count/"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unread_count": 4})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(StaticCredentials::new("access-1")));
    assert_eq!(api.unread_count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_list_notifications_with_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/"))
        .and(query_param("is_read", "false"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([notification_json(1, false)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(StaticCredentials::new("t")));
    let items = api
        .list_notifications(ReadFilter::Unread.is_read())
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].notification_type, NotificationType::AdminReply);
    assert_eq!(items[0].display_sender(), Some("后勤处"));
}

#[tokio::test]
async fn test_list_notifications_accepts_paginated_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [notification_json(1, false), notification_json(2, true)]
        })))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(StaticCredentials::new("t")));
    let items = api.list_notifications(None).await.unwrap();
    assert_eq!(items.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn test_unexpected_payload_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "ok"})))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(StaticCredentials::new("t")));
    let result = api.list_history().await;
    assert!(matches!(result, Err(ClientError::Serialization(_))));
}

#[tokio::test]
async fn test_mutating_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/mark-read/"))
        .and(body_json(json!({"ids": [1, 3]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"marked": 2})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/mark-all-read/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/history/record/"))
        .and(body_json(json!({"issue": 42})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/history/clear/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(StaticCredentials::new("t")));
    api.mark_read(vec![1, 3]).await.unwrap();
    api.mark_all_read().await.unwrap();
    api.record_view(42).await.unwrap();
    api.clear_history().await.unwrap();
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/mark-all-read/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(StaticCredentials::new("t")));
    match api.mark_all_read().await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/unread-count/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_json(json!({"refresh": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/unread-count/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unread_count": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(TokenStore::in_memory());
    store.store_login("stale", "refresh-1").unwrap();
    let api = client(&server, store.clone());

    assert_eq!(api.unread_count().await.unwrap(), 2);
    assert_eq!(store.access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_failed_refresh_clears_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(TokenStore::in_memory());
    store.store_login("stale", "expired-refresh").unwrap();
    let api = client(&server, store.clone());

    let result = api.list_history().await;
    assert!(matches!(result, Err(ClientError::Authentication(_))));
    assert!(!store.has_credentials());
    assert_eq!(store.refresh_token(), None);
}

#[tokio::test]
async fn test_unauthorized_without_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(StaticCredentials::new("t")));
    let result = api.list_history().await;
    assert!(matches!(
        result,
        Err(ClientError::Status { status, .. }) if status.as_u16() == 401
    ));
}

#[tokio::test]
async fn test_stores_sync_against_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            notification_json(1, false),
            notification_json(2, false),
            notification_json(3, false)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/mark-read/"))
        .and(body_json(json!({"ids": [1, 3]})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/unread-count/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unread_count": 1})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/history/record/"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/history/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 9,
            "issue": 42,
            "issue_title": "图书馆空调故障",
            "issue_topic": "学习",
            "issue_status": "已提交，等待审核",
            "viewed_at": "2024-05-01T08:00:00Z"
        }])))
        .mount(&server)
        .await;

    let config = Config::with_base_url(format!("{}/api/", server.uri()));
    let state = AppState::new(config, Arc::new(StaticCredentials::new("t"))).unwrap();

    state.notifications.fetch_notifications(None).await;
    state.notifications.mark_as_read(&[1, 3]).await;
    let notifications = state.notifications.snapshot();
    assert_eq!(
        notifications
            .notifications
            .iter()
            .map(|n| (n.id, n.is_read))
            .collect::<Vec<_>>(),
        vec![(1, true), (2, false), (3, true)]
    );
    assert_eq!(notifications.unread_count, 1);
    assert_eq!(notifications.error, None);

    state.history.record_view(42).await;
    let history = state.history.snapshot();
    assert_eq!(history.history.len(), 1);
    assert_eq!(history.history[0].id, 9);
    assert_eq!(history.history[0].status_text(), "待审核");
    assert_eq!(history.history[0].status_class(), "status-pending");
}

#[tokio::test]
async fn test_store_surfaces_generic_error_on_outage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/unread-count/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = Config::with_base_url(format!("{}/api/", server.uri()));
    let state = AppState::new(config, Arc::new(StaticCredentials::new("t"))).unwrap();

    state.notifications.fetch_unread_count().await;

    let snapshot = state.notifications.snapshot();
    assert_eq!(snapshot.unread_count, 0);
    assert_eq!(snapshot.error, Some(SyncError::failure("获取未读通知数量失败")));
}
