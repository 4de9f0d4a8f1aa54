//! Endpoint wrappers against a mock server

mod common;

use client::models::{BookingStatus, NewMessage, OAuthRequest, PageParams, ServiceQuery};
use client::{ClientError, OAUTH_SECRET_HEADER, TokenStore};
use common::*;
use mockito::Matcher;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_login_stores_session() {
    let mut server = mockito::Server::new_async().await;
    let login = server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(json!({
            "email": "amina@example.com",
            "password": "correct horse"
        })))
        .with_status(200)
        .with_body(session_body("fresh"))
        .create_async()
        .await;

    let (client, store) = client_for(&server, None);
    let session = client.login("amina@example.com", "correct horse").await.unwrap();

    login.assert_async().await;
    assert_eq!(session.token, "fresh");
    assert_eq!(store.token().as_deref(), Some("fresh"));
    assert_eq!(store.user().unwrap().first_name, "Amina");
}

#[tokio::test]
async fn test_oauth_sends_shared_secret() {
    let mut server = mockito::Server::new_async().await;
    let oauth = server
        .mock("POST", "/api/auth/oauth")
        .match_header(OAUTH_SECRET_HEADER, "bridge-secret")
        .match_body(Matcher::PartialJson(json!({
            "provider": "google",
            "providerId": "g-123"
        })))
        .with_status(200)
        .with_body(session_body("oauth-token"))
        .create_async()
        .await;

    let (client, store) = client_for(&server, None);
    let request = OAuthRequest {
        provider: "google".into(),
        provider_id: "g-123".into(),
        email: "amina@example.com".into(),
        first_name: "Amina".into(),
        last_name: "Test".into(),
        avatar: None,
    };
    client.oauth_sign_in(&request, "bridge-secret").await.unwrap();

    oauth.assert_async().await;
    assert_eq!(store.token().as_deref(), Some("oauth-token"));
}

#[tokio::test]
async fn test_logout_clears_even_on_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/auth/logout")
        .with_status(500)
        .create_async()
        .await;

    let (client, store) = client_for(&server, Some("token"));
    client.logout().await.unwrap();
    assert!(store.session().is_none());
}

#[tokio::test]
async fn test_list_services_sends_filters() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/api/services")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("category".into(), "plumbing".into()),
            Matcher::UrlEncoded("sort".into(), "price_asc".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "data": [],
                "pagination": { "page": 1, "limit": 5, "total": 0, "pages": 0 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (client, _) = client_for(&server, None);
    let page = client
        .list_services(&ServiceQuery {
            category: Some("plumbing".into()),
            sort: Some("price_asc".into()),
            page: PageParams {
                page: None,
                limit: Some(5),
            },
            ..ServiceQuery::default()
        })
        .await
        .unwrap();

    list.assert_async().await;
    assert!(page.items.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert_eq!(page.pagination.pages, 0);
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let mut server = mockito::Server::new_async().await;
    let id = Uuid::new_v4();
    let cancel = server
        .mock("PATCH", format!("/api/bookings/{id}/cancel").as_str())
        .match_header("authorization", "Bearer token")
        .match_body(Matcher::Json(json!({ "reason": "Moved out" })))
        .with_status(200)
        .with_body(ok({
            let mut booking = booking_json(id);
            booking["status"] = json!("CANCELLED");
            booking
        }))
        .create_async()
        .await;

    let (client, _) = client_for(&server, Some("token"));
    let booking = client.cancel_booking(id, Some("Moved out")).await.unwrap();

    cancel.assert_async().await;
    assert_eq!(booking.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_validation_errors_are_exposed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/messages")
        .with_status(400)
        .with_body(
            json!({
                "success": false,
                "message": "Validation failed",
                "errors": [{ "field": "content", "message": "Content is required", "value": "" }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (client, _) = client_for(&server, Some("token"));
    let err = client
        .send_message(&NewMessage {
            receiver_id: Uuid::new_v4(),
            content: String::new(),
            booking_id: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(err.field_errors()[0].field, "content");
}

#[tokio::test]
async fn test_non_json_error_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/services/categories")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let (client, _) = client_for(&server, None);
    match client.categories().await.unwrap_err() {
        ClientError::Api { status, message, .. } => {
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_counts() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/notifications/unread-count")
        .with_status(200)
        .with_body(ok(json!({ "count": 4 })))
        .create_async()
        .await;
    server
        .mock("PATCH", "/api/notifications/read-all")
        .with_status(200)
        .with_body(ok(json!({ "updated": 4 })))
        .create_async()
        .await;

    let (client, _) = client_for(&server, Some("token"));
    assert_eq!(client.unread_notification_count().await.unwrap(), 4);
    assert_eq!(client.mark_all_notifications_read().await.unwrap(), 4);
}
