#![allow(dead_code)]

use std::sync::Arc;

use client::models::{Role, Session, User};
use client::{ApiClient, ClientConfig, MemoryTokenStore};
use mockito::ServerGuard;
use serde_json::{Value, json};
use uuid::Uuid;

pub fn user_json(id: Uuid) -> Value {
    json!({
        "id": id,
        "email": "amina@example.com",
        "firstName": "Amina",
        "lastName": "Test",
        "phone": null,
        "avatar": null,
        "role": "CUSTOMER",
        "isVerified": true,
        "isActive": true,
        "language": "en",
        "hasPassword": true,
        "oauthProvider": null,
        "lastLoginAt": null,
        "createdAt": "2025-01-01T00:00:00Z"
    })
}

pub fn session(token: &str) -> Session {
    Session {
        token: token.to_string(),
        user: User {
            id: Uuid::new_v4(),
            email: "amina@example.com".into(),
            first_name: "Amina".into(),
            last_name: "Test".into(),
            phone: None,
            avatar: None,
            role: Role::Customer,
            is_verified: true,
            is_active: true,
            language: Some("en".into()),
            provider_profile: None,
        },
    }
}

pub fn ok(data: Value) -> String {
    json!({ "success": true, "data": data }).to_string()
}

pub fn failure(message: &str) -> String {
    json!({ "success": false, "message": message }).to_string()
}

pub fn session_body(token: &str) -> String {
    ok(json!({ "token": token, "user": user_json(Uuid::new_v4()) }))
}

/// Client against the mock server, optionally signed in with `token`
pub fn client_for(server: &ServerGuard, token: Option<&str>) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(match token {
        Some(token) => MemoryTokenStore::with_session(session(token)),
        None => MemoryTokenStore::new(),
    });
    let config = ClientConfig::new(&format!("{}/api", server.url())).unwrap();
    let client = ApiClient::new(config, store.clone()).unwrap();
    (client, store)
}

pub fn booking_json(id: Uuid) -> Value {
    json!({
        "id": id,
        "customerId": Uuid::new_v4(),
        "providerId": Uuid::new_v4(),
        "serviceId": Uuid::new_v4(),
        "scheduledDate": "2030-05-01",
        "scheduledTime": "10:30:00",
        "durationMinutes": 60,
        "address": null,
        "notes": null,
        "totalPrice": 150.0,
        "status": "PENDING",
        "providerNotes": null,
        "cancellationReason": null,
        "cancelledBy": null,
        "cancelledAt": null,
        "completedAt": null,
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z",
        "service": null,
        "customer": null,
        "provider": null
    })
}
