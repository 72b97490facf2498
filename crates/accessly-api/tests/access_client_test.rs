// Integration tests for `AccessClient` using wiremock.
#![allow(clippy::unwrap_used)]

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use accessly_api::{AccessClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AccessClient) {
    let server = MockServer::start().await;
    let client = AccessClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn door_json(id: &Uuid, name: &str, relay: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("Site - {name}"),
        "floor_id": "floor-1",
        "type": "door",
        "is_bind_hub": true,
        "door_lock_relay_status": relay,
        "door_position_status": "close",
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_doors() {
    let (server, client) = setup().await;

    let door_a = Uuid::new_v4();
    let door_b = Uuid::new_v4();

    let body = json!({
        "code": "SUCCESS",
        "msg": "success",
        "data": [
            door_json(&door_a, "Front Door", "lock"),
            door_json(&door_b, "Side Entrance", "unlock"),
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/developer/doors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let doors = client.list_doors().await.unwrap();

    assert_eq!(doors.len(), 2);
    assert_eq!(doors[0].id, door_a.to_string());
    assert_eq!(doors[0].name, "Front Door");
    assert_eq!(doors[0].door_lock_relay_status, "lock");
    assert!(doors[0].is_bind_hub);
    assert_eq!(doors[1].name, "Side Entrance");
    assert_eq!(doors[1].door_lock_relay_status, "unlock");
}

#[tokio::test]
async fn test_get_door() {
    let (server, client) = setup().await;

    let door_id = Uuid::new_v4();
    let body = json!({
        "code": "SUCCESS",
        "msg": "success",
        "data": door_json(&door_id, "Front Door", "lock"),
    });

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/developer/doors/{door_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let door = client.get_door(&door_id.to_string()).await.unwrap();

    assert_eq!(door.id, door_id.to_string());
    assert_eq!(door.name, "Front Door");
    assert_eq!(door.full_name.as_deref(), Some("Site - Front Door"));
    assert_eq!(door.door_position_status.as_deref(), Some("close"));
}

#[tokio::test]
async fn test_remote_unlock() {
    let (server, client) = setup().await;

    let door_id = Uuid::new_v4();

    Mock::given(method("PUT"))
        .and(path(format!(
            "/api/v1/developer/doors/{door_id}/remote_unlock"
        )))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": "SUCCESS", "msg": "success", "data": null })),
        )
        .mount(&server)
        .await;

    client
        .remote_unlock(&door_id.to_string(), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remote_unlock_with_passcode() {
    let (server, client) = setup().await;

    let door_id = Uuid::new_v4();

    Mock::given(method("PUT"))
        .and(path(format!(
            "/api/v1/developer/doors/{door_id}/remote_unlock"
        )))
        .and(body_json(json!({ "passcode": "123456" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": "SUCCESS", "msg": "success" })),
        )
        .mount(&server)
        .await;

    client
        .remote_unlock(&door_id.to_string(), Some("123456"))
        .await
        .unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_envelope_failure_under_http_200() {
    let (server, client) = setup().await;

    // The Access API reports some failures with HTTP 200 and a
    // non-success envelope code.
    Mock::given(method("GET"))
        .and(path("/api/v1/developer/doors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "CODE_SYSTEM_ERROR",
            "msg": "internal error",
            "data": null
        })))
        .mount(&server)
        .await;

    let result = client.list_doors().await;

    match result {
        Err(Error::Access {
            ref message,
            ref code,
            status,
        }) => {
            assert_eq!(status, 200);
            assert_eq!(message, "internal error");
            assert_eq!(code.as_deref(), Some("CODE_SYSTEM_ERROR"));
        }
        other => panic!("expected Access envelope error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_401_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_doors().await;

    assert!(
        matches!(result, Err(Error::InvalidToken)),
        "expected InvalidToken, got: {result:?}"
    );
}

#[tokio::test]
async fn test_error_404_not_found() {
    let (server, client) = setup().await;

    let door_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/developer/doors/{door_id}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "CODE_RESOURCE_NOT_FOUND",
            "msg": "door not found"
        })))
        .mount(&server)
        .await;

    let err = client.get_door(&door_id.to_string()).await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::Access {
            status, message, ..
        } => {
            assert_eq!(status, 404);
            assert_eq!(message, "door not found");
        }
        other => panic!("expected Access 404 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_500_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.list_doors().await;

    match result {
        Err(Error::Access {
            status, ref code, ..
        }) => {
            assert_eq!(status, 500);
            assert!(code.is_none());
        }
        other => panic!("expected Access 500 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/developer/doors"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.list_doors().await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
