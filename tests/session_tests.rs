//! Session lifecycle tests
//!
//! Exercises the login handshake and the expired-session retry protocol
//! against a scripted transport.

use serde_json::json;
use std::sync::Arc;
use wialon_gateway::mock::MockTransport;
use wialon_gateway::{SessionClient, WialonError};

fn client_with(transport: Arc<MockTransport>) -> SessionClient {
    SessionClient::new("test-token", transport)
}

#[tokio::test]
async fn login_stores_session_id_from_eid() {
    let transport = Arc::new(
        MockTransport::new().with_response("token/login", json!({"eid": "session-1"})),
    );
    let client = client_with(transport.clone());

    assert!(!client.has_session().await);
    assert!(client.login().await.unwrap());
    assert!(client.has_session().await);

    let calls = transport.calls_to("token/login");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].params, json!({"token": "test-token"}));
    assert_eq!(calls[0].sid, None);
}

#[tokio::test]
async fn login_without_eid_reports_failure() {
    let transport = Arc::new(
        MockTransport::new().with_response("token/login", json!({"error": 8})),
    );
    let client = client_with(transport);

    assert!(!client.login().await.unwrap());
    assert!(!client.has_session().await);
}

#[tokio::test]
async fn ensure_session_is_a_noop_when_session_is_held() {
    let transport = Arc::new(
        MockTransport::new().with_response("token/login", json!({"eid": "session-1"})),
    );
    let client = client_with(transport.clone());

    assert!(client.ensure_session().await.unwrap());
    assert!(client.ensure_session().await.unwrap());
    // a second ensure must not log in again
    assert_eq!(transport.calls_to("token/login").len(), 1);
}

#[tokio::test]
async fn authenticated_call_attaches_session_id() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response("token/login", json!({"eid": "session-1"}))
            .with_response("core/search_item", json!({"item": {"id": 1}})),
    );
    let client = client_with(transport.clone());

    let result = client
        .authenticated_call("core/search_item", &json!({"id": 1, "flags": 1}))
        .await
        .unwrap();
    assert_eq!(result, json!({"item": {"id": 1}}));

    let calls = transport.calls_to("core/search_item");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].sid.as_deref(), Some("session-1"));
}

#[tokio::test]
async fn expired_session_is_retried_exactly_once() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response("token/login", json!({"eid": "session-1"}))
            .with_response("token/login", json!({"eid": "session-2"}))
            .with_response("core/search_items", json!({"error": 1}))
            .with_response("core/search_items", json!({"items": [{"id": 42, "nm": "Unit"}]})),
    );
    let client = client_with(transport.clone());

    // establish the session up front so the retry accounting is unambiguous
    assert!(client.login().await.unwrap());

    let result = client
        .authenticated_call("core/search_items", &json!({"flags": 1}))
        .await
        .unwrap();
    assert_eq!(result["items"][0]["id"], 42);

    // exactly two service calls; exactly one re-login beyond the initial one
    let service_calls = transport.calls_to("core/search_items");
    assert_eq!(service_calls.len(), 2);
    assert_eq!(transport.calls_to("token/login").len(), 2);

    // the re-issued call carries the fresh session id
    assert_eq!(service_calls[0].sid.as_deref(), Some("session-1"));
    assert_eq!(service_calls[1].sid.as_deref(), Some("session-2"));
}

#[tokio::test]
async fn persistent_session_expiry_exhausts_the_retry() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response("token/login", json!({"eid": "session-1"}))
            .with_response("token/login", json!({"eid": "session-2"}))
            .with_response("core/search_items", json!({"error": 1}))
            .with_response("core/search_items", json!({"error": 1})),
    );
    let client = client_with(transport.clone());

    let err = client
        .authenticated_call("core/search_items", &json!({"flags": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, WialonError::AuthRetryExhausted));

    // no retry storm: two service calls and no further attempts
    assert_eq!(transport.calls_to("core/search_items").len(), 2);
}

#[tokio::test]
async fn failed_relogin_exhausts_the_retry() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response("token/login", json!({"eid": "session-1"}))
            .with_response("token/login", json!({"error": 8}))
            .with_response("core/search_items", json!({"error": 1})),
    );
    let client = client_with(transport.clone());

    let err = client
        .authenticated_call("core/search_items", &json!({"flags": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, WialonError::AuthRetryExhausted));
    assert_eq!(transport.calls_to("core/search_items").len(), 1);
}

#[tokio::test]
async fn other_vendor_errors_are_tagged_not_retried() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response("token/login", json!({"eid": "session-1"}))
            .with_response(
                "core/search_items",
                json!({"error": 7, "reason": "Access denied"}),
            ),
    );
    let client = client_with(transport.clone());

    let err = client
        .authenticated_call("core/search_items", &json!({"flags": 1}))
        .await
        .unwrap_err();
    match err {
        WialonError::Vendor { code, reason } => {
            assert_eq!(code, 7);
            assert_eq!(reason, "Access denied");
        }
        other => panic!("expected vendor error, got {other:?}"),
    }

    // no re-login for non-session errors
    assert_eq!(transport.calls_to("token/login").len(), 1);
    assert_eq!(transport.calls_to("core/search_items").len(), 1);
}

#[tokio::test]
async fn transport_failures_propagate_distinctly() {
    // nothing scripted: the mock reports a transport failure
    let transport = Arc::new(MockTransport::new());
    let client = client_with(transport);

    let err = client
        .authenticated_call("core/search_items", &json!({"flags": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, WialonError::Transport(_)));
}
