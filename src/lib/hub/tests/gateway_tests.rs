use std::sync::Mutex;

use crate::hub::session::MemorySession;

use super::*;

const BASE: &str = "http://backend.test/api/v1";

/// Records every call and answers through a handler that sees how many
/// calls were made before it.
struct ScriptedTransport<F> {
    calls: Mutex<Vec<(String, Option<String>)>>,
    handler: F,
}

impl<F> ScriptedTransport<F>
where
    F: Fn(&ApiRequest, Option<&str>) -> ApiResponse,
{
    fn new(handler: F) -> Self {
        ScriptedTransport {
            calls: Mutex::new(Vec::new()),
            handler,
        }
    }

    fn calls_to(&self, url: &str) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == url)
            .map(|(_, bearer)| bearer.clone())
            .collect()
    }
}

impl<F> Transport for ScriptedTransport<F>
where
    F: Fn(&ApiRequest, Option<&str>) -> ApiResponse,
{
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.url.clone(), bearer.map(str::to_owned)));
        Ok((self.handler)(request, bearer))
    }
}

fn respond(status: u16, body: &str) -> ApiResponse {
    ApiResponse {
        status: StatusCode::from_u16(status).unwrap(),
        content_type: Some("application/json".to_string()),
        body: body.as_bytes().to_vec(),
    }
}

fn target() -> String {
    format!("{}/user/me", BASE)
}

fn refresh_url() -> String {
    format!("{}/auth/refresh-token", BASE)
}

#[tokio::test]
async fn auth_fetch_attaches_stored_token() {
    let transport = ScriptedTransport::new(|_, _| respond(200, "{}"));
    let session = MemorySession::with_tokens(Some("access-1"), Some("refresh-1"));
    let gateway = Gateway::new(transport, session, BASE);

    let response = gateway.auth_fetch(&ApiRequest::get(target())).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        gateway.transport().calls_to(&target()),
        vec![Some("access-1".to_string())]
    );
}

#[tokio::test]
async fn auth_fetch_refreshes_once_and_retries_with_new_token() {
    let transport = ScriptedTransport::new(|request, bearer| {
        if request.url.ends_with("/auth/refresh-token") {
            respond(200, r#"{"accessToken":"access-2"}"#)
        } else if bearer == Some("access-2") {
            respond(200, r#"{"id":1}"#)
        } else {
            respond(401, "")
        }
    });
    let session = MemorySession::with_tokens(Some("access-1"), Some("refresh-1"));
    let gateway = Gateway::new(transport, session, BASE);

    let response = gateway.auth_fetch(&ApiRequest::get(target())).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        gateway.transport().calls_to(&target()),
        vec![Some("access-1".to_string()), Some("access-2".to_string())]
    );
    assert_eq!(gateway.transport().calls_to(&refresh_url()).len(), 1);
    assert_eq!(
        gateway.session().get(ACCESS_TOKEN_KEY).as_deref(),
        Some("access-2")
    );
    // no new refresh token in the answer, the old one stays
    assert_eq!(
        gateway.session().get(REFRESH_TOKEN_KEY).as_deref(),
        Some("refresh-1")
    );
}

#[tokio::test]
async fn auth_fetch_makes_at_most_two_attempts() {
    let transport = ScriptedTransport::new(|request, _| {
        if request.url.ends_with("/auth/refresh-token") {
            respond(200, r#"{"token":"access-2","refreshToken":"refresh-2"}"#)
        } else {
            respond(401, r#"{"message":"expired"}"#)
        }
    });
    let session = MemorySession::with_tokens(Some("access-1"), Some("refresh-1"));
    let gateway = Gateway::new(transport, session, BASE);

    let response = gateway.auth_fetch(&ApiRequest::get(target())).await.unwrap();

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(gateway.transport().calls_to(&target()).len(), 2);
    assert_eq!(gateway.transport().calls_to(&refresh_url()).len(), 1);
    assert_eq!(
        gateway.session().get(REFRESH_TOKEN_KEY).as_deref(),
        Some("refresh-2")
    );
}

#[tokio::test]
async fn auth_fetch_without_refresh_token_returns_original_401() {
    let transport = ScriptedTransport::new(|_, _| respond(401, r#"{"error":"no session"}"#));
    let session = MemorySession::with_tokens(Some("access-1"), None);
    let gateway = Gateway::new(transport, session, BASE);

    let response = gateway.auth_fetch(&ApiRequest::get(target())).await.unwrap();

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.text(), r#"{"error":"no session"}"#);
    assert_eq!(gateway.transport().calls_to(&target()).len(), 1);
    assert!(gateway.transport().calls_to(&refresh_url()).is_empty());
}

#[tokio::test]
async fn rejected_refresh_clears_both_tokens() {
    let transport = ScriptedTransport::new(|_, _| respond(401, ""));
    let session = MemorySession::with_tokens(Some("access-1"), Some("refresh-1"));
    let gateway = Gateway::new(transport, session, BASE);

    let response = gateway.auth_fetch(&ApiRequest::get(target())).await.unwrap();

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(gateway.transport().calls_to(&target()).len(), 1);
    assert_eq!(gateway.session().get(ACCESS_TOKEN_KEY), None);
    assert_eq!(gateway.session().get(REFRESH_TOKEN_KEY), None);
}

#[tokio::test]
async fn fetch_never_sends_a_token() {
    let transport = ScriptedTransport::new(|_, _| respond(200, "[]"));
    let session = MemorySession::with_tokens(Some("access-1"), Some("refresh-1"));
    let gateway = Gateway::new(transport, session, format!("{}/", BASE));

    gateway
        .fetch(&ApiRequest::get(gateway.url("/schedule")))
        .await
        .unwrap();

    assert_eq!(
        gateway.transport().calls_to(&format!("{}/schedule", BASE)),
        vec![None]
    );
}
