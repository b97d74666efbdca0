//! Common test utilities for roster-directory integration tests.

#![cfg(feature = "integration")]
#![allow(dead_code)]

use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Once;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roster_directory::{Credentials, DirectoryConfig, HttpDirectoryClient};

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// Test data factory for a member record.
pub fn create_member(email: &str, role: &str) -> Value {
    json!({
        "kind": "admin#directory#member",
        "etag": "\"etag\"",
        "id": format!("id-{}", email),
        "email": email,
        "role": role,
        "type": "USER",
        "status": "ACTIVE"
    })
}

/// Wraps member records in a listing page.
pub fn create_members_page(members: Vec<Value>, next_page_token: Option<&str>) -> Value {
    let mut page = json!({
        "kind": "admin#directory#members",
        "etag": "\"etag\"",
        "members": members
    });
    if let Some(token) = next_page_token {
        page["nextPageToken"] = json!(token);
    }
    page
}

/// Creates an API error response.
pub fn create_api_error(code: u16, message: &str, reason: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "errors": [{"message": message, "domain": "global", "reason": reason}]
        }
    })
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Path of the member collection of a group, as the server sees it.
pub fn members_path(group_id: &str) -> String {
    format!(
        "/admin/directory/v1/groups/{}/members",
        urlencoding::encode(group_id)
    )
}

/// Path of one member of a group, as the server sees it.
pub fn member_path(group_id: &str, member_id: &str) -> String {
    format!(
        "{}/{}",
        members_path(group_id),
        urlencoding::encode(member_id)
    )
}

/// Builds a client pointed at `base_url` using a static token.
pub fn create_client(base_url: &str) -> HttpDirectoryClient {
    init_test_logging();
    let config = DirectoryConfig::new(Credentials::AccessToken(SecretString::from(
        "test-token".to_string(),
    )))
    .with_api_base_url(base_url)
    .with_retries(2, 10);
    HttpDirectoryClient::new(config).unwrap()
}

/// Mock server wrapper with common setup helpers.
pub struct MockDirectoryServer {
    pub server: MockServer,
}

impl MockDirectoryServer {
    /// Creates a new mock directory server.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Returns the mock server's base URL.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Sets up the first listing page of a role.
    pub async fn mock_list_members(&self, group_id: &str, role: &str, page: Value) {
        Mock::given(method("GET"))
            .and(path(members_path(group_id)))
            .and(query_param("roles", role))
            .respond_with(ResponseTemplate::new(200).set_body_json(page))
            .mount(&self.server)
            .await;
    }

    /// Sets up a follow-up listing page selected by `pageToken`.
    pub async fn mock_list_members_page(
        &self,
        group_id: &str,
        role: &str,
        page_token: &str,
        page: Value,
    ) {
        Mock::given(method("GET"))
            .and(path(members_path(group_id)))
            .and(query_param("roles", role))
            .and(query_param("pageToken", page_token))
            .respond_with(ResponseTemplate::new(200).set_body_json(page))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Sets up a member insert that echoes the created member.
    pub async fn mock_insert_member(&self, group_id: &str, created: Value) {
        Mock::given(method("POST"))
            .and(path(members_path(group_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(created))
            .mount(&self.server)
            .await;
    }

    /// Sets up a member delete.
    pub async fn mock_delete_member(&self, group_id: &str, member_id: &str) {
        Mock::given(method("DELETE"))
            .and(path(member_path(group_id, member_id)))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    /// Sets up an error response for any request to `request_path`.
    pub async fn mock_error(&self, http_method: &str, request_path: &str, status: u16, body: Value) {
        Mock::given(method(http_method))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Sets up the token endpoint.
    pub async fn mock_token_endpoint(&self, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_token_response(access_token, 3600)),
            )
            .mount(&self.server)
            .await;
    }
}
