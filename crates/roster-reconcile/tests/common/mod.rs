//! Shared helpers for the HTTP lifecycle tests.

#![cfg(feature = "integration")]
#![allow(dead_code)]

use std::sync::Once;

use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roster_directory::{Credentials, DirectoryConfig, HttpDirectoryClient};
use roster_reconcile::GroupMembersResource;

static INIT: Once = Once::new();

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

pub fn members_path(group_id: &str) -> String {
    format!(
        "/admin/directory/v1/groups/{}/members",
        urlencoding::encode(group_id)
    )
}

pub fn member_path(group_id: &str, member_id: &str) -> String {
    format!("{}/{}", members_path(group_id), urlencoding::encode(member_id))
}

/// A listing page holding `emails`, all with `role`.
pub fn page_of(role: &str, emails: &[&str]) -> Value {
    let members: Vec<Value> = emails
        .iter()
        .map(|email| {
            json!({
                "kind": "admin#directory#member",
                "id": format!("id-{email}"),
                "email": email,
                "role": role,
                "type": "USER",
                "status": "ACTIVE"
            })
        })
        .collect();
    json!({ "kind": "admin#directory#members", "members": members })
}

pub fn api_error(code: u16, message: &str, reason: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "errors": [{"message": message, "domain": "global", "reason": reason}]
        }
    })
}

pub async fn mock_listing(server: &MockServer, group_id: &str, role: &str, emails: &[&str]) {
    Mock::given(method("GET"))
        .and(path(members_path(group_id)))
        .and(query_param("roles", role))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(role, emails)))
        .mount(server)
        .await;
}

/// Resource over an HTTP client with a static token and no listing retries.
pub fn create_resource(base_url: &str) -> GroupMembersResource<HttpDirectoryClient> {
    init_test_logging();
    let config = DirectoryConfig::new(Credentials::AccessToken(SecretString::from(
        "test-token".to_string(),
    )))
    .with_api_base_url(base_url)
    .with_retries(0, 0);
    GroupMembersResource::new(HttpDirectoryClient::new(config).unwrap())
}
