//! End-to-end lifecycle tests over the HTTP directory client.
//!
//! The mock server is stateless, so these tests assert on the requests the
//! reconciliation sends rather than on the state read back afterwards.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{api_error, create_resource, member_path, members_path, mock_listing};
use roster_reconcile::{MembersByRole, MembershipError, Operation, ResourceState, Role};

const GROUP: &str = "eng@example.com";

async fn expect_no_writes(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_update_sends_minimal_writes() {
    let server = MockServer::start().await;
    mock_listing(&server, GROUP, "OWNER", &["alice@example.com"]).await;
    mock_listing(&server, GROUP, "MANAGER", &[]).await;
    mock_listing(
        &server,
        GROUP,
        "MEMBER",
        &["bob@example.com", "carol@example.com"],
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path(member_path(GROUP, "carol@example.com")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(members_path(GROUP)))
        .and(body_json(json!({"email": "dave@example.com", "role": "MEMBER"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "dave@example.com",
            "role": "MEMBER",
            "type": "USER",
            "status": "ACTIVE"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resource = create_resource(&server.uri());
    let mut desired = MembersByRole::default();
    desired.insert(Role::Owner, "alice@example.com");
    desired.insert(Role::Member, "bob@example.com");
    desired.insert(Role::Member, "dave@example.com");

    let state = resource.update(GROUP, &desired).await.unwrap();

    assert_eq!(state.id.as_deref(), Some(GROUP));
    assert_eq!(state.members.get(Role::Owner).len(), 1);
}

#[tokio::test]
async fn test_listing_failure_aborts_before_writes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(members_path(GROUP)))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(api_error(403, "Not Authorized", "forbidden")),
        )
        .expect(1)
        .mount(&server)
        .await;
    expect_no_writes(&server).await;

    let resource = create_resource(&server.uri());
    let mut desired = MembersByRole::default();
    desired.insert(Role::Member, "bob@example.com");

    let err = resource.create(GROUP, &desired).await.unwrap_err();

    assert_eq!(err.operation(), Some(Operation::List));
    assert!(err.to_string().contains(GROUP));
}

#[tokio::test]
async fn test_duplicate_insert_names_member_and_role() {
    let server = MockServer::start().await;
    mock_listing(&server, GROUP, "OWNER", &[]).await;
    Mock::given(method("POST"))
        .and(path(members_path(GROUP)))
        .respond_with(ResponseTemplate::new(409).set_body_json(api_error(
            409,
            "Member already exists.",
            "duplicate",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let resource = create_resource(&server.uri());
    let mut desired = MembersByRole::default();
    desired.insert(Role::Owner, "bob@example.com");

    let err = resource.update(GROUP, &desired).await.unwrap_err();

    match &err {
        MembershipError::Step { source, .. } => assert!(source.is_duplicate()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.member_id(), Some("bob@example.com"));
    assert!(err.to_string().contains("OWNER"));
}

#[tokio::test]
async fn test_delete_collects_failures_and_skips_missing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(member_path(GROUP, "alice@example.com")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(member_path(GROUP, "bob@example.com")))
        .respond_with(ResponseTemplate::new(404).set_body_json(api_error(
            404,
            "Resource Not Found: memberKey",
            "notFound",
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(member_path(GROUP, "carol@example.com")))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(api_error(403, "Not Authorized", "forbidden")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resource = create_resource(&server.uri());
    let mut members = MembersByRole::default();
    members.insert(Role::Owner, "alice@example.com");
    members.insert(Role::Manager, "bob@example.com");
    members.insert(Role::Member, "carol@example.com");
    let mut state = ResourceState {
        id: Some(GROUP.to_string()),
        group: GROUP.to_string(),
        members,
    };

    let err = resource.delete(&mut state).await.unwrap_err();

    match err {
        MembershipError::DeleteIncomplete { failures, .. } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].member_id(), Some("carol@example.com"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(state.id.is_none());
    assert_eq!(state.members.len(), 1);
}

#[tokio::test]
async fn test_plan_reads_only() {
    let server = MockServer::start().await;
    mock_listing(&server, GROUP, "OWNER", &["alice@example.com"]).await;
    mock_listing(&server, GROUP, "MANAGER", &[]).await;
    mock_listing(&server, GROUP, "MEMBER", &["bob@example.com"]).await;
    expect_no_writes(&server).await;

    let resource = create_resource(&server.uri());
    let mut desired = MembersByRole::default();
    desired.insert(Role::Owner, "alice@example.com");

    let plan = resource.plan(GROUP, &desired).await.unwrap();

    assert_eq!(plan.change_count(), 1);
    assert!(plan
        .diff(Role::Member)
        .unwrap()
        .to_remove
        .contains("bob@example.com"));
}

#[tokio::test]
async fn test_mixed_case_ids_converge_without_writes() {
    let server = MockServer::start().await;
    mock_listing(&server, GROUP, "OWNER", &["Alice@Example.com"]).await;
    mock_listing(&server, GROUP, "MANAGER", &[]).await;
    mock_listing(&server, GROUP, "MEMBER", &["Bob@Example.COM"]).await;
    expect_no_writes(&server).await;

    let resource = create_resource(&server.uri());
    let mut desired = MembersByRole::default();
    desired.insert(Role::Owner, "Alice@Example.com");
    desired.insert(Role::Member, "Bob@Example.COM");

    let state = resource.update(GROUP, &desired).await.unwrap();

    assert_eq!(state.members, desired);
    assert!(!resource.plan(GROUP, &desired).await.unwrap().has_changes());
}
