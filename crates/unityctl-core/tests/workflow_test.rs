#![allow(clippy::unwrap_used)]
// Integration tests for resource access and LUN workflows against a mock array.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unityctl_api::{Session, TlsMode, TransportConfig};
use unityctl_core::{
    CoreError, CreateLunRequest, Deleted, HostAccessEntry, LunCreated, Resource, ResourceKind,
    ResourceQuery, ResourceView, VerificationError, WorkflowError, WorkflowStep, array_status,
    create_lun, delete_lun, fetch,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/types/loginSessionInfo"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("EMC-CSRF-TOKEN", "csrf-xyz")
                .set_body_json(json!({"entries": []})),
        )
        .mount(&server)
        .await;

    let transport = TransportConfig::new(TlsMode::System, Duration::from_secs(5));
    let session = Session::connect(
        Url::parse(&server.uri()).unwrap(),
        &transport,
        "admin",
        &SecretString::from("hunter2".to_string()),
    )
    .await
    .unwrap();
    (server, session)
}

fn entries(contents: &[serde_json::Value]) -> serde_json::Value {
    json!({
        "entryCount": contents.len(),
        "entries": contents.iter().map(|c| json!({"content": c})).collect::<Vec<_>>()
    })
}

// ── fetch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_host_list_is_empty_result() {
    let (server, mut session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/types/host/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries(&[])))
        .mount(&server)
        .await;

    let set = fetch(&mut session, &ResourceQuery::for_kind(ResourceKind::Host))
        .await
        .unwrap();
    assert_eq!(set.count(), 0);
}

#[tokio::test]
async fn test_filter_reaches_array_unchanged() {
    let (server, mut session) = setup().await;
    let filter = r#"name lk "ldom-%""#;
    Mock::given(method("GET"))
        .and(path("/api/types/lun/instances"))
        .and(query_param("filter", filter))
        .and(query_param("compact", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries(&[
            json!({"id": "sv_1", "name": "ldom-vol1"}),
            json!({"id": "sv_2", "name": "ldom-vol2"}),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = ResourceQuery::for_kind(ResourceKind::Lun).with_filter(filter);
    let luns: Vec<Resource> = fetch(&mut session, &query).await.unwrap().collect();
    assert_eq!(luns.len(), 2);
    assert!(luns.iter().all(|r| matches!(r, Resource::Lun(_))));
}

#[tokio::test]
async fn test_id_fetch_returns_matching_record() {
    let (server, mut session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/types/pool/instances/pool_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {"id": "pool_1", "name": "Gold", "sizeTotal": 4096}
        })))
        .mount(&server)
        .await;

    let query = ResourceQuery::for_kind(ResourceKind::Pool).with_id("pool_1");
    let found: Vec<Resource> = fetch(&mut session, &query).await.unwrap().collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), "pool_1");
    match &found[0] {
        Resource::Pool(pool) => assert_eq!(pool.size_total().unwrap(), 4096),
        other => panic!("expected Pool, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_id_fetch_not_found_is_empty() {
    let (server, mut session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/types/lun/instances/sv_404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"errorCode": 131149829, "httpStatusCode": 404}
        })))
        .mount(&server)
        .await;

    let query = ResourceQuery::new("lun").with_id("sv_404");
    assert_eq!(fetch(&mut session, &query).await.unwrap().count(), 0);
}

#[tokio::test]
async fn test_name_match_is_exact() {
    let (server, mut session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/types/host/instances"))
        .and(query_param("fields", "id,name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries(&[
            json!({"id": "Host_1", "name": "esx01"}),
            json!({"id": "Host_2", "name": "esx01-old"}),
            json!({"id": "Host_3", "name": "ESX01"}),
        ])))
        .mount(&server)
        .await;

    let query = ResourceQuery::new("host").with_name("esx01");
    let ids: Vec<String> = fetch(&mut session, &query)
        .await
        .unwrap()
        .map(|r| r.id().to_owned())
        .collect();
    assert_eq!(ids, vec!["Host_1"]);
}

#[tokio::test]
async fn test_unknown_type_surfaces_request_error() {
    let (server, mut session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/types/bogus/instances"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = fetch(&mut session, &ResourceQuery::new("bogus"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Api(ref e) if e.is_not_found()));
    assert_eq!(err.status(), Some(404));
}

// ── create_lun ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_lun_submits_payload_and_verifies() {
    let (server, mut session) = setup().await;
    let hosts: Vec<HostAccessEntry> = (2..=11)
        .map(|n| HostAccessEntry::production(format!("Host_{n}")))
        .collect();

    Mock::given(method("POST"))
        .and(path("/api/types/storageResource/action/createLun"))
        .and(header("EMC-CSRF-TOKEN", "csrf-xyz"))
        .and(body_partial_json(json!({
            "name": "ldom-vol1",
            "lunParameters": {
                "pool": {"id": "pool_1"},
                "size": 1_099_511_627_776_u64,
                "isThinEnabled": true,
                "isCompressionEnabled": true
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": {"storageResource": {"id": "sv_16"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/types/lun/instances/sv_16"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {"id": "sv_16", "name": "ldom-vol1", "sizeTotal": 1_099_511_627_776_u64}
        })))
        .mount(&server)
        .await;

    let request =
        CreateLunRequest::new("ldom-vol1", "pool_1", 1_099_511_627_776).with_host_access(hosts);
    let created = create_lun(&mut session, &request).await.unwrap();

    assert_eq!(created.id(), "sv_16");
    let lun = created.lun().unwrap();
    assert_eq!(lun.name().unwrap(), "ldom-vol1");
    assert_eq!(lun.size_total().unwrap(), 1_099_511_627_776);
    assert!(created.verification_error().is_none());

    // The submitted body carried all ten hosts.
    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&post.body).unwrap();
    assert_eq!(body["lunParameters"]["hostAccess"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_create_lun_rejected_is_submission_error() {
    let (server, mut session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/types/storageResource/action/createLun"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": {"errorCode": 108007744, "messages": [{"en-US": "The name is already in use."}]}
        })))
        .mount(&server)
        .await;

    let err = create_lun(
        &mut session,
        &CreateLunRequest::new("dup", "pool_1", 1024),
    )
    .await
    .unwrap_err();

    match &err {
        WorkflowError::Step { step, .. } => assert_eq!(*step, WorkflowStep::Submit),
        other => panic!("expected Step error, got: {other:?}"),
    }
    assert_eq!(err.status(), Some(422));
}

#[tokio::test]
async fn test_create_lun_unexpected_shape_is_workflow_error() {
    let (server, mut session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/types/storageResource/action/createLun"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": {}})))
        .mount(&server)
        .await;

    let err = create_lun(&mut session, &CreateLunRequest::new("vol", "pool_1", 1024))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::UnexpectedResponse { .. }));
}

#[tokio::test]
async fn test_create_lun_missing_after_submit_is_unverified() {
    let (server, mut session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/types/storageResource/action/createLun"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": {"storageResource": {"id": "sv_17"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/types/lun/instances/sv_17"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let created = create_lun(&mut session, &CreateLunRequest::new("vol", "pool_1", 1024))
        .await
        .unwrap();
    assert!(matches!(
        created,
        LunCreated::Unverified {
            error: VerificationError::Missing { .. },
            ..
        }
    ));
    assert_eq!(created.id(), "sv_17");
}

#[tokio::test]
async fn test_create_lun_lookup_failure_is_unverified() {
    let (server, mut session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/types/storageResource/action/createLun"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": {"storageResource": {"id": "sv_18"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/types/lun/instances/sv_18"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let created = create_lun(&mut session, &CreateLunRequest::new("vol", "pool_1", 1024))
        .await
        .unwrap();
    let error = created.verification_error().unwrap();
    assert!(matches!(error, VerificationError::Lookup { .. }));
    assert_eq!(error.id(), "sv_18");
}

#[tokio::test]
async fn test_create_lun_invalid_request_never_reaches_array() {
    let (server, mut session) = setup().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = create_lun(&mut session, &CreateLunRequest::new("vol", "pool_1", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidRequest { .. }));
}

// ── delete_lun ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_lun_is_idempotent() {
    let (server, mut session) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/types/storageResource/instances/sv_16"))
        .and(header("EMC-CSRF-TOKEN", "csrf-xyz"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/types/storageResource/instances/sv_16"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert_eq!(
        delete_lun(&mut session, "sv_16").await.unwrap(),
        Deleted::Removed
    );
    assert_eq!(
        delete_lun(&mut session, "sv_16").await.unwrap(),
        Deleted::AlreadyAbsent
    );
}

#[tokio::test]
async fn test_delete_lun_server_error_is_deletion_failure() {
    let (server, mut session) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/types/storageResource/instances/sv_3"))
        .respond_with(ResponseTemplate::new(409).set_body_string("LUN has host access"))
        .mount(&server)
        .await;

    let err = delete_lun(&mut session, "sv_3").await.unwrap_err();
    assert!(err.to_string().contains("delete LUN 'sv_3' failed at deletion"));
    assert_eq!(err.status(), Some(409));
}

// ── status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_array_status_combines_system_and_basic_info() {
    let (server, mut session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/types/system/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries(&[json!({
            "id": "0",
            "name": "unity01",
            "model": "Unity 480F",
            "serialNumber": "CKM00000000001",
            "health": {"value": 5, "descriptions": ["OK"]}
        })])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/types/basicSystemInfo/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries(&[json!({
            "id": "0",
            "softwareVersion": "5.1.2",
            "apiVersion": "11.0"
        })])))
        .mount(&server)
        .await;

    let status = array_status(&mut session).await.unwrap();
    assert_eq!(status.name.as_deref(), Some("unity01"));
    assert_eq!(status.model.as_deref(), Some("Unity 480F"));
    assert_eq!(status.software_version.as_deref(), Some("5.1.2"));
    assert_eq!(status.health.unwrap().value, 5);
}

#[tokio::test]
async fn test_array_status_tolerates_missing_basic_info() {
    let (server, mut session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/types/system/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries(&[json!({
            "id": "0",
            "name": "unity01",
            "model": "Unity 480F"
        })])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/types/basicSystemInfo/instances"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let status = array_status(&mut session).await.unwrap();
    assert_eq!(status.name.as_deref(), Some("unity01"));
    assert_eq!(status.software_version, None);
    assert_eq!(status.api_version, None);
}
