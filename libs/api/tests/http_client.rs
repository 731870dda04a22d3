//! HTTP-level tests for the device client against a mock server.

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fwsync_api::{DeviceClient, DeviceConfig, HttpDeviceClient, ObjectIdentity};

const GROUPS_ENDPOINT: &str = "/restapi/v10.0/Objects/ServiceGroups";

fn client_for(server: &MockServer) -> HttpDeviceClient {
    let mut config = DeviceConfig::new(server.uri());
    config.api_key = Some("test-key".to_string());
    HttpDeviceClient::new(&config).unwrap()
}

#[tokio::test]
async fn get_sends_container_params_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GROUPS_ENDPOINT))
        .and(query_param("location", "vsys"))
        .and(query_param("vsys", "vsys1"))
        .and(query_param("name", "Test-Group"))
        .and(header("X-PAN-KEY", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "entry": [{
                    "@name": "Test-Group",
                    "members": {"member": ["service-http", "service-https"]},
                }]
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = ObjectIdentity::vsys("Test-Group");

    let (status, body) = client.get(GROUPS_ENDPOINT, &identity).await.unwrap();
    assert_eq!(status, 200);
    let body = body.unwrap();
    assert_eq!(body["result"]["entry"][0]["@name"], json!("Test-Group"));
}

#[tokio::test]
async fn get_missing_object_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GROUPS_ENDPOINT))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = ObjectIdentity::vsys("Missing");

    let (status, body) = client.get(GROUPS_ENDPOINT, &identity).await.unwrap();
    assert_eq!(status, 404);
    assert!(body.is_none());
}

#[tokio::test]
async fn create_wraps_payload_in_entry() {
    let server = MockServer::start().await;

    let entry = json!({
        "@name": "Test-Group",
        "members": {"member": ["service-http"]},
    });

    Mock::given(method("POST"))
        .and(path(GROUPS_ENDPOINT))
        .and(query_param("name", "Test-Group"))
        .and(body_json(json!({ "entry": entry })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = ObjectIdentity::vsys("Test-Group");

    let status = client
        .create(GROUPS_ENDPOINT, &identity, &entry)
        .await
        .unwrap();
    assert_eq!(status, 200);
}

#[tokio::test]
async fn edit_uses_put() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(GROUPS_ENDPOINT))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = ObjectIdentity::vsys("Test-Group");

    let status = client
        .edit(GROUPS_ENDPOINT, &identity, &json!({"@name": "Test-Group"}))
        .await
        .unwrap();
    assert_eq!(status, 200);
}

#[tokio::test]
async fn op_posts_command_as_xml() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(body_string_contains("type=op"))
        .and(body_string_contains("pending-changes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<response status="success"><result>no</result></response>"#,
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let doc = client.op("check pending-changes", false).await.unwrap();

    assert_eq!(doc.status(), Some("success"));
    assert_eq!(doc.text(&["response", "result"]), Some("no"));
}

#[tokio::test]
async fn commit_scopes_to_admins() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(body_string_contains("type=commit"))
        .and(body_string_contains("admin1"))
        .and(body_string_contains("admin2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<response status="success"><result><job>42</job></result></response>"#,
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let admins = vec!["admin1".to_string(), "admin2".to_string()];
    let doc = client.commit(Some(&admins)).await.unwrap();

    assert_eq!(doc.text(&["response", "result", "job"]), Some("42"));
}

#[tokio::test]
async fn keygen_stores_key_for_later_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(body_string_contains("type=keygen"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<response status="success"><result><key>generated-key</key></result></response>"#,
        ))
        .mount(&server)
        .await;

    let config = DeviceConfig::new(server.uri());
    let client = HttpDeviceClient::new(&config).unwrap();
    assert!(client.api_key().is_none());

    let key = client.keygen("admin", "secret").await.unwrap();
    assert_eq!(key, "generated-key");
    assert_eq!(client.api_key().as_deref(), Some("generated-key"));
}

#[tokio::test]
async fn version_parses_device_info() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(body_string_contains("type=version"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<response status="success"><result>
                <sw-version>10.0.2</sw-version>
                <multi-vsys>off</multi-vsys>
                <model>PA-VM</model>
                <serial>0123456789</serial>
            </result></response>"#,
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let info = client.version().await.unwrap();

    assert_eq!(info.sw_version, "10.0.2");
    assert_eq!(info.model, "PA-VM");
    assert!(!info.multi_vsys);
    assert!(!info.is_panorama());
}

#[tokio::test]
async fn unreachable_device_is_a_connection_error() {
    // Nothing is listening on this port.
    let config = DeviceConfig::new("http://127.0.0.1:1");
    let client = HttpDeviceClient::new(&config).unwrap();
    let identity = ObjectIdentity::vsys("Test-Group");

    let err = client.get(GROUPS_ENDPOINT, &identity).await.unwrap_err();
    assert!(matches!(err, fwsync_api::ApiError::Connection(_)));
}
