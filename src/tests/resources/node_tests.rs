use crate::{
    ApiClient, BearerToken, ClientConfig, Connection, CredentialRecord, NodeService,
    PendingUpdate,
};
use std::collections::HashSet;
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

fn create_test_connection(server_url: &str) -> Connection {
    Connection::new(
        CredentialRecord::new("testuser", "testpass", server_url),
        false,
        None,
    )
}

fn create_client(mock_server: &MockServer) -> Arc<ApiClient> {
    let connection = create_test_connection(&mock_server.uri());
    Arc::new(ApiClient::new(connection, ClientConfig::default()).unwrap())
}

async fn create_authenticated_client(mock_server: &MockServer) -> Arc<ApiClient> {
    let client = create_client(mock_server);
    client
        .set_token(BearerToken::new_unchecked("test-token".to_string()))
        .await;
    client
}

fn nodes_body() -> serde_json::Value {
    serde_json::json!({
        "nodes": [
            {"attributes": [
                {"code": "sourceName", "value": "b", "nodeId": "n1"},
                {"code": "address", "value": "Main st. 1", "nodeId": "n1"}
            ]},
            {"attributes": [{"code": "sourceName", "value": "a", "nodeId": "n2"}]},
            {"attributes": [{"code": "sourceName", "value": "a", "nodeId": "n3"}]},
            {"attributes": null},
            {"attributes": [{"code": "sourceName", "value": "c", "nodeId": 4}]}
        ]
    })
}

async fn mount_nodes(mock_server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/Core/Nodes"))
        .and(query_param("getAttributes", "True"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_body()))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_list_sources_sorted_and_distinct() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;
    mount_nodes(&mock_server, 1).await;

    let sources = NodeService::new(client).list_sources().await;
    assert_eq!(sources, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_list_sources_server_error_is_empty() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Core/Nodes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    assert!(NodeService::new(client).list_sources().await.is_empty());
}

#[tokio::test]
async fn test_list_sources_unparsable_body_is_empty() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Core/Nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    assert!(NodeService::new(client).list_sources().await.is_empty());
}

#[tokio::test]
async fn test_resolve_node_ids_keeps_every_match() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;
    mount_nodes(&mock_server, 1).await;

    let labels: HashSet<String> = ["a".to_string(), "c".to_string(), "zzz".to_string()].into();
    let mut rows = NodeService::new(client).resolve_node_ids(&labels).await;
    rows.sort_by(|x, y| x.node_id.cmp(&y.node_id));

    let pairs: Vec<(&str, &str)> = rows
        .iter()
        .map(|row| (row.attribute_value.as_str(), row.node_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("c", "4"), ("a", "n2"), ("a", "n3")]);
}

#[tokio::test]
async fn test_push_updates_sends_patch_documents() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    for (node_id, value) in [("n1", 4.5), ("n2", -1.0)] {
        Mock::given(method("PATCH"))
            .and(path(format!("/api/v1/Core/Nodes/{}", node_id)))
            .and(header("authorization", "Bearer test-token"))
            .and(header("content-type", "application/json-patch+json"))
            .and(body_json(serde_json::json!([
                {"op": "replace", "path": "coldWaterSummerTemp", "value": value},
                {"op": "replace", "path": "coldWaterWinterTemp", "value": value}
            ])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let updates = vec![PendingUpdate::new("n1", 4.5), PendingUpdate::new("n2", -1.0)];
    assert!(NodeService::new(client).push_updates(&updates).await);
}

#[tokio::test]
async fn test_push_updates_partial_failure_still_sends_all() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    for (node_id, status) in [("n1", 200), ("n2", 500), ("n3", 204)] {
        Mock::given(method("PATCH"))
            .and(path(format!("/api/v1/Core/Nodes/{}", node_id)))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let updates = vec![
        PendingUpdate::new("n1", 1.0),
        PendingUpdate::new("n2", 2.0),
        PendingUpdate::new("n3", 3.0),
    ];
    assert!(!NodeService::new(client).push_updates(&updates).await);
}

#[tokio::test]
async fn test_push_updates_empty_is_success_without_requests() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    assert!(NodeService::new(client).push_updates(&[]).await);
}

#[tokio::test]
async fn test_push_updates_logs_in_once_for_all_patches() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/Login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "test-token"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let updates = vec![
        PendingUpdate::new("n1", 1.0),
        PendingUpdate::new("n2", 2.0),
        PendingUpdate::new("n3", 3.0),
    ];
    assert!(NodeService::new(client).push_updates(&updates).await);
}

#[tokio::test]
async fn test_push_updates_without_login_fails() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/Login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let updates = vec![PendingUpdate::new("n1", 1.0)];
    assert!(!NodeService::new(client).push_updates(&updates).await);
}

#[tokio::test]
async fn test_token_reused_across_operations() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/Login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "test-token"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_nodes(&mock_server, 2).await;

    let service = NodeService::new(client);
    assert_eq!(service.list_sources().await.len(), 3);
    assert_eq!(service.list_sources().await.len(), 3);
}
