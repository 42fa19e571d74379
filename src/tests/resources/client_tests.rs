use crate::{
    CredentialRecord, FixedMachineIdentity, RateLimitConfig, TcwClient, TcwError, Temperature,
    TemperatureInput,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn create_test_client(credentials_path: &Path, machine: &str) -> TcwClient {
    TcwClient::builder()
        .credentials_path(credentials_path)
        .machine_identity(Arc::new(FixedMachineIdentity::new(machine)))
        .build()
        .await
        .unwrap()
}

async fn mount_login(mock_server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/api/v1/Login"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(serde_json::json!({"token": "test-token"})),
        )
        .mount(mock_server)
        .await;
}

async fn mount_nodes(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/Core/Nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nodes": [
                {"attributes": [{"code": "sourceName", "value": "Boiler 1", "nodeId": "n1"}]},
                {"attributes": [{"code": "sourceName", "value": "Boiler 2", "nodeId": "n2"}]}
            ]
        })))
        .mount(mock_server)
        .await;
}

fn input(source: &str, value: &str) -> TemperatureInput {
    TemperatureInput::new(source, Temperature::parse(value).unwrap())
}

#[tokio::test]
async fn test_save_then_load_on_same_machine() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 200).await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("credentials.txt");
    let record = CredentialRecord::new("admin", "Secret1", mock_server.uri());

    let client = create_test_client(&file, "MACHINE-A").await;
    client.save_credentials(record.clone()).await.unwrap();
    assert!(file.exists());

    let reopened = create_test_client(&file, "MACHINE-A").await;
    assert_eq!(reopened.load_credentials().await.unwrap(), record);
}

#[tokio::test]
async fn test_save_rejected_credentials_writes_nothing() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 401).await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("credentials.txt");

    let client = create_test_client(&file, "MACHINE-A").await;
    let result = client
        .save_credentials(CredentialRecord::new("admin", "wrong", mock_server.uri()))
        .await;

    assert!(matches!(result, Err(TcwError::Authentication(_))));
    assert!(!file.exists());
}

#[tokio::test]
async fn test_save_malformed_record_is_validation_error() {
    let dir = TempDir::new().unwrap();
    let client = create_test_client(&dir.path().join("credentials.txt"), "MACHINE-A").await;

    let result = client
        .save_credentials(CredentialRecord::new("admin", "Secret1", "ftp://x"))
        .await;
    assert!(matches!(result, Err(TcwError::Validation(_))));
}

#[tokio::test]
async fn test_load_from_other_machine_is_corrupt() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 200).await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("credentials.txt");

    create_test_client(&file, "MACHINE-A")
        .await
        .save_credentials(CredentialRecord::new("admin", "Secret1", mock_server.uri()))
        .await
        .unwrap();

    let other = create_test_client(&file, "MACHINE-B").await;
    let err = other.load_credentials().await.unwrap_err();
    assert!(matches!(err, TcwError::CorruptCredentials(_)));
    assert!(err.is_missing_credentials());
}

#[tokio::test]
async fn test_operations_without_credentials_file() {
    let dir = TempDir::new().unwrap();
    let client = create_test_client(&dir.path().join("absent.txt"), "MACHINE-A").await;

    let err = client.list_sources().await.unwrap_err();
    assert!(matches!(err, TcwError::CredentialsNotFound(_)));
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_credentials_are_loaded_lazily() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 200).await;
    mount_nodes(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("credentials.txt");

    create_test_client(&file, "MACHINE-A")
        .await
        .save_credentials(CredentialRecord::new("admin", "Secret1", mock_server.uri()))
        .await
        .unwrap();

    let client = create_test_client(&file, "MACHINE-A").await;
    assert_eq!(
        client.list_sources().await.unwrap(),
        vec!["Boiler 1", "Boiler 2"]
    );
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn test_submit_pushes_matching_sources() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 200).await;
    mount_nodes(&mock_server).await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/Core/Nodes/n1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/Core/Nodes/n2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = TcwClient::builder()
        .credentials(CredentialRecord::new("admin", "Secret1", mock_server.uri()))
        .machine_identity(Arc::new(FixedMachineIdentity::new("MACHINE-A")))
        .build()
        .await
        .unwrap();

    let pushed = client
        .submit(&[input("Boiler 1", "4,5"), input("Unknown", "1")])
        .await
        .unwrap();
    assert_eq!(pushed, 1);
}

#[tokio::test]
async fn test_submit_nothing_to_push() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 200).await;
    mount_nodes(&mock_server).await;

    let client = TcwClient::builder()
        .credentials(CredentialRecord::new("admin", "Secret1", mock_server.uri()))
        .machine_identity(Arc::new(FixedMachineIdentity::new("MACHINE-A")))
        .build()
        .await
        .unwrap();

    let result = client.submit(&[input("Unknown", "1")]).await;
    assert!(matches!(result, Err(TcwError::NothingToPush)));
}

#[tokio::test]
async fn test_submit_rejected_login_is_authentication_error() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 401).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/Core/Nodes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = TcwClient::builder()
        .credentials(CredentialRecord::new("admin", "Secret1", mock_server.uri()))
        .machine_identity(Arc::new(FixedMachineIdentity::new("MACHINE-A")))
        .build()
        .await
        .unwrap();

    let result = client.submit(&[input("Boiler 1", "1")]).await;
    assert!(matches!(result, Err(TcwError::Authentication(_))));
}

#[tokio::test]
async fn test_submit_partial_failure() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 200).await;
    mount_nodes(&mock_server).await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/Core/Nodes/n1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/Core/Nodes/n2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = TcwClient::builder()
        .credentials(CredentialRecord::new("admin", "Secret1", mock_server.uri()))
        .machine_identity(Arc::new(FixedMachineIdentity::new("MACHINE-A")))
        .build()
        .await
        .unwrap();

    let result = client
        .submit(&[input("Boiler 1", "1"), input("Boiler 2", "2")])
        .await;
    assert!(matches!(
        result,
        Err(TcwError::PartialPushFailure { attempted: 2 })
    ));
}

#[tokio::test]
async fn test_builder_rejects_zero_rate_limit() {
    let result = TcwClient::builder()
        .machine_identity(Arc::new(FixedMachineIdentity::new("MACHINE-A")))
        .rate_limit(RateLimitConfig {
            requests_per_second: 0,
            burst_size: 1,
        })
        .build()
        .await;
    assert!(matches!(result, Err(TcwError::InvalidInput(_))));
}
