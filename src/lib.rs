//! Cold-water temperature import client.
//!
//! Keeps the operator's credentials encrypted on disk under a key bound to the
//! machine, logs in to the building-management API with a cached bearer token,
//! and pushes summer/winter cold-water temperatures to the nodes matching each
//! entered source label.

mod auth;
pub mod config;
mod core;
pub mod exchange;
mod nodes;

pub use crate::auth::application::service::login_service::LoginService;
pub use crate::config::{ClientConfig, RateLimitConfig};
pub use crate::core::domain::{
    error::{TcwError, TcwResult, ValidationError},
    model::{
        connection::Connection,
        credential_record::CredentialRecord,
        node::NodeAttributeRow,
        pending_update::{PendingUpdate, TemperatureInput},
    },
    value_object::{BearerToken, ServerUrl, Temperature, input_filter},
};
pub use crate::core::infrastructure::{
    api_client::ApiClient,
    credential_cipher::{CredentialCipher, DerivedKey, derive_key},
    credential_store::CredentialStore,
    machine_identity::{FixedMachineIdentity, MachineIdentity, SystemMachineIdentity},
};
pub use crate::exchange::spreadsheet::TemperatureRow;
pub use crate::nodes::application::service::node_service::NodeService;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A client for entering cold-water temperatures on one server.
///
/// The server and credentials come from the encrypted credential file, which is
/// read lazily on the first call that needs them.
///
/// # Examples
///
/// ```no_run
/// use tcw_import::{Temperature, TemperatureInput, TcwClient, TcwResult};
///
/// #[tokio::main]
/// async fn main() -> TcwResult<()> {
///     let client = TcwClient::builder().build().await?;
///
///     for source in client.list_sources().await? {
///         println!("{}", source);
///     }
///
///     let inputs = vec![TemperatureInput::new("Boiler 1", Temperature::parse("4,5")?)];
///     let pushed = client.submit(&inputs).await?;
///     println!("{} nodes updated", pushed);
///     Ok(())
/// }
/// ```
pub struct TcwClient {
    store: CredentialStore,
    config: ClientConfig,
    api: RwLock<Option<Arc<ApiClient>>>,
}

/// Builder for TcwClient configuration
#[derive(Default)]
pub struct TcwClientBuilder {
    credentials_path: Option<PathBuf>,
    machine_identity: Option<Arc<dyn MachineIdentity>>,
    credentials: Option<CredentialRecord>,
    config: ClientConfig,
}

impl TcwClientBuilder {
    /// Location of the encrypted credential file.
    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Source of the key material for the credential cipher.
    pub fn machine_identity(mut self, identity: Arc<dyn MachineIdentity>) -> Self {
        self.machine_identity = Some(identity);
        self
    }

    /// Uses `record` for this session instead of the credential file.
    ///
    /// Nothing is written to disk.
    pub fn credentials(mut self, record: CredentialRecord) -> Self {
        self.credentials = Some(record);
        self
    }

    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.config.token_lifetime = lifetime;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(rate_limit);
        self
    }

    /// Derives the credential key and assembles the client.
    ///
    /// # Errors
    /// `Validation` if preset credentials are malformed, `InvalidInput` for a
    /// zero rate limit.
    pub async fn build(self) -> TcwResult<TcwClient> {
        if let Some(rate_limit) = self.config.rate_limit {
            rate_limit.quota()?;
        }
        let identity = self
            .machine_identity
            .unwrap_or_else(|| Arc::new(SystemMachineIdentity));
        let cipher = CredentialCipher::for_machine(identity.as_ref()).await?;
        let path = self
            .credentials_path
            .unwrap_or_else(config::default_credentials_path);

        let client = TcwClient {
            store: CredentialStore::new(path, cipher),
            config: self.config,
            api: RwLock::new(None),
        };

        if let Some(record) = self.credentials {
            record.validate()?;
            client.install(record).await?;
        }

        Ok(client)
    }
}

impl TcwClient {
    /// Creates a new builder for TcwClient configuration
    pub fn builder() -> TcwClientBuilder {
        TcwClientBuilder::default()
    }

    /// Path of the encrypted credential file.
    pub fn credentials_path(&self) -> &std::path::Path {
        self.store.path()
    }

    /// Reads and decrypts the stored credentials and makes them current.
    ///
    /// # Errors
    /// `CredentialsNotFound` before the first save, `CorruptCredentials` when
    /// the file cannot be decrypted (e.g. it was written on another machine).
    pub async fn load_credentials(&self) -> TcwResult<CredentialRecord> {
        let record = self.store.load().await?;
        self.install(record.clone()).await?;
        Ok(record)
    }

    /// Validates `record` against its server and persists it on success.
    ///
    /// The new credentials become current with an empty token cache. Nothing
    /// is written when the server rejects them.
    ///
    /// # Errors
    /// `Validation` for malformed fields, `Authentication` when the server
    /// does not accept the login, `Io` when the file cannot be written.
    pub async fn save_credentials(&self, record: CredentialRecord) -> TcwResult<()> {
        record.validate()?;
        if !self.test_credentials(&record).await {
            return Err(TcwError::Authentication(format!(
                "{} rejected the credentials",
                record.server
            )));
        }
        self.store.save(&record).await?;
        self.install(record).await
    }

    /// True when the record's server answers a login with 2xx.
    pub async fn test_credentials(&self, record: &CredentialRecord) -> bool {
        let candidate = self.connection_for(record.clone());
        LoginService::new().test_credentials(&candidate).await
    }

    /// Forces a fresh login and caches the token.
    pub async fn login(&self) -> TcwResult<()> {
        self.api().await?.login().await?;
        Ok(())
    }

    /// Returns true if a fresh token is cached.
    pub async fn is_authenticated(&self) -> bool {
        match self.api.read().await.as_ref() {
            Some(api) => api.is_authenticated().await,
            None => false,
        }
    }

    /// Distinct source labels known to the server, sorted.
    pub async fn list_sources(&self) -> TcwResult<Vec<String>> {
        Ok(self.node_service().await?.list_sources().await)
    }

    pub async fn resolve_node_ids(
        &self,
        labels: &HashSet<String>,
    ) -> TcwResult<Vec<NodeAttributeRow>> {
        Ok(self.node_service().await?.resolve_node_ids(labels).await)
    }

    pub async fn push_updates(&self, updates: &[PendingUpdate]) -> TcwResult<bool> {
        Ok(self.node_service().await?.push_updates(updates).await)
    }

    /// Resolves, merges and pushes the entered temperatures.
    ///
    /// Returns the number of nodes updated.
    ///
    /// # Errors
    /// `Authentication` when no token can be obtained, `NothingToPush` when no
    /// entered source matches a node, `PartialPushFailure` when at least one
    /// patch failed.
    pub async fn submit(&self, inputs: &[TemperatureInput]) -> TcwResult<usize> {
        let api = self.api().await?;
        // Resolution swallows failures; surface a rejected login first.
        api.get_token().await?;
        let service = NodeService::new(api);
        let labels: HashSet<String> = inputs.iter().map(|input| input.source.clone()).collect();

        let resolved = service.resolve_node_ids(&labels).await;
        let updates = NodeService::merge(&resolved, inputs);
        if updates.is_empty() {
            return Err(TcwError::NothingToPush);
        }

        if service.push_updates(&updates).await {
            Ok(updates.len())
        } else {
            Err(TcwError::PartialPushFailure {
                attempted: updates.len(),
            })
        }
    }

    async fn node_service(&self) -> TcwResult<NodeService> {
        Ok(NodeService::new(self.api().await?))
    }

    async fn api(&self) -> TcwResult<Arc<ApiClient>> {
        if let Some(api) = self.api.read().await.as_ref() {
            return Ok(Arc::clone(api));
        }
        self.load_credentials().await?;
        self.api
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| TcwError::CredentialsNotFound(self.store.path().to_path_buf()))
    }

    async fn install(&self, record: CredentialRecord) -> TcwResult<()> {
        let api = ApiClient::new(self.connection_for(record), self.config.clone())?;
        *self.api.write().await = Some(Arc::new(api));
        Ok(())
    }

    fn connection_for(&self, record: CredentialRecord) -> Connection {
        Connection::new(
            record,
            self.config.accept_invalid_certs,
            self.config.request_timeout,
        )
    }
}

#[cfg(test)]
mod tests;
