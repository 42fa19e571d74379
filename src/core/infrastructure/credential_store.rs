//! Encrypted single-file persistence of the credential record.

use crate::{
    CredentialRecord, TcwError, TcwResult,
    core::infrastructure::credential_cipher::CredentialCipher,
};
use std::path::{Path, PathBuf};

/// Reads and writes the credential record at one path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    cipher: CredentialCipher,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, cipher: CredentialCipher) -> Self {
        Self {
            path: path.into(),
            cipher,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encrypts and writes `record`, replacing any previous content.
    ///
    /// The blob goes to a sibling temp file first and is renamed over the target.
    pub async fn save(&self, record: &CredentialRecord) -> TcwResult<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| TcwError::InvalidInput(format!("Cannot serialize credentials: {}", e)))?;
        let encrypted = self.cipher.encrypt(&json)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, encrypted.as_bytes()).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::info!(path = %self.path.display(), "Credentials saved");
        Ok(())
    }

    /// Reads, decrypts and parses the record.
    ///
    /// # Errors
    /// `CredentialsNotFound` when the file is absent, `CorruptCredentials` when
    /// it cannot be decrypted or parsed.
    pub async fn load(&self) -> TcwResult<CredentialRecord> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TcwError::CredentialsNotFound(self.path.clone()));
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(TcwError::CorruptCredentials(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let json = self.cipher.decrypt(&contents).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Cannot decrypt credentials");
            TcwError::CorruptCredentials(e.to_string())
        })?;

        serde_json::from_str(&json).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Cannot parse credentials");
            TcwError::CorruptCredentials(e.to_string())
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
