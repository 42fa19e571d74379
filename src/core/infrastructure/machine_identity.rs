//! Stable per-machine identifier used as key material for the credential cipher.
//!
//! Credentials encrypted on one machine cannot be decrypted on another. Replacing
//! the hardware (or the OS install, on Linux) invalidates the saved credentials and
//! the operator has to enter them again.

use crate::config::FALLBACK_MACHINE_ID;
use async_trait::async_trait;
use tokio::process::Command;

/// Source of the machine identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MachineIdentity: Send + Sync {
    /// Returns the identifier. Never fails: providers fall back to a constant.
    async fn machine_id(&self) -> String;
}

/// Queries the host: BIOS serial on Windows, `machine-id` on Linux,
/// `IOPlatformUUID` on macOS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMachineIdentity;

#[async_trait]
impl MachineIdentity for SystemMachineIdentity {
    async fn machine_id(&self) -> String {
        match query_host_identifier().await {
            Some(id) => id,
            None => {
                tracing::warn!("Host identifier unavailable, using fallback machine id");
                FALLBACK_MACHINE_ID.to_string()
            }
        }
    }
}

/// A caller-supplied identifier.
#[derive(Debug, Clone)]
pub struct FixedMachineIdentity(String);

impl FixedMachineIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[async_trait]
impl MachineIdentity for FixedMachineIdentity {
    async fn machine_id(&self) -> String {
        if self.0.is_empty() {
            FALLBACK_MACHINE_ID.to_string()
        } else {
            self.0.clone()
        }
    }
}

#[cfg(target_os = "windows")]
async fn query_host_identifier() -> Option<String> {
    let output = Command::new("wmic")
        .args(["bios", "get", "serialnumber"])
        .output()
        .await
        .ok()?;
    non_empty(clean_wmic_serial(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(target_os = "macos")]
async fn query_host_identifier() -> Option<String> {
    let output = Command::new("ioreg")
        .args(["-rd1", "-c", "IOPlatformExpertDevice"])
        .output()
        .await
        .ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().find(|l| l.contains("IOPlatformUUID"))?;
    non_empty(line.rsplit('"').nth(1).unwrap_or_default().to_string())
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
async fn query_host_identifier() -> Option<String> {
    for path in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
        if let Ok(contents) = tokio::fs::read_to_string(path).await {
            if let Some(id) = non_empty(contents.trim().to_string()) {
                return Some(id);
            }
        }
    }
    // No machine-id file (containers, minimal installs).
    let output = Command::new("hostid").output().await.ok()?;
    non_empty(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Strips line breaks, spaces and the column header from `wmic` output.
#[cfg_attr(not(any(target_os = "windows", test)), allow(dead_code))]
fn clean_wmic_serial(raw: &str) -> String {
    raw.replace(['\n', '\r', ' '], "")
        .replace("SerialNumber", "")
}

fn non_empty(id: String) -> Option<String> {
    if id.is_empty() { None } else { Some(id) }
}
