use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::approval::ApprovalStatus;
use crate::provider::{address_hex, Address, ProviderKind};

/// On-disk layout. Keys match the browser storage keys of the web dashboard
/// so the two can share tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    connected_wallet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    approval_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    approval_requested: Option<bool>,
}

/// Session restored from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub address: Address,
    pub provider: Option<ProviderKind>,
    /// Last status the backend confirmed, if any.
    pub approval: Option<ApprovalStatus>,
    pub approval_requested: bool,
}

/// Connected wallet and last known approval status, stored as JSON.
///
/// Path: `data_dir()/session.json`
pub struct SessionStore {
    path: PathBuf,
    data: SessionFile,
}

impl SessionStore {
    /// Open (or create) the session store at the default data directory.
    pub fn open() -> Result<Self> {
        let path = crate::data_dir()?.join("session.json");
        Self::open_at(path)
    }

    /// Open (or create) the session store at a specific path.
    /// A corrupt file reads as an empty session.
    pub fn open_at(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path).context("Failed to read session.json")?;
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable session file");
                SessionFile::default()
            })
        } else {
            SessionFile::default()
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted session, if a valid wallet address is stored.
    pub fn load(&self) -> Option<StoredSession> {
        let address = self.data.connected_wallet.as_deref()?.parse().ok()?;
        Some(StoredSession {
            address,
            provider: self
                .data
                .provider_kind
                .as_deref()
                .and_then(|s| s.parse().ok()),
            approval: self
                .data
                .approval_status
                .as_deref()
                .and_then(|s| s.parse().ok()),
            approval_requested: self.data.approval_requested.unwrap_or(false),
        })
    }

    /// Record a freshly connected wallet. Any previous approval state is dropped.
    pub fn save_connection(&mut self, address: &Address, provider: ProviderKind) -> Result<()> {
        self.data = SessionFile {
            connected_wallet: Some(address_hex(address)),
            provider_kind: Some(provider.id().to_string()),
            approval_status: None,
            approval_requested: None,
        };
        self.save()
    }

    pub fn set_approval(&mut self, status: ApprovalStatus) -> Result<()> {
        if status == ApprovalStatus::Disconnected {
            return self.clear();
        }
        self.data.approval_status = Some(status.to_string());
        self.save()
    }

    pub fn mark_approval_requested(&mut self) -> Result<()> {
        self.data.approval_requested = Some(true);
        self.save()
    }

    /// Remove every session key at once.
    pub fn clear(&mut self) -> Result<()> {
        self.data = SessionFile::default();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove session.json"),
        }
    }

    /// Write to a sibling temp file and rename over the target, so a crash
    /// never leaves a half-written session behind.
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let json =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize session")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).context("Failed to write session.json")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }
        std::fs::rename(&tmp, &self.path).context("Failed to replace session.json")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> Address {
        "0x1234567890abcdef1234567890abcdef1234abcd".parse().unwrap()
    }

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn empty_store_has_no_session() {
        let (_dir, store) = temp_store();
        assert!(store.load().is_none());
    }

    #[test]
    fn connection_persists_across_reopen() {
        let (dir, mut store) = temp_store();
        store.save_connection(&addr(), ProviderKind::Coinbase).unwrap();
        store.set_approval(ApprovalStatus::Pending).unwrap();
        store.mark_approval_requested().unwrap();
        drop(store);

        let store = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        let session = store.load().unwrap();
        assert_eq!(session.address, addr());
        assert_eq!(session.provider, Some(ProviderKind::Coinbase));
        assert_eq!(session.approval, Some(ApprovalStatus::Pending));
        assert!(session.approval_requested);
    }

    #[test]
    fn file_uses_browser_key_names() {
        let (_dir, mut store) = temp_store();
        store.save_connection(&addr(), ProviderKind::MetaMask).unwrap();
        store.set_approval(ApprovalStatus::Approved).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["connectedWallet"], address_hex(&addr()));
        assert_eq!(v["approvalStatus"], "approved");
        assert_eq!(v["providerKind"], "metamask");
    }

    #[test]
    fn new_connection_drops_old_approval() {
        let (_dir, mut store) = temp_store();
        store.save_connection(&addr(), ProviderKind::MetaMask).unwrap();
        store.set_approval(ApprovalStatus::Approved).unwrap();
        store.save_connection(&addr(), ProviderKind::Trust).unwrap();
        assert_eq!(store.load().unwrap().approval, None);
    }

    #[test]
    fn clear_removes_all_keys() {
        let (dir, mut store) = temp_store();
        store.save_connection(&addr(), ProviderKind::MetaMask).unwrap();
        store.set_approval(ApprovalStatus::Approved).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        assert!(!store.path().exists());

        let reopened = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        assert!(reopened.load().is_none());
        // Clearing twice is fine.
        let mut reopened = reopened;
        reopened.clear().unwrap();
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = SessionStore::open_at(path).unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn invalid_address_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"connectedWallet":"not-an-address"}"#).unwrap();
        let store = SessionStore::open_at(path).unwrap();
        assert!(store.load().is_none());
    }
}
