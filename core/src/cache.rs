/// SQLite-backed offline snapshot of the backend's view of a wallet.
///
/// Keyed by (network, address) so several wallets can share one DB. Each
/// write replaces the stored copy; the backend stays the source of truth.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::backend::{EntryStatus, PlatformSettings, Transaction, UserAccount, WithdrawalRequest};
use crate::config::MAX_CACHED_TRANSACTIONS;

pub struct SnapshotCache {
    conn: Connection,
}

/// Account row plus the settings that were current when it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAccount {
    pub account: UserAccount,
    pub settings: PlatformSettings,
    /// Milliseconds since the Unix epoch.
    pub updated_at: i64,
}

/// Default DB location: `data_dir()/cache.db`
/// (Linux: `~/.local/share/cryptowave`, macOS: `~/Library/Application Support/cryptowave`)
fn default_db_path() -> Result<PathBuf> {
    Ok(crate::data_dir()?.join("cache.db"))
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

impl SnapshotCache {
    /// Open (or create) the cache in the default data directory.
    pub fn open() -> Result<Self> {
        Self::open_at(&default_db_path()?)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
            }
        }
        let conn = Connection::open(path).context("Failed to open cache database")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Open an in-memory cache (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS accounts (
                network           TEXT    NOT NULL,
                address           TEXT    NOT NULL,
                staked_amount     REAL    NOT NULL,
                total_earned      REAL    NOT NULL,
                vip_level         INTEGER NOT NULL,
                claimable_rewards REAL    NOT NULL,
                settings          TEXT    NOT NULL,
                updated_at        INTEGER NOT NULL,
                PRIMARY KEY (network, address)
            );

            CREATE TABLE IF NOT EXISTS transactions (
                network   TEXT    NOT NULL,
                address   TEXT    NOT NULL,
                position  INTEGER NOT NULL,
                id        TEXT,
                kind      TEXT    NOT NULL,
                amount    REAL    NOT NULL,
                date      TEXT    NOT NULL,
                status    TEXT    NOT NULL,
                PRIMARY KEY (network, address, position)
            );

            CREATE TABLE IF NOT EXISTS withdrawals (
                network          TEXT    NOT NULL,
                address          TEXT    NOT NULL,
                position         INTEGER NOT NULL,
                id               TEXT,
                amount           REAL    NOT NULL,
                fee              REAL    NOT NULL,
                net_amount       REAL    NOT NULL,
                status           TEXT    NOT NULL,
                requested_at     TEXT    NOT NULL,
                rejection_reason TEXT,
                PRIMARY KEY (network, address, position)
            );",
            )
            .context("Failed to initialize cache schema")?;
        Ok(())
    }

    pub fn store_account(
        &self,
        network: &str,
        address: &str,
        account: &UserAccount,
        settings: &PlatformSettings,
    ) -> Result<()> {
        let settings_json =
            serde_json::to_string(settings).context("Failed to serialize settings")?;
        self.conn
            .execute(
                "INSERT INTO accounts (
                network, address, staked_amount, total_earned, vip_level,
                claimable_rewards, settings, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (network, address) DO UPDATE SET
                staked_amount = excluded.staked_amount,
                total_earned = excluded.total_earned,
                vip_level = excluded.vip_level,
                claimable_rewards = excluded.claimable_rewards,
                settings = excluded.settings,
                updated_at = excluded.updated_at",
                params![
                    network,
                    address,
                    account.staked_amount,
                    account.total_earned,
                    account.vip_level as i64,
                    account.claimable_rewards,
                    settings_json,
                    now_millis(),
                ],
            )
            .context("Failed to store account snapshot")?;
        Ok(())
    }

    pub fn load_account(&self, network: &str, address: &str) -> Result<Option<CachedAccount>> {
        let row = self
            .conn
            .query_row(
                "SELECT staked_amount, total_earned, vip_level, claimable_rewards,
                        settings, updated_at
                 FROM accounts WHERE network = ?1 AND address = ?2",
                params![network, address],
                |row| {
                    let vip_level: i64 = row.get(2)?;
                    let account = UserAccount {
                        staked_amount: row.get(0)?,
                        total_earned: row.get(1)?,
                        vip_level: u8::try_from(vip_level).unwrap_or(0),
                        claimable_rewards: row.get(3)?,
                    };
                    let settings: String = row.get(4)?;
                    let updated_at: i64 = row.get(5)?;
                    Ok((account, settings, updated_at))
                },
            )
            .optional()
            .context("Failed to query account snapshot")?;

        Ok(row.map(|(account, settings, updated_at)| CachedAccount {
            account,
            // Older or hand-edited rows fall back to client defaults.
            settings: serde_json::from_str(&settings).unwrap_or_default(),
            updated_at,
        }))
    }

    /// Replace the cached history. Only the newest entries are kept.
    pub fn store_transactions(
        &self,
        network: &str,
        address: &str,
        txs: &[Transaction],
    ) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;
        tx.execute(
            "DELETE FROM transactions WHERE network = ?1 AND address = ?2",
            params![network, address],
        )
        .context("Failed to clear cached transactions")?;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO transactions (
                    network, address, position, id, kind, amount, date, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .context("Failed to prepare insert statement")?;
            for (position, entry) in txs.iter().take(MAX_CACHED_TRANSACTIONS).enumerate() {
                stmt.execute(params![
                    network,
                    address,
                    position as i64,
                    entry.id,
                    entry.kind.as_str(),
                    entry.amount,
                    entry.date,
                    entry.status.as_str(),
                ])
                .context("Failed to insert transaction")?;
            }
        }
        tx.commit().context("Failed to commit transaction batch")?;
        Ok(())
    }

    /// Cached history in the order the backend returned it.
    pub fn load_transactions(&self, network: &str, address: &str) -> Result<Vec<Transaction>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, kind, amount, date, status FROM transactions
                 WHERE network = ?1 AND address = ?2
                 ORDER BY position ASC",
            )
            .context("Failed to prepare transaction query")?;
        let rows = stmt
            .query_map(params![network, address], |row| {
                let kind: String = row.get(1)?;
                let status: String = row.get(4)?;
                Ok(Transaction {
                    id: row.get(0)?,
                    kind: kind.as_str().into(),
                    amount: row.get(2)?,
                    date: row.get(3)?,
                    status: status.as_str().into(),
                })
            })
            .context("Failed to query transactions")?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read transaction rows")
    }

    pub fn store_withdrawals(
        &self,
        network: &str,
        address: &str,
        withdrawals: &[WithdrawalRequest],
    ) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;
        tx.execute(
            "DELETE FROM withdrawals WHERE network = ?1 AND address = ?2",
            params![network, address],
        )
        .context("Failed to clear cached withdrawals")?;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO withdrawals (
                    network, address, position, id, amount, fee, net_amount,
                    status, requested_at, rejection_reason
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )
                .context("Failed to prepare insert statement")?;
            for (position, w) in withdrawals.iter().enumerate() {
                stmt.execute(params![
                    network,
                    address,
                    position as i64,
                    w.id,
                    w.amount,
                    w.fee,
                    w.net_amount,
                    w.status.as_str(),
                    w.requested_at,
                    w.rejection_reason,
                ])
                .context("Failed to insert withdrawal")?;
            }
        }
        tx.commit().context("Failed to commit withdrawal batch")?;
        Ok(())
    }

    pub fn load_withdrawals(
        &self,
        network: &str,
        address: &str,
    ) -> Result<Vec<WithdrawalRequest>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, amount, fee, net_amount, status, requested_at, rejection_reason
                 FROM withdrawals
                 WHERE network = ?1 AND address = ?2
                 ORDER BY position ASC",
            )
            .context("Failed to prepare withdrawal query")?;
        let rows = stmt
            .query_map(params![network, address], |row| {
                let status: String = row.get(4)?;
                Ok(WithdrawalRequest {
                    id: row.get(0)?,
                    amount: row.get(1)?,
                    fee: row.get(2)?,
                    net_amount: row.get(3)?,
                    status: EntryStatus::from(status.as_str()),
                    requested_at: row.get(5)?,
                    rejection_reason: row.get(6)?,
                })
            })
            .context("Failed to query withdrawals")?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read withdrawal rows")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TransactionKind;

    fn tx(id: &str, kind: &str, amount: f64) -> Transaction {
        Transaction {
            id: Some(id.to_string()),
            kind: kind.into(),
            amount,
            date: "2024-05-01".to_string(),
            status: EntryStatus::Completed,
        }
    }

    #[test]
    fn account_round_trip_keeps_settings() {
        let cache = SnapshotCache::open_in_memory().unwrap();
        assert!(cache.load_account("ethereum", "0xme").unwrap().is_none());

        let account = UserAccount {
            staked_amount: 12_000.0,
            total_earned: 42.5,
            vip_level: 1,
            claimable_rewards: 3.25,
        };
        let settings = PlatformSettings {
            base_apy: 15.0,
            platform_wallet: Some("0x00000000000000000000000000000000000000aa".into()),
            ..PlatformSettings::default()
        };
        cache
            .store_account("ethereum", "0xme", &account, &settings)
            .unwrap();

        let cached = cache.load_account("ethereum", "0xme").unwrap().unwrap();
        assert_eq!(cached.account, account);
        assert_eq!(cached.settings, settings);
        assert!(cached.updated_at > 0);
    }

    #[test]
    fn account_upsert_replaces_row() {
        let cache = SnapshotCache::open_in_memory().unwrap();
        let mut account = UserAccount::default();
        let settings = PlatformSettings::default();
        cache.store_account("ethereum", "0xme", &account, &settings).unwrap();
        account.staked_amount = 500.0;
        cache.store_account("ethereum", "0xme", &account, &settings).unwrap();
        let cached = cache.load_account("ethereum", "0xme").unwrap().unwrap();
        assert_eq!(cached.account.staked_amount, 500.0);
    }

    #[test]
    fn transactions_keep_order_and_unknown_kinds() {
        let cache = SnapshotCache::open_in_memory().unwrap();
        let txs = vec![
            tx("3", "claim", 5.0),
            tx("2", "airdrop", 1.0),
            tx("1", "stake", 100.0),
        ];
        cache.store_transactions("ethereum", "0xme", &txs).unwrap();
        let loaded = cache.load_transactions("ethereum", "0xme").unwrap();
        assert_eq!(loaded, txs);
        assert_eq!(loaded[1].kind, TransactionKind::Other("airdrop".into()));
    }

    #[test]
    fn transactions_are_capped() {
        let cache = SnapshotCache::open_in_memory().unwrap();
        let txs: Vec<_> = (0..80)
            .map(|i| tx(&i.to_string(), "interest", i as f64))
            .collect();
        cache.store_transactions("ethereum", "0xme", &txs).unwrap();
        let loaded = cache.load_transactions("ethereum", "0xme").unwrap();
        assert_eq!(loaded.len(), MAX_CACHED_TRANSACTIONS);
        assert_eq!(loaded[0].id.as_deref(), Some("0"));
    }

    #[test]
    fn storing_replaces_previous_history() {
        let cache = SnapshotCache::open_in_memory().unwrap();
        let first = [tx("1", "stake", 1.0), tx("2", "stake", 2.0)];
        cache.store_transactions("ethereum", "0xme", &first).unwrap();
        cache
            .store_transactions("ethereum", "0xme", &[tx("9", "claim", 9.0)])
            .unwrap();
        let loaded = cache.load_transactions("ethereum", "0xme").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id.as_deref(), Some("9"));
    }

    #[test]
    fn withdrawals_round_trip() {
        let cache = SnapshotCache::open_in_memory().unwrap();
        let withdrawals = vec![
            WithdrawalRequest {
                id: Some("w1".into()),
                amount: 100.0,
                fee: 2.0,
                net_amount: 98.0,
                status: EntryStatus::Rejected,
                requested_at: "2024-05-01T10:00:00Z".into(),
                rejection_reason: Some("KYC required".into()),
            },
            WithdrawalRequest {
                id: None,
                amount: 50.0,
                fee: 1.0,
                net_amount: 49.0,
                status: EntryStatus::Pending,
                requested_at: String::new(),
                rejection_reason: None,
            },
        ];
        cache
            .store_withdrawals("ethereum", "0xme", &withdrawals)
            .unwrap();
        assert_eq!(
            cache.load_withdrawals("ethereum", "0xme").unwrap(),
            withdrawals
        );
    }

    #[test]
    fn isolation_by_network_and_address() {
        let cache = SnapshotCache::open_in_memory().unwrap();
        cache
            .store_transactions("ethereum", "0xme", &[tx("1", "stake", 1.0)])
            .unwrap();
        assert!(cache.load_transactions("polygon", "0xme").unwrap().is_empty());
        assert!(cache.load_transactions("ethereum", "0xother").unwrap().is_empty());
    }

    #[test]
    fn file_backed_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");
        {
            let cache = SnapshotCache::open_at(&path).unwrap();
            cache
                .store_transactions("ethereum", "0xme", &[tx("1", "stake", 1.0)])
                .unwrap();
        }
        let cache = SnapshotCache::open_at(&path).unwrap();
        assert_eq!(cache.load_transactions("ethereum", "0xme").unwrap().len(), 1);
    }
}
