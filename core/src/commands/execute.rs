use anyhow::{bail, Result};

use super::help::help_text;
use super::Command;
use crate::actions::StakeProgress;
use crate::approval::{ApprovalStatus, Phase};
use crate::dashboard::DashboardSnapshot;
use crate::display;
use crate::provider::address_hex;
use crate::service::DashboardService;
use crate::vip;

/// Fail unless a wallet is connected and approved.
fn ensure_approved(service: &DashboardService) -> Result<()> {
    let Some(address) = service.address() else {
        bail!("No wallet connected. Use 'connect <provider>' first.");
    };
    if service.approval().status != ApprovalStatus::Approved {
        bail!(
            "Your wallet is pending approval.\n  Address: {address}\n  An administrator must approve it before the dashboard is available."
        );
    }
    Ok(())
}

fn cached_note(snapshot: &DashboardSnapshot) -> &'static str {
    if snapshot.is_verified() {
        ""
    } else {
        "\n  (offline: showing cached data)"
    }
}

impl Command {
    /// Execute a command and return the output string.
    /// `progress` receives stake pipeline updates as they happen.
    pub async fn execute(
        &self,
        service: &DashboardService,
        json_output: bool,
        progress: &(dyn Fn(StakeProgress) + Send + Sync),
    ) -> Result<String> {
        if self.requires_approval() {
            ensure_approved(service)?;
        }
        let symbol = service.symbol().to_string();

        match self {
            Command::Connect { provider } => {
                let state = service.connect(*provider).await?;
                let address = service.address().map(|a| address_hex(&a)).unwrap_or_default();
                if state.is_approved() {
                    service.load().await?;
                }
                if json_output {
                    Ok(serde_json::json!({
                        "address": address,
                        "provider": provider.id(),
                        "status": state.status.to_string(),
                    })
                    .to_string())
                } else if state.is_approved() {
                    Ok(format!("Connected {address} via {provider}.\nAccess approved."))
                } else {
                    Ok(format!(
                        "Connected {address} via {provider}.\nYour wallet is pending approval. An administrator will review your access request."
                    ))
                }
            }

            Command::Disconnect => {
                service.disconnect().await?;
                if json_output {
                    Ok(serde_json::json!({ "status": "disconnected" }).to_string())
                } else {
                    Ok("Wallet disconnected.".to_string())
                }
            }

            Command::Status => {
                let config = service.config();
                let state = service.approval();
                let address = service.address();
                let provider = service.provider_kind();
                let phase = match state.phase {
                    Phase::Cached => "cached",
                    Phase::Verified => "verified",
                };
                if json_output {
                    return Ok(serde_json::json!({
                        "address": address.map(|a| address_hex(&a)),
                        "provider": provider.map(|p| p.id()),
                        "provider_attached": service.has_provider(),
                        "status": state.status.to_string(),
                        "phase": phase,
                        "network": config.network.to_string(),
                        "chain_id": config.network.chain_id(),
                        "api_base": config.api_base,
                        "stake_mode": config.stake_mode.to_string(),
                    })
                    .to_string());
                }
                let wallet = match (address, provider) {
                    (Some(a), Some(p)) => format!("{a} ({p})"),
                    (Some(a), None) => a.to_string(),
                    _ => "(not connected)".to_string(),
                };
                let mut lines = vec![
                    format!("  Wallet:      {wallet}"),
                    format!("  Approval:    {} ({phase})", state.status),
                    format!(
                        "  Network:     {} (chain {})",
                        config.network.display_name(),
                        config.network.chain_id()
                    ),
                    format!("  Backend:     {}", config.api_base),
                    format!("  Stake mode:  {}", config.stake_mode),
                ];
                if address.is_some() && !service.has_provider() {
                    lines.push("  Provider:    not attached (balances unavailable)".to_string());
                }
                Ok(lines.join("\n"))
            }

            Command::Overview => {
                let snapshot = service.snapshot().await;
                let Some(address) = service.address() else {
                    bail!("No wallet connected.");
                };
                if json_output {
                    return Ok(display::format_account_json(
                        &address,
                        &snapshot.account,
                        &snapshot.settings,
                    ));
                }
                let mut out = display::format_overview(
                    &address,
                    snapshot.balances.as_ref(),
                    &snapshot.account,
                    &snapshot.settings,
                    service.native_symbol(),
                    &symbol,
                );
                let pending = snapshot.pending_withdrawals();
                if pending > 0.0 {
                    out.push_str(&format!(
                        "\n  Pending:    {} {symbol} in withdrawal",
                        display::format_amount(pending)
                    ));
                }
                out.push_str(cached_note(&snapshot));
                Ok(out)
            }

            Command::Balance => {
                let snapshot = service.snapshot().await;
                match snapshot.balances {
                    Some(balances) if json_output => Ok(display::format_balances_json(&balances)),
                    Some(balances) => Ok(display::format_wallet_balances(
                        &balances,
                        service.native_symbol(),
                        &symbol,
                    )),
                    None if !service.has_provider() => bail!(
                        "No wallet provider attached. Reconnect your wallet to read balances."
                    ),
                    None => bail!("Wallet balances unavailable. Try 'refresh'."),
                }
            }

            Command::Stake { amount } => {
                let message = service.stake(*amount, progress).await?;
                if json_output {
                    Ok(serde_json::json!({
                        "action": "stake",
                        "amount": amount,
                        "message": message,
                    })
                    .to_string())
                } else {
                    Ok(message)
                }
            }

            Command::Unstake { amount } => {
                let message = service.unstake(*amount).await?;
                if json_output {
                    Ok(serde_json::json!({
                        "action": "unstake",
                        "amount": amount,
                        "message": message,
                    })
                    .to_string())
                } else {
                    Ok(message)
                }
            }

            Command::Claim => {
                let message = service.claim().await?;
                if json_output {
                    Ok(serde_json::json!({ "action": "claim", "message": message }).to_string())
                } else {
                    Ok(message)
                }
            }

            Command::Withdraw { amount } => {
                let quote = service.withdrawal_quote(*amount).await;
                let message = service.withdraw(*amount).await?;
                if json_output {
                    Ok(serde_json::json!({
                        "action": "withdraw",
                        "amount": quote.amount,
                        "fee_percent": quote.fee_percent,
                        "fee": quote.fee,
                        "receive": quote.receive,
                        "message": message,
                    })
                    .to_string())
                } else {
                    Ok(format!(
                        "{message}\n{}",
                        display::format_withdrawal_quote(&quote, &symbol)
                    ))
                }
            }

            Command::Withdrawals => {
                let snapshot = service.snapshot().await;
                if json_output {
                    Ok(serde_json::to_string_pretty(&snapshot.withdrawals)?)
                } else {
                    let mut out = display::format_withdrawals(&snapshot.withdrawals, &symbol);
                    out.push_str(&format!(
                        "\n  Available for withdrawal: {} {symbol}",
                        display::format_amount(snapshot.available_for_withdrawal())
                    ));
                    Ok(out)
                }
            }

            Command::Transactions { limit } => {
                let snapshot = service.snapshot().await;
                let count = limit.unwrap_or(snapshot.transactions.len());
                let txs = &snapshot.transactions[..count.min(snapshot.transactions.len())];
                if json_output {
                    Ok(serde_json::to_string_pretty(txs)?)
                } else if txs.is_empty() {
                    Ok(format!("No transactions yet. Start by staking some {symbol}!"))
                } else {
                    Ok(display::format_transactions(txs, &symbol))
                }
            }

            Command::Earnings => {
                let snapshot = service.snapshot().await;
                let projection = snapshot.projection();
                if json_output {
                    Ok(serde_json::json!({
                        "apy": projection.apy,
                        "daily_rate": projection.daily_rate,
                        "daily": projection.daily,
                        "weekly": projection.weekly,
                        "monthly": projection.monthly,
                        "total_earned": snapshot.account.total_earned,
                        "claimable_rewards": snapshot.account.claimable_rewards,
                    })
                    .to_string())
                } else {
                    let mut out = display::format_earnings(
                        &projection,
                        snapshot.account.total_earned,
                        &symbol,
                    );
                    out.push_str(&format!(
                        "\n  Claimable:   {} {symbol}",
                        display::format_amount(snapshot.account.claimable_rewards)
                    ));
                    Ok(out)
                }
            }

            Command::Vip => {
                let snapshot = service.snapshot().await;
                let account = &snapshot.account;
                if json_output {
                    let progress = vip::progress_to_next(account.vip_level, account.staked_amount);
                    Ok(serde_json::json!({
                        "level": account.vip_level,
                        "name": vip::tier_name(account.vip_level),
                        "apy": snapshot.effective_apy(),
                        "next": progress.as_ref().map(|p| p.next.name),
                        "progress_percent": progress.as_ref().map(|p| p.percent),
                        "remaining": progress.as_ref().map(|p| p.remaining),
                    })
                    .to_string())
                } else {
                    Ok(display::format_vip(account, &snapshot.settings, &symbol))
                }
            }

            Command::Settings => {
                let snapshot = service.snapshot().await;
                if json_output {
                    Ok(serde_json::to_string_pretty(&snapshot.settings)?)
                } else {
                    Ok(display::format_settings(&snapshot.settings))
                }
            }

            Command::Refresh => {
                let snapshot = service.load().await?;
                if json_output {
                    Ok(serde_json::json!({ "verified": snapshot.is_verified() }).to_string())
                } else if snapshot.is_verified() {
                    Ok("Dashboard refreshed.".to_string())
                } else {
                    Ok("Backend unreachable. Showing cached data.".to_string())
                }
            }

            Command::Help { command } => Ok(help_text(command.as_deref())),

            Command::Exit => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::backend::{EntryStatus, Transaction, UserAccount};
    use crate::config::{DashboardConfig, StakeMode};
    use crate::provider::{Address, ProviderKind};
    use crate::session::SessionStore;

    fn addr() -> Address {
        "0x00000000000000000000000000000000000000aa".parse().unwrap()
    }

    fn quiet(_: StakeProgress) {}

    fn service_with(
        status: ApprovalStatus,
    ) -> (tempfile::TempDir, Arc<MockBackend>, DashboardService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = SessionStore::open_at(path.clone()).unwrap();
        store.save_connection(&addr(), ProviderKind::MetaMask).unwrap();
        store.set_approval(status).unwrap();

        let mock = Arc::new(MockBackend::default());
        *mock.account.lock().unwrap() = UserAccount {
            staked_amount: 1_500.0,
            total_earned: 30.0,
            vip_level: 1,
            claimable_rewards: 5.0,
        };
        let config = DashboardConfig {
            stake_mode: StakeMode::BackendOnly,
            ..DashboardConfig::default()
        };
        let service =
            DashboardService::new(config, mock.clone(), SessionStore::open_at(path).unwrap());
        (dir, mock, service)
    }

    #[tokio::test]
    async fn views_require_a_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        let service = DashboardService::new(
            DashboardConfig::default(),
            Arc::new(MockBackend::default()),
            session,
        );
        let err = Command::Overview.execute(&service, false, &quiet).await.unwrap_err();
        assert!(err.to_string().contains("No wallet connected"));

        let status = Command::Status.execute(&service, false, &quiet).await.unwrap();
        assert!(status.contains("(not connected)"));
    }

    #[tokio::test]
    async fn pending_wallet_cannot_stake() {
        let (_dir, _mock, service) = service_with(ApprovalStatus::Pending);
        service.restore().await.unwrap();
        let err = Command::Stake { amount: 200.0 }
            .execute(&service, false, &quiet)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("pending approval"));
    }

    #[tokio::test]
    async fn overview_after_refresh() {
        let (_dir, _mock, service) = service_with(ApprovalStatus::Approved);
        service.restore().await.unwrap();
        let out = Command::Refresh.execute(&service, false, &quiet).await.unwrap();
        assert_eq!(out, "Dashboard refreshed.");

        let out = Command::Overview.execute(&service, false, &quiet).await.unwrap();
        assert!(out.contains("1,500.00 USDT"));
        assert!(out.contains("VIP 1"));
        assert!(!out.contains("offline"));

        let json = Command::Overview.execute(&service, true, &quiet).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vip_level"], 1);
    }

    #[tokio::test]
    async fn empty_ledger_message() {
        let (_dir, _mock, service) = service_with(ApprovalStatus::Approved);
        service.restore().await.unwrap();
        service.load().await.unwrap();
        let out = Command::Transactions { limit: None }
            .execute(&service, false, &quiet)
            .await
            .unwrap();
        assert_eq!(out, "No transactions yet. Start by staking some USDT!");
    }

    #[tokio::test]
    async fn transactions_limit_keeps_most_recent() {
        let (_dir, mock, service) = service_with(ApprovalStatus::Approved);
        // The backend lists the newest entry first.
        *mock.transactions.lock().unwrap() = (0..4)
            .map(|i| Transaction {
                id: Some(i.to_string()),
                kind: "stake".into(),
                amount: 100.0 * (i + 1) as f64,
                date: "2024-05-01".into(),
                status: EntryStatus::Completed,
            })
            .collect();
        service.restore().await.unwrap();
        service.load().await.unwrap();
        let json = Command::Transactions { limit: Some(2) }
            .execute(&service, true, &quiet)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let ids: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|tx| tx["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["0", "1"]);
    }

    #[tokio::test]
    async fn claim_reports_amount() {
        let (_dir, _mock, service) = service_with(ApprovalStatus::Approved);
        service.restore().await.unwrap();
        service.load().await.unwrap();
        let out = Command::Claim.execute(&service, false, &quiet).await.unwrap();
        assert_eq!(out, "Successfully claimed 5 USDT!");
    }

    #[tokio::test]
    async fn withdraw_shows_fee_breakdown() {
        let (_dir, _mock, service) = service_with(ApprovalStatus::Approved);
        service.restore().await.unwrap();
        service.load().await.unwrap();
        let out = Command::Withdraw { amount: 100.0 }
            .execute(&service, false, &quiet)
            .await
            .unwrap();
        assert!(out.contains("Fee:     2.00 USDT"));
        assert!(out.contains("Receive: 98.00 USDT"));
    }
}
