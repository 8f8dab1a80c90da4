mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use cryptowave_core::actions::StakeProgress;
use cryptowave_core::commands::Command;
use cryptowave_core::config::{DashboardConfig, Network, ProviderEndpoints, StakeMode, TokenConfig};
use cryptowave_core::{Address, DashboardService};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cryptowave", about = "CRYPTOWAVE staking dashboard REPL", version)]
pub(crate) struct Cli {
    /// Backend base URL
    #[arg(long, env = "CRYPTOWAVE_API_URL")]
    api_url: Option<String>,

    /// JSON-RPC endpoint of a local MetaMask-compatible provider
    #[arg(long, env = "CRYPTOWAVE_METAMASK_RPC")]
    metamask_rpc: Option<String>,

    /// JSON-RPC endpoint of a local Coinbase Wallet provider
    #[arg(long, env = "CRYPTOWAVE_COINBASE_RPC")]
    coinbase_rpc: Option<String>,

    /// JSON-RPC endpoint of a local Trust Wallet provider
    #[arg(long, env = "CRYPTOWAVE_TRUST_RPC")]
    trust_rpc: Option<String>,

    /// Staking token contract address (default: USDT on Ethereum)
    #[arg(long)]
    token: Option<String>,

    /// Network: ethereum, polygon or bsc
    #[arg(long, default_value = "ethereum")]
    network: Network,

    /// How stakes reach the platform: on-chain or backend
    #[arg(long, default_value = "on-chain")]
    stake_mode: StakeMode,

    /// Directory for the session file and offline cache
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Run a single command and exit
    #[arg(long)]
    cmd: Option<String>,

    /// Output in JSON format (useful with --cmd)
    #[arg(long)]
    json: bool,

    /// Allow connecting to non-HTTPS URLs
    #[arg(long)]
    insecure: bool,
}

impl Cli {
    fn dashboard_config(&self) -> Result<DashboardConfig> {
        let mut token = TokenConfig::default();
        if let Some(contract) = &self.token {
            token.contract = contract
                .parse::<Address>()
                .map_err(|e| anyhow!("Invalid --token: {e}"))?;
        }
        let config = DashboardConfig {
            allow_insecure: self.insecure,
            network: self.network,
            token,
            providers: ProviderEndpoints {
                metamask: self.metamask_rpc.clone(),
                coinbase: self.coinbase_rpc.clone(),
                trust: self.trust_rpc.clone(),
            },
            stake_mode: self.stake_mode,
            ..DashboardConfig::default()
        };
        Ok(config.with_api_base(&DashboardConfig::resolve_api_base(self.api_url.as_deref())))
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints stake pipeline steps as they happen.
pub(crate) fn print_progress(symbol: &str) -> impl Fn(StakeProgress) + Send + Sync + '_ {
    move |step| eprintln!("{}", step.message(symbol))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.dashboard_config()?;
    let service = Arc::new(DashboardService::from_config(config, cli.data_dir.as_deref())?);

    if let Some(cmd_str) = &cli.cmd {
        // One-shot mode
        run_oneshot(&cli, &service, cmd_str).await
    } else {
        // REPL mode
        repl::run_repl(&cli, service).await
    }
}

async fn run_oneshot(cli: &Cli, service: &DashboardService, cmd_str: &str) -> Result<()> {
    let command = Command::parse(cmd_str)?;
    if command == Command::Exit {
        return Ok(());
    }

    if service.restore().await.is_some() {
        service.check_approval().await?;
        // Refresh does its own load.
        if command.requires_approval()
            && command != Command::Refresh
            && service.approval().is_approved()
        {
            service.load().await?;
        }
    }

    let progress = print_progress(service.symbol());
    let output = command.execute(service, cli.json, &progress).await?;
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
