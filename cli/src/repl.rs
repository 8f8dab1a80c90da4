use crate::{print_progress, Cli};
/// REPL shell: Reedline-based interactive dashboard session.
use anyhow::Result;
use cryptowave_core::actions::StakeProgress;
use cryptowave_core::commands::Command;
use cryptowave_core::display;
use cryptowave_core::DashboardService;
use reedline::{DefaultCompleter, DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub async fn run_repl(cli: &Cli, service: Arc<DashboardService>) -> Result<()> {
    let config = service.config();
    println!("CRYPTOWAVE v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Network: {} | Backend: {}",
        config.network.display_name(),
        config.api_base
    );
    println!();

    match service.restore().await {
        Some(_) => {
            service.check_approval().await?;
            if service.approval().is_approved() {
                open_dashboard(&service).await;
            } else {
                pending_screen(&service).await;
            }
        }
        None => {
            println!("No wallet connected.");
            println!("Use 'connect <metamask|coinbase|trust|walletconnect>' to get started.");
        }
    }
    println!("Type 'help' for a list of commands.");
    println!();

    let refresher = spawn_balance_refresh(Arc::clone(&service));

    let mut prompt = build_prompt(&service);

    let commands: Vec<String> = vec![
        "connect".into(),
        "metamask".into(),
        "coinbase".into(),
        "trust".into(),
        "walletconnect".into(),
        "disconnect".into(),
        "status".into(),
        "overview".into(),
        "balance".into(),
        "bal".into(),
        "stake".into(),
        "unstake".into(),
        "claim".into(),
        "withdraw".into(),
        "withdrawals".into(),
        "transactions".into(),
        "txs".into(),
        "earnings".into(),
        "vip".into(),
        "settings".into(),
        "refresh".into(),
        "help".into(),
        "exit".into(),
        "quit".into(),
        "q".into(),
    ];
    let completer = Box::new(DefaultCompleter::new(commands));
    let mut line_editor = Reedline::create().with_completer(completer);

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match Command::parse(line) {
                    Ok(Command::Exit) => {
                        println!("Goodbye.");
                        break;
                    }
                    Ok(cmd) => {
                        let quote = match &cmd {
                            Command::Withdraw { amount } => {
                                Some(service.withdrawal_quote(*amount).await)
                            }
                            _ => None,
                        };
                        if let Some(prompt_msg) =
                            cmd.confirmation_prompt(service.symbol(), quote.as_ref())
                        {
                            if !prompt_confirm(&prompt_msg) {
                                println!("Cancelled.");
                                continue;
                            }
                        }

                        let progress = print_progress(service.symbol());
                        match cmd.execute(&service, cli.json, &progress).await {
                            Ok(output) => {
                                if !output.is_empty() {
                                    println!("{output}");
                                }
                            }
                            Err(e) => {
                                eprintln!("Error: {e}");
                            }
                        }

                        if matches!(cmd, Command::Connect { .. } | Command::Disconnect) {
                            prompt = build_prompt(&service);
                        }
                        if matches!(cmd, Command::Connect { .. })
                            && service.approval().is_pending()
                        {
                            pending_screen(&service).await;
                        }
                    }
                    Err(e) => {
                        eprintln!("{e}");
                    }
                }
            }
            Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                println!("Goodbye.");
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }
    }

    refresher.abort();
    Ok(())
}

fn build_prompt(service: &DashboardService) -> DefaultPrompt {
    let label = match service.address() {
        Some(addr) => format!("[cryptowave {}]", display::short_address(&addr.to_string())),
        None => "[cryptowave]".to_string(),
    };
    DefaultPrompt::new(DefaultPromptSegment::Basic(label), DefaultPromptSegment::Empty)
}

/// Load the dashboard and print the overview.
async fn open_dashboard(service: &DashboardService) {
    if let Err(e) = service.load().await {
        eprintln!("Error: {e}");
        return;
    }
    if let Some(addr) = service.address() {
        println!("Wallet ready. Address: {addr}");
    }
    let quiet = |_: StakeProgress| {};
    match Command::Overview.execute(service, false, &quiet).await {
        Ok(output) => println!("{output}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}

/// Wait for an administrator to approve the wallet. Ctrl+C returns to the prompt.
async fn pending_screen(service: &DashboardService) {
    let address = service
        .address()
        .map(|a| a.to_string())
        .unwrap_or_default();
    println!("Your wallet is pending approval.");
    println!("  Address: {address}");
    println!("An administrator will review your access request.");
    println!("Waiting for approval (Ctrl+C to stop waiting)...");

    tokio::select! {
        result = service.wait_for_approval() => match result {
            Ok(_) => {
                println!("Access approved!");
                open_dashboard(service).await;
            }
            Err(e) => eprintln!("Error: {e}"),
        },
        _ = tokio::signal::ctrl_c() => {
            println!("Stopped waiting. Use 'status' to check again.");
        }
    }
}

/// Refresh wallet balances in the background while the wallet is approved.
fn spawn_balance_refresh(service: Arc<DashboardService>) -> JoinHandle<()> {
    let period = service.config().balance_refresh_interval;
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if !service.approval().is_approved() || !service.has_provider() {
                continue;
            }
            if let Err(e) = service.refresh_balances().await {
                tracing::debug!("balance refresh failed: {e}");
            }
        }
    })
}

fn prompt_confirm(prompt: &str) -> bool {
    use std::io::Write;
    print!("{prompt} [y/N]: ");
    std::io::stdout().flush().ok();
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).is_ok() && input.trim().eq_ignore_ascii_case("y")
}
