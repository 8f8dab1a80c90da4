use anyhow::{anyhow, bail, Result};

use super::Command;
use crate::display;
use crate::provider::ProviderKind;

/// Parse a positive decimal amount. Only digits, `.` and `,` separators are accepted.
fn parse_positive_amount(input: &str, usage: &str) -> Result<f64> {
    let valid = input.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        && input.chars().any(|c| c.is_ascii_digit());
    if !valid {
        bail!("Invalid amount '{input}'. Usage: {usage}");
    }
    let amount = display::parse_amount(input).map_err(|e| anyhow!("{e}. Usage: {usage}"))?;
    if amount <= 0.0 {
        bail!("Amount must be greater than zero. Usage: {usage}");
    }
    Ok(amount)
}

impl Command {
    /// Parse a command from a raw input string.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("No command entered. Type 'help' for a list of commands.");
        }

        let mut parts = input.splitn(2, char::is_whitespace);
        let cmd = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

        match cmd.as_str() {
            "connect" => {
                let name = arg.ok_or_else(|| {
                    anyhow!("Missing provider. Usage: connect <metamask|coinbase|trust|walletconnect>")
                })?;
                let provider: ProviderKind = name.parse().map_err(|e: String| anyhow!(e))?;
                Ok(Command::Connect { provider })
            }

            "disconnect" | "logout" => Ok(Command::Disconnect),

            "status" => Ok(Command::Status),

            "overview" | "home" => Ok(Command::Overview),

            "balance" | "bal" => Ok(Command::Balance),

            "stake" | "invest" => {
                let usage = "stake <amount>";
                let amount = arg.ok_or_else(|| anyhow!("Missing amount. Usage: {usage}"))?;
                Ok(Command::Stake {
                    amount: parse_positive_amount(amount, usage)?,
                })
            }

            "unstake" => {
                let usage = "unstake <amount>";
                let amount = arg.ok_or_else(|| anyhow!("Missing amount. Usage: {usage}"))?;
                Ok(Command::Unstake {
                    amount: parse_positive_amount(amount, usage)?,
                })
            }

            "claim" => Ok(Command::Claim),

            "withdraw" => {
                let usage = "withdraw <amount>";
                let amount = arg.ok_or_else(|| anyhow!("Missing amount. Usage: {usage}"))?;
                Ok(Command::Withdraw {
                    amount: parse_positive_amount(amount, usage)?,
                })
            }

            "withdrawals" => Ok(Command::Withdrawals),

            "transactions" | "txs" | "history" => {
                let limit = match arg {
                    Some(n) => match n.parse::<usize>() {
                        Ok(0) | Err(_) => {
                            bail!("Invalid count '{n}'. Usage: transactions [n]")
                        }
                        Ok(n) => Some(n),
                    },
                    None => None,
                };
                Ok(Command::Transactions { limit })
            }

            "earnings" | "interest" => Ok(Command::Earnings),

            "vip" => Ok(Command::Vip),

            "settings" => Ok(Command::Settings),

            "refresh" | "reload" => Ok(Command::Refresh),

            "help" | "?" => Ok(Command::Help {
                command: arg.map(|s| s.to_lowercase()),
            }),

            "exit" | "quit" | "q" => Ok(Command::Exit),

            other => bail!("Unknown command: '{other}'. Type 'help' for a list of commands."),
        }
    }
}
