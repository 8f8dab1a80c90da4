/// Command definitions and parsing for the dashboard REPL and one-shot mode.
mod execute;
mod help;
mod parse;

pub use help::help_text;

use crate::display;
use crate::provider::ProviderKind;
use crate::rewards::WithdrawalQuote;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Connect a wallet provider: connect <metamask|coinbase|trust|walletconnect>
    Connect { provider: ProviderKind },
    /// Forget the connected wallet
    Disconnect,
    /// Show connection and approval status
    Status,
    /// Show balances, position and rewards
    Overview,
    /// Show wallet balances
    Balance,
    /// Stake tokens: stake <amount>
    Stake { amount: f64 },
    /// Unstake tokens: unstake <amount>
    Unstake { amount: f64 },
    /// Claim all claimable rewards
    Claim,
    /// Request a withdrawal: withdraw <amount>
    Withdraw { amount: f64 },
    /// Show withdrawal requests
    Withdrawals,
    /// Show the transaction ledger: transactions [n]
    Transactions { limit: Option<usize> },
    /// Show earnings projection
    Earnings,
    /// Show VIP tiers and progress
    Vip,
    /// Show platform settings
    Settings,
    /// Reload everything from the wallet and the backend
    Refresh,
    /// Print help
    Help { command: Option<String> },
    /// Exit the dashboard
    Exit,
}

impl Command {
    /// Whether the command changes the staking position.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Stake { .. } | Command::Unstake { .. } | Command::Claim | Command::Withdraw { .. }
        )
    }

    /// Commands that only make sense once the wallet is approved.
    pub fn requires_approval(&self) -> bool {
        !matches!(
            self,
            Command::Connect { .. }
                | Command::Disconnect
                | Command::Status
                | Command::Help { .. }
                | Command::Exit
        )
    }

    /// Returns a confirmation prompt if this command should ask before executing.
    /// Withdrawals show the fee breakdown when a `quote` is supplied.
    pub fn confirmation_prompt(
        &self,
        symbol: &str,
        quote: Option<&WithdrawalQuote>,
    ) -> Option<String> {
        match self {
            Command::Stake { amount } => Some(format!(
                "Stake {} {symbol}?",
                display::format_amount(*amount)
            )),
            Command::Unstake { amount } => Some(format!(
                "Unstake {} {symbol}?",
                display::format_amount(*amount)
            )),
            Command::Claim => Some("Claim all rewards?".to_string()),
            Command::Withdraw { amount } => Some(match quote {
                Some(q) => format!(
                    "Withdraw {} {symbol}? Fee {} {symbol}, you receive {} {symbol}.",
                    display::format_amount(q.amount),
                    display::format_amount(q.fee),
                    display::format_amount(q.receive),
                ),
                None => format!("Withdraw {} {symbol}?", display::format_amount(*amount)),
            }),
            Command::Disconnect => Some("Disconnect wallet?".to_string()),
            _ => None,
        }
    }
}
