#[must_use]
pub fn help_text(command: Option<&str>) -> String {
    match command {
        Some("connect") => {
            "connect <metamask|coinbase|trust|walletconnect>\n  Connect a wallet and request dashboard access.\n  New wallets wait for approval by an administrator.\n  Short names: mm, cb, wc".to_string()
        }
        Some("disconnect") | Some("logout") => {
            "disconnect\n  Forget the connected wallet and its approval status.\n  Alias: logout".to_string()
        }
        Some("status") => {
            "status\n  Show the connected wallet, approval status, network and backend URL.".to_string()
        }
        Some("overview") | Some("home") => {
            "overview\n  Show wallet balances, staked amount, rewards, VIP level and APY.\n  Alias: home".to_string()
        }
        Some("balance") | Some("bal") => {
            "balance\n  Show the native and token balances of the connected wallet.\n  Alias: bal".to_string()
        }
        Some("stake") | Some("invest") => {
            "stake <amount>\n  Stake tokens. The minimum stake is 100.\n  In on-chain mode the wallet signs a token transfer to the platform wallet first.\n  Example: stake 500\n  Alias: invest".to_string()
        }
        Some("unstake") => {
            "unstake <amount>\n  Reduce the staked amount.\n  Example: unstake 250".to_string()
        }
        Some("claim") => {
            "claim\n  Claim all claimable rewards.".to_string()
        }
        Some("withdraw") => {
            "withdraw <amount>\n  Request a withdrawal of staked funds.\n  A fee is deducted; requests are reviewed before payout.\n  Example: withdraw 1000".to_string()
        }
        Some("withdrawals") => {
            "withdrawals\n  Show withdrawal requests and their status.".to_string()
        }
        Some("transactions") | Some("txs") | Some("history") => {
            "transactions [n]\n  Show the transaction ledger, newest first.\n  Optionally show only the n most recent entries.\n  Aliases: txs, history".to_string()
        }
        Some("earnings") | Some("interest") => {
            "earnings\n  Show APY and the daily, weekly and monthly projection.\n  Alias: interest".to_string()
        }
        Some("vip") => {
            "vip\n  Show VIP tiers, their APY and progress to the next tier.".to_string()
        }
        Some("settings") => {
            "settings\n  Show platform settings: base APY, VIP bonuses and withdrawal fee.".to_string()
        }
        Some("refresh") | Some("reload") => {
            "refresh\n  Reload balances and account data.\n  Alias: reload".to_string()
        }
        Some("exit") | Some("quit") | Some("q") => {
            "exit\n  Exit the dashboard.\n  Aliases: quit, q".to_string()
        }
        Some(other) => format!("Unknown command: '{other}'. Type 'help' for a list."),
        None => {
            "Available commands:\n\
             \n\
             \x20 connect          Connect a wallet provider\n\
             \x20 disconnect       Forget the connected wallet\n\
             \x20 status           Show connection and approval status\n\
             \x20 overview         Show balances, position and rewards\n\
             \x20 balance          Show wallet balances\n\
             \x20 stake            Stake tokens\n\
             \x20 unstake          Unstake tokens\n\
             \x20 claim            Claim rewards\n\
             \x20 withdraw         Request a withdrawal\n\
             \x20 withdrawals      Show withdrawal requests\n\
             \x20 transactions     Show transaction history\n\
             \x20 earnings         Show earnings projection\n\
             \x20 vip              Show VIP tiers\n\
             \x20 settings         Show platform settings\n\
             \x20 refresh          Reload data\n\
             \x20 help [cmd]       Show help for a command\n\
             \x20 exit             Exit the dashboard\n\
             \n\
             Type 'help <command>' for detailed help on a specific command."
                .to_string()
        }
    }
}
