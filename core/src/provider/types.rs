pub use alloy_primitives::{Address, U256};

use alloy_primitives::hex;

/// Lowercase `0x` hex form of an address. Wallets hand accounts out in this
/// form and the backend keys users by it, so every wire and storage path
/// uses it. `Display` (EIP-55 checksum) is for humans only.
pub fn address_hex(address: &Address) -> String {
    hex::encode_prefixed(address)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    /// `false` when the transaction was mined but reverted.
    pub success: bool,
    pub block_number: u64,
}

/// Balances read from the wallet, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalletBalances {
    pub native: U256,
    pub token: U256,
    pub token_decimals: u8,
}

/// Parse a JSON-RPC hex quantity (`0x1a`). `0x` alone is zero.
pub fn parse_quantity(s: &str) -> Result<U256, String> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| format!("Invalid hex quantity '{s}'"))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|_| format!("Invalid hex quantity '{s}'"))
}
