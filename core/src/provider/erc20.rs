//! The ERC-20 calls the dashboard makes on the token contract.

use alloy_sol_types::{sol, SolCall};

use super::{Address, WalletProvider, U256};
use crate::error::{DashboardError, Result};

sol! {
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256 balance);
        function decimals() external view returns (uint8 value);
        function transfer(address to, uint256 amount) external returns (bool success);
    }
}

fn abi_error(call: &str, err: alloy_sol_types::Error) -> DashboardError {
    DashboardError::Provider(format!("Invalid {call} response: {err}"))
}

pub fn encode_balance_of(owner: &Address) -> Vec<u8> {
    IERC20::balanceOfCall { owner: *owner }.abi_encode()
}

pub fn encode_transfer(to: &Address, amount: U256) -> Vec<u8> {
    IERC20::transferCall { to: *to, amount }.abi_encode()
}

pub fn decode_balance(data: &[u8]) -> Result<U256> {
    IERC20::balanceOfCall::abi_decode_returns(data, true)
        .map(|r| r.balance)
        .map_err(|e| abi_error("balanceOf", e))
}

pub fn decode_decimals(data: &[u8]) -> Result<u8> {
    IERC20::decimalsCall::abi_decode_returns(data, true)
        .map(|r| r.value)
        .map_err(|e| abi_error("decimals", e))
}

pub async fn balance_of(
    provider: &dyn WalletProvider,
    token: &Address,
    owner: &Address,
) -> Result<U256> {
    let raw = provider.call(token, &encode_balance_of(owner)).await?;
    decode_balance(&raw)
}

pub async fn decimals(provider: &dyn WalletProvider, token: &Address) -> Result<u8> {
    let raw = provider
        .call(token, &IERC20::decimalsCall {}.abi_encode())
        .await?;
    decode_decimals(&raw)
}

/// Ask the wallet to send `amount` base units of `token` from `from` to `to`.
pub async fn transfer(
    provider: &dyn WalletProvider,
    from: &Address,
    token: &Address,
    to: &Address,
    amount: U256,
) -> Result<String> {
    provider
        .send_transaction(from, token, &encode_transfer(to, amount))
        .await
}

#[cfg(test)]
mod tests {
    use alloy_primitives::hex;

    use super::*;

    #[test]
    fn transfer_calldata_layout() {
        let to = Address::with_last_byte(0xaa);
        let data = encode_transfer(&to, U256::from(100_000_000u64));
        assert_eq!(data.len(), 68);
        assert_eq!(
            hex::encode(&data),
            "a9059cbb\
             00000000000000000000000000000000000000000000000000000000000000aa\
             0000000000000000000000000000000000000000000000000000000005f5e100"
        );
    }

    #[test]
    fn balance_of_calldata() {
        let owner = Address::repeat_byte(0x11);
        let data = encode_balance_of(&owner);
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(&data[16..], owner.as_slice());
    }

    #[test]
    fn balance_beyond_128_bits_decodes() {
        let big = U256::from(u128::MAX) + U256::from(1u8);
        let word = big.to_be_bytes::<32>();
        assert_eq!(decode_balance(&word).unwrap(), big);
    }

    #[test]
    fn short_responses_are_rejected() {
        assert!(decode_balance(&[0u8; 4]).is_err());
        assert!(decode_decimals(&[]).is_err());
    }

    #[test]
    fn decimals_must_fit_a_byte() {
        assert_eq!(decode_decimals(&U256::from(6u8).to_be_bytes::<32>()).unwrap(), 6);
        assert!(decode_decimals(&U256::from(300u16).to_be_bytes::<32>()).is_err());
    }
}
