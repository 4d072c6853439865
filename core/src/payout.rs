//! Payout recipient rewiring
//!
//! Points a token's creator rewards at the campaign split. Clanker tokens
//! route rewards through their LP locker; Zora coins store the payout
//! recipient on the coin itself.

use std::sync::{Arc, OnceLock};

use ethers::abi::Token;
use ethers::types::{Address, H256, U256};
use thiserror::Error;

use crate::chain::{ChainError, ChainWriter, ContractAbi, ContractCall};

const UPDATE_CREATOR_REWARD_RECIPIENT: &str = "updateCreatorRewardRecipient";
const SET_PAYOUT_RECIPIENT: &str = "setPayoutRecipient";

fn locker_abi() -> Result<&'static ContractAbi, ChainError> {
    static ABI: OnceLock<Result<ContractAbi, ChainError>> = OnceLock::new();
    ContractAbi::cached(
        &ABI,
        &["function updateCreatorRewardRecipient(uint256 tokenId, address recipient)"],
    )
}

fn coin_abi() -> Result<&'static ContractAbi, ChainError> {
    static ABI: OnceLock<Result<ContractAbi, ChainError>> = OnceLock::new();
    ContractAbi::cached(&ABI, &["function setPayoutRecipient(address newPayoutRecipient)"])
}

/// Payout errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayoutError {
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error("Invalid token ID: {0:?}")]
    InvalidTokenId(String),
    #[error("Invalid {field} address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("Transaction would fail: {0}")]
    Simulation(ChainError),
    #[error("Failed to update payout recipient: {0}")]
    Chain(#[from] ChainError),
}

fn parse_strict_address(field: &'static str, value: &str) -> Result<Address, PayoutError> {
    let invalid = || PayoutError::InvalidAddress {
        field,
        value: value.to_string(),
    };
    let hex = value.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    value.parse().map_err(|_| invalid())
}

fn parse_token_id(value: &str) -> Result<U256, PayoutError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(PayoutError::InvalidTokenId(value.to_string()));
    }
    U256::from_dec_str(value).map_err(|_| PayoutError::InvalidTokenId(value.to_string()))
}

/// Simulate from the signer, then send and wait for a successful receipt
async fn simulate_and_send(writer: &dyn ChainWriter, call: ContractCall) -> Result<H256, PayoutError> {
    writer.simulate(&call).await.map_err(PayoutError::Simulation)?;
    let hash = writer.send(&call).await?;
    Ok(hash)
}

/// Redirects Clanker creator rewards via the LP locker
pub struct ClankerPayoutRewirer {
    writer: Option<Arc<dyn ChainWriter>>,
}

impl ClankerPayoutRewirer {
    pub fn new(writer: Option<Arc<dyn ChainWriter>>) -> Self {
        Self { writer }
    }

    /// Make `split` the reward recipient of `token_id` on `lp_locker`
    pub async fn rewire(&self, token_id: &str, lp_locker: &str, split: &str) -> Result<H256, PayoutError> {
        let token_id = parse_token_id(token_id)?;
        let locker = parse_strict_address("LP locker", lp_locker)?;
        let split = parse_strict_address("split", split)?;
        let writer = self.writer.as_ref().ok_or(PayoutError::WalletNotConnected)?;

        tracing::info!(
            "Updating creator reward recipient of token {} on {:?} to {:?}",
            token_id,
            locker,
            split
        );
        let data = locker_abi()?.encode(
            UPDATE_CREATOR_REWARD_RECIPIENT,
            &[Token::Uint(token_id), Token::Address(split)],
        )?;
        let hash = simulate_and_send(writer.as_ref(), ContractCall::new(locker, data)).await?;

        tracing::info!("Creator reward recipient updated: {:?}", hash);
        Ok(hash)
    }
}

/// Redirects Zora coin payouts on the coin contract
pub struct ZoraPayoutRewirer {
    writer: Option<Arc<dyn ChainWriter>>,
}

impl ZoraPayoutRewirer {
    pub fn new(writer: Option<Arc<dyn ChainWriter>>) -> Self {
        Self { writer }
    }

    /// Make `split` the payout recipient of `coin`
    pub async fn rewire(&self, coin: &str, split: &str) -> Result<H256, PayoutError> {
        let coin = parse_strict_address("coin", coin)?;
        let split = parse_strict_address("split", split)?;
        let writer = self.writer.as_ref().ok_or(PayoutError::WalletNotConnected)?;

        tracing::info!("Setting payout recipient of {:?} to {:?}", coin, split);
        let data = coin_abi()?.encode(SET_PAYOUT_RECIPIENT, &[Token::Address(split)])?;
        let hash = simulate_and_send(writer.as_ref(), ContractCall::new(coin, data)).await?;

        tracing::info!("Payout recipient updated: {:?}", hash);
        Ok(hash)
    }
}
