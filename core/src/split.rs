//! Revenue split deployment
//!
//! Every campaign routes token rewards through a two-party pull split on
//! the 0xSplits v2 factory, shared between the protocol and the creator's
//! wallet. The salt is derived from the rewarded contract (coin or LP
//! locker), so repeated submissions for it reuse the same split.

use std::sync::{Arc, OnceLock};

use ethers::abi::Token;
use ethers::types::{Address, H256, U256};
use ethers::utils::to_checksum;
use thiserror::Error;

use crate::chain::{ChainError, ChainWriter, ContractAbi, ContractCall};

/// Allocation units equal to 100%
pub const PERCENTAGE_SCALE: u64 = 1_000_000;

const PREDICT: &str = "predictDeterministicAddress";
const CREATE: &str = "createSplitDeterministic";

pub(crate) fn split_factory_abi() -> Result<&'static ContractAbi, ChainError> {
    static ABI: OnceLock<Result<ContractAbi, ChainError>> = OnceLock::new();
    ContractAbi::cached(
        &ABI,
        &[
            "struct Split { address[] recipients; uint256[] allocations; uint256 totalAllocation; uint16 distributionIncentive; }",
            "function predictDeterministicAddress(Split splitParams, address owner, bytes32 salt) view returns (address)",
            "function createSplitDeterministic(Split splitParams, address owner, address creator, bytes32 salt) returns (address)",
        ],
    )
}

/// Split errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error("budget percentage must be between 1 and 100, got {0}")]
    InvalidBudget(u8),
    #[error("split configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Split recipients and allocations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitParams {
    pub recipients: Vec<Address>,
    pub allocations: Vec<U256>,
    pub total_allocation: U256,
    pub distribution_incentive: u16,
}

impl SplitParams {
    /// Protocol takes `budget`%, the creator side keeps the rest
    pub fn two_party(protocol: Address, creator: Address, budget: u8) -> Result<Self, SplitError> {
        if budget == 0 || budget > 100 {
            return Err(SplitError::InvalidBudget(budget));
        }
        if protocol == creator {
            return Err(SplitError::Config(
                "protocol and creator must be different addresses".into(),
            ));
        }

        let unit = PERCENTAGE_SCALE / 100;
        let protocol_share = u64::from(budget) * unit;
        Ok(Self {
            recipients: vec![protocol, creator],
            allocations: vec![
                U256::from(protocol_share),
                U256::from(PERCENTAGE_SCALE - protocol_share),
            ],
            total_allocation: U256::from(PERCENTAGE_SCALE),
            distribution_incentive: 0,
        })
    }

    fn to_token(&self) -> Token {
        Token::Tuple(vec![
            Token::Array(self.recipients.iter().copied().map(Token::Address).collect()),
            Token::Array(self.allocations.iter().copied().map(Token::Uint).collect()),
            Token::Uint(self.total_allocation),
            Token::Uint(U256::from(self.distribution_incentive)),
        ])
    }
}

/// Salt for a recipient: the address left-padded to 32 bytes
pub fn salt_for(recipient: Address) -> H256 {
    H256::from(recipient)
}

/// Creates or reuses deterministic splits
pub struct SplitBuilder {
    writer: Option<Arc<dyn ChainWriter>>,
    factory: Address,
    protocol: Address,
}

impl SplitBuilder {
    /// `writer` is `None` when no signing wallet is connected
    pub fn new(writer: Option<Arc<dyn ChainWriter>>, factory: Address, protocol: Address) -> Self {
        Self {
            writer,
            factory,
            protocol,
        }
    }

    /// Address the split for `recipient` lives at, deployed or not
    pub async fn predict(&self, params: &SplitParams, recipient: Address) -> Result<Address, SplitError> {
        let writer = self.writer.as_ref().ok_or(SplitError::WalletNotConnected)?;
        let abi = split_factory_abi()?;

        let data = abi.encode(
            PREDICT,
            &[
                params.to_token(),
                Token::Address(self.protocol),
                Token::FixedBytes(salt_for(recipient).as_bytes().to_vec()),
            ],
        )?;
        let output = writer.call(&ContractCall::new(self.factory, data)).await?;
        abi.decode(PREDICT, &output)?
            .into_iter()
            .next()
            .and_then(Token::into_address)
            .ok_or_else(|| ChainError::Abi("predictDeterministicAddress returned no address".into()).into())
    }

    /// Create the split salted by `recipient` unless it already exists.
    ///
    /// The protocol receives `budget`% and the connected wallet the rest.
    /// Returns the split address either way.
    pub async fn create_split(&self, budget: u8, recipient: Address) -> Result<Address, SplitError> {
        let writer = self.writer.as_ref().ok_or(SplitError::WalletNotConnected)?;
        let params = SplitParams::two_party(self.protocol, writer.account(), budget)?;

        let predicted = self.predict(&params, recipient).await?;
        tracing::info!(
            "Split predicted at {} for {}",
            to_checksum(&predicted, None),
            to_checksum(&recipient, None)
        );

        if !writer.code_at(predicted).await?.is_empty() {
            tracing::info!("Split already deployed, reusing");
            return Ok(predicted);
        }

        let data = split_factory_abi()?.encode(
            CREATE,
            &[
                params.to_token(),
                Token::Address(self.protocol),
                Token::Address(self.protocol),
                Token::FixedBytes(salt_for(recipient).as_bytes().to_vec()),
            ],
        )?;
        let hash = writer.send(&ContractCall::new(self.factory, data)).await?;
        tracing::info!("Split deployed in {:?}", hash);

        Ok(predicted)
    }
}
