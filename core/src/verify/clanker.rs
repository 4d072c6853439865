//! Clanker verification
//!
//! A wallet owns a Clanker token if the factory lists it among the tokens
//! that wallet deployed.

use std::sync::{Arc, OnceLock};

use ethers::abi::Token;
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::VerificationKind;
use crate::chain::{ChainError, ChainReader, ContractAbi, ContractCall};

const GET_TOKENS: &str = "getTokensDeployedByUser";

pub(crate) fn factory_abi() -> Result<&'static ContractAbi, ChainError> {
    static ABI: OnceLock<Result<ContractAbi, ChainError>> = OnceLock::new();
    ContractAbi::cached(
        &ABI,
        &[
            "struct DeployedToken { address tokenAddress; uint256 tokenId; address lpLockerAddress; }",
            "function getTokensDeployedByUser(address user) view returns (DeployedToken[])",
        ],
    )
}

/// Verified Clanker token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClankerTokenDetails {
    /// Decimal token id
    pub token_id: String,
    pub address: Address,
    /// Currently receives creator rewards
    pub lp_locker_address: Address,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Clanker verification failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClankerVerificationError {
    #[error("You are not the creator of this token. Only the token creator can create a campaign.")]
    NotOwner,
    #[error("Invalid token address: {0}")]
    InvalidId(String),
    #[error("Network error: {0}")]
    Network(String),
}

impl ClankerVerificationError {
    pub fn kind(&self) -> VerificationKind {
        match self {
            ClankerVerificationError::NotOwner => VerificationKind::NotOwner,
            ClankerVerificationError::InvalidId(_) => VerificationKind::InvalidId,
            ClankerVerificationError::Network(_) => VerificationKind::NetworkError,
        }
    }
}

/// Entry of the factory's deployed-token list
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeployedToken {
    token: Address,
    token_id: U256,
    lp_locker: Address,
}

fn decode_deployed(tokens: Vec<Token>) -> Option<Vec<DeployedToken>> {
    let list = tokens.into_iter().next()?.into_array()?;
    list.into_iter()
        .map(|entry| {
            let mut fields = entry.into_tuple()?.into_iter();
            Some(DeployedToken {
                token: fields.next()?.into_address()?,
                token_id: fields.next()?.into_uint()?,
                lp_locker: fields.next()?.into_address()?,
            })
        })
        .collect()
}

/// Normalise a pasted address to `0x`-prefixed form and parse it
pub(crate) fn parse_token_address(raw: &str) -> Option<Address> {
    let trimmed = raw.trim();
    let prefixed = if trimmed.starts_with("0x") {
        trimmed.to_string()
    } else {
        format!("0x{}", trimmed)
    };
    prefixed.parse().ok()
}

/// Verifies Clanker token ownership against the factory
pub struct ClankerVerifier {
    reader: Option<Arc<dyn ChainReader>>,
    factory: Address,
}

impl ClankerVerifier {
    /// `reader` is `None` when no chain client is available
    pub fn new(reader: Option<Arc<dyn ChainReader>>, factory: Address) -> Self {
        Self { reader, factory }
    }

    /// Check that `user` deployed `token_address` through the factory
    pub async fn verify(
        &self,
        token_address: &str,
        user: Address,
    ) -> Result<ClankerTokenDetails, ClankerVerificationError> {
        let reader = self.reader.as_ref().ok_or_else(|| {
            ClankerVerificationError::Network("Network connection error. Please try again.".into())
        })?;

        let token = parse_token_address(token_address)
            .ok_or_else(|| ClankerVerificationError::InvalidId(token_address.to_string()))?;

        tracing::info!(
            "Verifying Clanker token {} for {}",
            to_checksum(&token, None),
            to_checksum(&user, None)
        );

        let abi = factory_abi().map_err(|e| ClankerVerificationError::Network(e.to_string()))?;
        let data = abi
            .encode(GET_TOKENS, &[Token::Address(user)])
            .map_err(|e| ClankerVerificationError::Network(e.to_string()))?;
        let output = reader
            .call(&ContractCall::new(self.factory, data))
            .await
            .map_err(|e| ClankerVerificationError::Network(e.to_string()))?;
        let decoded = abi
            .decode(GET_TOKENS, &output)
            .map_err(|e| ClankerVerificationError::Network(e.to_string()))?;
        let deployed = decode_deployed(decoded).ok_or_else(|| {
            ClankerVerificationError::Network("unexpected factory response".into())
        })?;

        tracing::debug!("{} tokens deployed by user", deployed.len());

        // compared as bytes, casing is irrelevant
        let matched = deployed
            .into_iter()
            .find(|t| t.token == token)
            .ok_or(ClankerVerificationError::NotOwner)?;

        tracing::info!(
            "Clanker token verified: id={} locker={}",
            matched.token_id,
            to_checksum(&matched.lp_locker, None)
        );

        Ok(ClankerTokenDetails {
            token_id: matched.token_id.to_string(),
            address: matched.token,
            lp_locker_address: matched.lp_locker,
            name: None,
            symbol: None,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::chain::InMemoryChain;
    use ethers::abi::encode;
    use ethers::types::Bytes;

    pub(crate) fn factory_response(entries: &[(Address, u64, Address)]) -> Bytes {
        let list = entries
            .iter()
            .map(|(token, id, locker)| {
                Token::Tuple(vec![
                    Token::Address(*token),
                    Token::Uint(U256::from(*id)),
                    Token::Address(*locker),
                ])
            })
            .collect();
        Bytes::from(encode(&[Token::Array(list)]))
    }

    fn setup(entries: &[(Address, u64, Address)]) -> (Arc<InMemoryChain>, ClankerVerifier) {
        let factory = Address::repeat_byte(0xfa);
        let chain = Arc::new(InMemoryChain::new(Address::repeat_byte(0xcc)));
        let selector = factory_abi().unwrap().selector(GET_TOKENS).unwrap();
        chain.respond(factory, selector, Ok(factory_response(entries)));
        let verifier = ClankerVerifier::new(Some(chain.clone() as Arc<dyn ChainReader>), factory);
        (chain, verifier)
    }

    #[test]
    fn test_factory_returns_token_array() {
        let abi = factory_abi().unwrap();
        assert_eq!(
            abi.selector(GET_TOKENS),
            Some(ethers::utils::id("getTokensDeployedByUser(address)"))
        );

        let locker = Address::repeat_byte(0x10);
        let response = factory_response(&[
            (Address::repeat_byte(0x01), 1, locker),
            (Address::repeat_byte(0x02), 2, locker),
        ]);
        let deployed = decode_deployed(abi.decode(GET_TOKENS, &response).unwrap()).unwrap();
        assert_eq!(deployed.len(), 2);
        assert_eq!(deployed[1].token, Address::repeat_byte(0x02));
        assert_eq!(deployed[1].token_id, U256::from(2));
        assert_eq!(deployed[1].lp_locker, locker);
    }

    #[tokio::test]
    async fn test_owned_token_verifies() {
        let token: Address = "0x2DD7f5527d1e234AB91EC9bBC6641eF169f95b07".parse().unwrap();
        let locker = Address::repeat_byte(0x10);
        let (chain, verifier) = setup(&[(Address::repeat_byte(0x01), 1, locker), (token, 22216, locker)]);

        // lower-case, unprefixed input
        let details = verifier
            .verify("2dd7f5527d1e234ab91ec9bbc6641ef169f95b07", Address::repeat_byte(0xcc))
            .await
            .unwrap();

        assert_eq!(details.token_id, "22216");
        assert_eq!(details.address, token);
        assert_eq!(details.lp_locker_address, locker);
        assert_eq!(chain.reads().len(), 1);
    }

    #[tokio::test]
    async fn test_not_deployed_by_user() {
        let (_, verifier) = setup(&[(Address::repeat_byte(0x01), 1, Address::repeat_byte(0x10))]);
        let err = verifier
            .verify("0x2DD7f5527d1e234AB91EC9bBC6641eF169f95b07", Address::repeat_byte(0xcc))
            .await
            .unwrap_err();

        assert_eq!(err, ClankerVerificationError::NotOwner);
        assert_eq!(err.kind().as_str(), "NOT_OWNER");
    }

    #[tokio::test]
    async fn test_no_chain_client() {
        let verifier = ClankerVerifier::new(None, Address::repeat_byte(0xfa));
        let err = verifier
            .verify("0x2DD7f5527d1e234AB91EC9bBC6641eF169f95b07", Address::zero())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), VerificationKind::NetworkError);
    }

    #[tokio::test]
    async fn test_rpc_failure_is_network_error() {
        let factory = Address::repeat_byte(0xfa);
        let chain = Arc::new(InMemoryChain::new(Address::zero()));
        chain.respond(
            factory,
            factory_abi().unwrap().selector(GET_TOKENS).unwrap(),
            Err(ChainError::Rpc("connection refused".into())),
        );
        let verifier = ClankerVerifier::new(Some(chain as Arc<dyn ChainReader>), factory);

        let err = verifier
            .verify("0x2DD7f5527d1e234AB91EC9bBC6641eF169f95b07", Address::zero())
            .await
            .unwrap_err();
        match err {
            ClankerVerificationError::Network(msg) => assert!(msg.contains("connection refused")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_token_address() {
        let (chain, verifier) = setup(&[]);
        let err = verifier.verify("0x1234", Address::zero()).await.unwrap_err();
        assert_eq!(err.kind(), VerificationKind::InvalidId);
        assert!(chain.reads().is_empty());
    }
}
