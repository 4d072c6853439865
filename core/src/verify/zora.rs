//! Zora verification
//!
//! Ownership is decided by the indexer: the connected wallet's profile must
//! be the coin's creator profile, and the coin must have supply.

use std::sync::Arc;

use ethers::types::{Address, U256};
use thiserror::Error;

use super::VerificationKind;
use crate::zora_api::{CoinDetails, CoinsApi, CoinsApiError};

/// Zora verification failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoraVerificationError {
    #[error("Coin not found. Please check the link and try again.")]
    NotFound,
    #[error("No Zora profile found for the connected wallet.")]
    ProfileNotFound,
    #[error("You are not the creator of this coin. Only the coin creator can create a campaign.")]
    NotOwner,
    #[error("This coin has not been minted yet.")]
    NotMinted,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Verification failed: {0}")]
    Unknown(String),
}

impl ZoraVerificationError {
    pub fn kind(&self) -> VerificationKind {
        match self {
            ZoraVerificationError::NotFound => VerificationKind::NotFound,
            ZoraVerificationError::ProfileNotFound => VerificationKind::ProfileNotFound,
            ZoraVerificationError::NotOwner => VerificationKind::NotOwner,
            ZoraVerificationError::NotMinted => VerificationKind::NotMinted,
            ZoraVerificationError::Network(_) => VerificationKind::NetworkError,
            ZoraVerificationError::Unknown(_) => VerificationKind::Unknown,
        }
    }
}

impl From<CoinsApiError> for ZoraVerificationError {
    fn from(e: CoinsApiError) -> Self {
        match e {
            CoinsApiError::Network(msg) => ZoraVerificationError::Network(msg),
            other => ZoraVerificationError::Unknown(other.to_string()),
        }
    }
}

/// Verifies Zora coin ownership through the coins API
pub struct ZoraVerifier {
    coins: Arc<dyn CoinsApi>,
}

impl ZoraVerifier {
    pub fn new(coins: Arc<dyn CoinsApi>) -> Self {
        Self { coins }
    }

    /// Check that `user` created `token_address` and that it has been minted
    pub async fn verify(
        &self,
        token_address: &str,
        user: Address,
    ) -> Result<CoinDetails, ZoraVerificationError> {
        tracing::info!("Verifying Zora coin {} for {:?}", token_address, user);

        let coin = self
            .coins
            .coin(token_address)
            .await?
            .ok_or(ZoraVerificationError::NotFound)?;

        let profile = self
            .coins
            .profile(&format!("{:?}", user))
            .await?
            .ok_or(ZoraVerificationError::ProfileNotFound)?;

        if coin.creator_id() != Some(profile.id.as_str()) {
            tracing::debug!(
                "Creator mismatch: coin creator {:?}, wallet profile {}",
                coin.creator_id(),
                profile.id
            );
            return Err(ZoraVerificationError::NotOwner);
        }

        let supply = U256::from_dec_str(coin.total_supply.trim()).map_err(|e| {
            ZoraVerificationError::Unknown(format!(
                "invalid total supply {:?}: {}",
                coin.total_supply, e
            ))
        })?;
        if supply.is_zero() {
            return Err(ZoraVerificationError::NotMinted);
        }

        tracing::info!("Zora coin verified: {} ({})", coin.name, coin.symbol);
        Ok(coin)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::zora_api::{CreatorProfileRef, InMemoryCoinsApi, Profile};

    pub(crate) const COIN: &str = "0x92cbce3c432b7e4d073d6f646dccd9bf1dfa0b6b";

    pub(crate) fn creator() -> Address {
        Address::repeat_byte(0xde)
    }

    pub(crate) fn coin(total_supply: &str, creator_id: &str) -> CoinDetails {
        CoinDetails {
            id: "coin-1".into(),
            name: "Spotlight".into(),
            description: String::new(),
            address: COIN.into(),
            symbol: "SPOT".into(),
            total_supply: total_supply.into(),
            total_volume: None,
            volume24h: None,
            market_cap: None,
            created_at: None,
            creator_address: Some(format!("{:?}", creator())),
            creator_profile: Some(CreatorProfileRef {
                id: creator_id.into(),
                handle: None,
            }),
            unique_holders: 3,
        }
    }

    pub(crate) fn profile(id: &str) -> Profile {
        Profile {
            id: id.into(),
            handle: "spot".into(),
            display_name: None,
            bio: None,
        }
    }

    pub(crate) fn api_with(coin: Option<CoinDetails>, profile: Option<Profile>) -> Arc<InMemoryCoinsApi> {
        let api = Arc::new(InMemoryCoinsApi::new());
        if let Some(coin) = coin {
            api.insert_coin(coin);
        }
        if let Some(profile) = profile {
            api.insert_profile(&format!("{:?}", creator()), profile);
        }
        api
    }

    #[tokio::test]
    async fn test_creator_with_supply_verifies() {
        let api = api_with(Some(coin("1000000", "profile-7")), Some(profile("profile-7")));
        let verified = ZoraVerifier::new(api).verify(COIN, creator()).await.unwrap();
        assert_eq!(verified.symbol, "SPOT");
    }

    #[tokio::test]
    async fn test_zero_supply_is_not_minted() {
        let api = api_with(Some(coin("0", "profile-7")), Some(profile("profile-7")));
        let err = ZoraVerifier::new(api).verify(COIN, creator()).await.unwrap_err();
        assert_eq!(err, ZoraVerificationError::NotMinted);
        assert_eq!(err.kind().as_str(), "NOT_MINTED");
    }

    #[tokio::test]
    async fn test_supply_beyond_u64() {
        let api = api_with(
            Some(coin("1000000000000000000000000000", "profile-7")),
            Some(profile("profile-7")),
        );
        assert!(ZoraVerifier::new(api).verify(COIN, creator()).await.is_ok());
    }

    #[tokio::test]
    async fn test_gates_in_order() {
        let api = api_with(None, Some(profile("profile-7")));
        let err = ZoraVerifier::new(api).verify(COIN, creator()).await.unwrap_err();
        assert_eq!(err.kind(), VerificationKind::NotFound);

        let api = api_with(Some(coin("0", "profile-7")), None);
        let err = ZoraVerifier::new(api).verify(COIN, creator()).await.unwrap_err();
        assert_eq!(err.kind(), VerificationKind::ProfileNotFound);

        // ownership is checked before supply
        let api = api_with(Some(coin("0", "profile-7")), Some(profile("profile-8")));
        let err = ZoraVerifier::new(api).verify(COIN, creator()).await.unwrap_err();
        assert_eq!(err.kind(), VerificationKind::NotOwner);
    }

    #[tokio::test]
    async fn test_unparsable_supply() {
        let api = api_with(Some(coin("lots", "profile-7")), Some(profile("profile-7")));
        let err = ZoraVerifier::new(api).verify(COIN, creator()).await.unwrap_err();
        assert_eq!(err.kind(), VerificationKind::Unknown);
    }

    #[tokio::test]
    async fn test_api_errors_classified_by_type() {
        let api = api_with(None, None);
        api.fail_with(CoinsApiError::Network("timed out".into()));
        let err = ZoraVerifier::new(api.clone()).verify(COIN, creator()).await.unwrap_err();
        assert_eq!(err, ZoraVerificationError::Network("timed out".into()));

        // a message mentioning "network" is still a status failure
        api.fail_with(CoinsApiError::Status {
            status: 500,
            body: "network overloaded".into(),
        });
        let err = ZoraVerifier::new(api).verify(COIN, creator()).await.unwrap_err();
        assert_eq!(err.kind(), VerificationKind::Unknown);
    }
}
