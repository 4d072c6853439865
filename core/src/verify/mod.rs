//! Token ownership verification
//!
//! Each family has its own verifier and its own closed error enum. Both
//! errors map onto [`VerificationKind`] for display.

pub mod clanker;
pub mod zora;

use std::fmt;

use ethers::types::Address;
use ethers::utils::to_checksum;
use serde::Serialize;
use thiserror::Error;

use crate::campaign::TokenFamily;

pub use clanker::{ClankerTokenDetails, ClankerVerificationError, ClankerVerifier};
pub use zora::{ZoraVerificationError, ZoraVerifier};
pub use crate::zora_api::CoinDetails;

/// Category of a verification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationKind {
    /// No such token or coin
    NotFound,
    /// The wallet did not create the token
    NotOwner,
    /// The wallet has no Zora profile
    ProfileNotFound,
    /// The coin has no supply yet
    NotMinted,
    /// Malformed token or wallet address
    InvalidId,
    NetworkError,
    Unknown,
}

impl VerificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationKind::NotFound => "NOT_FOUND",
            VerificationKind::NotOwner => "NOT_OWNER",
            VerificationKind::ProfileNotFound => "PROFILE_NOT_FOUND",
            VerificationKind::NotMinted => "NOT_MINTED",
            VerificationKind::InvalidId => "INVALID_ID",
            VerificationKind::NetworkError => "NETWORK_ERROR",
            VerificationKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof of a successful verification, carried into the details step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum VerifiedToken {
    Clanker(ClankerTokenDetails),
    Zora(CoinDetails),
}

impl VerifiedToken {
    pub fn family(&self) -> TokenFamily {
        match self {
            VerifiedToken::Clanker(_) => TokenFamily::Clanker,
            VerifiedToken::Zora(_) => TokenFamily::Zora,
        }
    }

    /// Verified token contract address
    pub fn token_address(&self) -> String {
        match self {
            VerifiedToken::Clanker(details) => to_checksum(&details.address, None),
            VerifiedToken::Zora(coin) => coin.address.clone(),
        }
    }

    pub fn clanker(&self) -> Option<&ClankerTokenDetails> {
        match self {
            VerifiedToken::Clanker(details) => Some(details),
            VerifiedToken::Zora(_) => None,
        }
    }
}

/// Verification failure of either family
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("Invalid link format. Please check the link and try again.")]
    InvalidLink(String),
    #[error(transparent)]
    Clanker(#[from] ClankerVerificationError),
    #[error(transparent)]
    Zora(#[from] ZoraVerificationError),
}

impl VerifyError {
    pub fn kind(&self) -> VerificationKind {
        match self {
            VerifyError::InvalidLink(_) => VerificationKind::InvalidId,
            VerifyError::Clanker(e) => e.kind(),
            VerifyError::Zora(e) => e.kind(),
        }
    }
}

/// Both verifiers, dispatched by family
pub struct Verifiers {
    pub clanker: ClankerVerifier,
    pub zora: ZoraVerifier,
}

impl Verifiers {
    pub fn new(clanker: ClankerVerifier, zora: ZoraVerifier) -> Self {
        Self { clanker, zora }
    }

    /// Verify `token_address` with the verifier for `family`
    pub async fn verify(
        &self,
        family: TokenFamily,
        token_address: &str,
        user: Address,
    ) -> Result<VerifiedToken, VerifyError> {
        match family {
            TokenFamily::Clanker => Ok(VerifiedToken::Clanker(
                self.clanker.verify(token_address, user).await?,
            )),
            TokenFamily::Zora => Ok(VerifiedToken::Zora(self.zora.verify(token_address, user).await?)),
        }
    }
}
