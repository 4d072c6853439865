//! bountyhub core
//!
//! Campaign workflow for creator tokens on Base. A campaign ties a Clanker
//! token or a Zora coin to a revenue split between the protocol and the
//! token's creator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            CAMPAIGN WORKFLOW                            │
//! │                                                                         │
//! │   pasted link ──► Link Parser ──► Verifier (Clanker | Zora)             │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                               Split Builder (predict → reuse/deploy)    │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                               Payout Rewirer (locker | coin)            │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                               Backend  POST /create/bounty              │
//! │                                                                         │
//! │   Campaign Views ◄── GET /bounty/all | /bounty/id | /bounty/address     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Chain access, the Zora API and the backend are reached through traits
//! ([`ChainReader`], [`ChainWriter`], [`CoinsApi`], [`CampaignBackend`]) so the
//! workflow can run against in-memory implementations in tests.

pub mod backend;
pub mod campaign;
pub mod chain;
pub mod config;
pub mod dashboard;
pub mod keywords;
pub mod link;
pub mod payout;
pub mod split;
pub mod submit;
pub mod verify;
pub mod wizard;
pub mod zora_api;

pub use backend::{BackendClient, BackendError, CampaignBackend, InMemoryBackend};
pub use campaign::{Campaign, CampaignStatus, NewCampaign, TokenFamily};
pub use chain::{ChainError, ChainReader, ChainWriter, ContractCall, EthersChain};
pub use config::{AppConfig, ConfigError};
pub use dashboard::{Partitioned, SortOrder};
pub use keywords::KeywordSet;
pub use link::{detect_family, extract_token_address};
pub use payout::{ClankerPayoutRewirer, PayoutError, ZoraPayoutRewirer};
pub use split::{SplitBuilder, SplitError, SplitParams};
pub use submit::{CampaignForm, SubmitError, SubmitRequest, Submitter};
pub use verify::{
    ClankerTokenDetails, ClankerVerificationError, ClankerVerifier, CoinDetails,
    VerificationKind, VerifiedToken, Verifiers, VerifyError, ZoraVerificationError, ZoraVerifier,
};
pub use wizard::Wizard;
pub use zora_api::{CoinsApi, CoinsApiError, ZoraApiClient};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base mainnet chain id
pub const BASE_CHAIN_ID: u64 = 8453;
