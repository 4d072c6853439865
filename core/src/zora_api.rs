//! Zora indexing API
//!
//! Coin metadata and creator profiles for Zora verification. The API key is
//! passed in at construction; nothing is configured globally.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::ZoraConfig;

/// Zora API errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinsApiError {
    /// Could not reach the API (connect failure, timeout)
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for CoinsApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CoinsApiError::Decode(e.to_string())
        } else {
            CoinsApiError::Network(e.to_string())
        }
    }
}

/// Creator profile reference embedded in a coin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfileRef {
    pub id: String,
    #[serde(default)]
    pub handle: Option<String>,
}

/// Zora coin metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    pub symbol: String,
    /// Decimal string, may exceed 64 bits
    pub total_supply: String,
    #[serde(default)]
    pub total_volume: Option<String>,
    #[serde(default)]
    pub volume24h: Option<String>,
    #[serde(default)]
    pub market_cap: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub creator_address: Option<String>,
    #[serde(default)]
    pub creator_profile: Option<CreatorProfileRef>,
    #[serde(default)]
    pub unique_holders: u64,
}

impl CoinDetails {
    /// Creator profile id, if the indexer knows the creator
    pub fn creator_id(&self) -> Option<&str> {
        self.creator_profile.as_ref().map(|p| p.id.as_str())
    }
}

/// Zora user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Coin and profile lookups
#[async_trait]
pub trait CoinsApi: Send + Sync {
    /// Coin metadata by contract address; `None` if the indexer has no such coin
    async fn coin(&self, address: &str) -> Result<Option<CoinDetails>, CoinsApiError>;

    /// Profile by wallet address or handle; `None` if there is no profile
    async fn profile(&self, identifier: &str) -> Result<Option<Profile>, CoinsApiError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinResponse {
    zora20_token: Option<CoinDetails>,
}

#[derive(Deserialize)]
struct ProfileResponse {
    profile: Option<Profile>,
}

/// HTTP client for the Zora SDK API
#[derive(Clone)]
pub struct ZoraApiClient {
    http: reqwest::Client,
    base_url: Url,
    chain_id: u64,
}

impl ZoraApiClient {
    pub fn new(config: &ZoraConfig) -> Result<Self, CoinsApiError> {
        let mut base_url = Url::parse(&config.api_url)
            .map_err(|e| CoinsApiError::Config(format!("invalid api url {}: {}", config.api_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                let value = header::HeaderValue::from_str(key)
                    .map_err(|e| CoinsApiError::Config(format!("invalid api key: {}", e)))?;
                headers.insert("api-key", value);
            }
            None => tracing::warn!("No Zora API key configured; requests may be rate limited"),
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoinsApiError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            chain_id: config.chain_id,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, CoinsApiError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| CoinsApiError::Config(e.to_string()))?;
        url.query_pairs_mut().extend_pairs(params);

        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoinsApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CoinsApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CoinsApi for ZoraApiClient {
    async fn coin(&self, address: &str) -> Result<Option<CoinDetails>, CoinsApiError> {
        let chain = self.chain_id.to_string();
        let response: Option<CoinResponse> = self
            .get_json("coin", &[("address", address), ("chain", &chain)])
            .await?;
        Ok(response.and_then(|r| r.zora20_token))
    }

    async fn profile(&self, identifier: &str) -> Result<Option<Profile>, CoinsApiError> {
        let response: Option<ProfileResponse> = self
            .get_json("profile", &[("identifier", identifier)])
            .await?;
        Ok(response.and_then(|r| r.profile))
    }
}

/// In-memory coins API (for testing and development)
#[derive(Default)]
pub struct InMemoryCoinsApi {
    coins: RwLock<HashMap<String, CoinDetails>>,
    profiles: RwLock<HashMap<String, Profile>>,
    failure: RwLock<Option<CoinsApiError>>,
}

impl InMemoryCoinsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_coin(&self, coin: CoinDetails) {
        self.coins.write().insert(coin.address.to_lowercase(), coin);
    }

    pub fn insert_profile(&self, identifier: &str, profile: Profile) {
        self.profiles.write().insert(identifier.to_lowercase(), profile);
    }

    /// Make every lookup fail with `error`
    pub fn fail_with(&self, error: CoinsApiError) {
        *self.failure.write() = Some(error);
    }
}

#[async_trait]
impl CoinsApi for InMemoryCoinsApi {
    async fn coin(&self, address: &str) -> Result<Option<CoinDetails>, CoinsApiError> {
        if let Some(error) = self.failure.read().clone() {
            return Err(error);
        }
        Ok(self.coins.read().get(&address.to_lowercase()).cloned())
    }

    async fn profile(&self, identifier: &str) -> Result<Option<Profile>, CoinsApiError> {
        if let Some(error) = self.failure.read().clone() {
            return Err(error);
        }
        Ok(self.profiles.read().get(&identifier.to_lowercase()).cloned())
    }
}
