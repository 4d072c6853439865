//! Campaign backend
//!
//! REST endpoints:
//! - `GET  /bounty/all`
//! - `GET  /bounty/id/{id}`
//! - `GET  /bounty/address/{address}`
//! - `POST /create/bounty`

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::campaign::{Campaign, NewCampaign};
use crate::config::BackendConfig;

/// Backend errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("API error: {0}")]
    Api(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }
}

/// Campaign storage
#[async_trait]
pub trait CampaignBackend: Send + Sync {
    async fn all(&self) -> Result<Vec<Campaign>, BackendError>;

    /// `None` when no campaign has this id
    async fn by_id(&self, id: &str) -> Result<Option<Campaign>, BackendError>;

    /// Campaigns created by `address`
    async fn by_address(&self, address: &str) -> Result<Vec<Campaign>, BackendError>;

    /// Persist a new campaign and return the stored record
    async fn create(&self, campaign: &NewCampaign) -> Result<Campaign, BackendError>;
}

// =============================================================================
// HTTP
// =============================================================================

/// HTTP client for the campaign backend
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(&config.url)
            .map_err(|e| BackendError::Config(format!("invalid backend url {}: {}", config.url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("bountyhub/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Config(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET returning `None` on 404 or a JSON `null` body
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>, BackendError> {
        let url = self.url(segments)?;
        tracing::debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice::<Option<T>>(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CampaignBackend for BackendClient {
    async fn all(&self) -> Result<Vec<Campaign>, BackendError> {
        Ok(self.get_json(&["bounty", "all"]).await?.unwrap_or_default())
    }

    async fn by_id(&self, id: &str) -> Result<Option<Campaign>, BackendError> {
        self.get_json(&["bounty", "id", id]).await
    }

    async fn by_address(&self, address: &str) -> Result<Vec<Campaign>, BackendError> {
        Ok(self
            .get_json(&["bounty", "address", address])
            .await?
            .unwrap_or_default())
    }

    async fn create(&self, campaign: &NewCampaign) -> Result<Campaign, BackendError> {
        let url = self.url(&["create", "bounty"])?;
        tracing::debug!("POST {}", url);

        let response = self.http.post(url).json(campaign).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let message = match error {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(BackendError::Api(message));
        }

        let created: Campaign =
            serde_json::from_value(body).map_err(|e| BackendError::Decode(e.to_string()))?;
        tracing::info!("Campaign saved: {}", created.id);
        Ok(created)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// In-memory backend (for testing and development)
#[derive(Default)]
pub struct InMemoryBackend {
    campaigns: RwLock<Vec<Campaign>>,
    created: RwLock<Vec<NewCampaign>>,
    failure: RwLock<Option<BackendError>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_campaigns(campaigns: Vec<Campaign>) -> Self {
        Self {
            campaigns: RwLock::new(campaigns),
            ..Self::default()
        }
    }

    /// Make every request fail with `error`
    pub fn fail_with(&self, error: BackendError) {
        *self.failure.write() = Some(error);
    }

    /// Bodies received by `create`, in order
    pub fn created(&self) -> Vec<NewCampaign> {
        self.created.read().clone()
    }

    fn check(&self) -> Result<(), BackendError> {
        match self.failure.read().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CampaignBackend for InMemoryBackend {
    async fn all(&self) -> Result<Vec<Campaign>, BackendError> {
        self.check()?;
        Ok(self.campaigns.read().clone())
    }

    async fn by_id(&self, id: &str) -> Result<Option<Campaign>, BackendError> {
        self.check()?;
        Ok(self.campaigns.read().iter().find(|c| c.id == id).cloned())
    }

    async fn by_address(&self, address: &str) -> Result<Vec<Campaign>, BackendError> {
        self.check()?;
        Ok(self
            .campaigns
            .read()
            .iter()
            .filter(|c| c.creator_address.eq_ignore_ascii_case(address))
            .cloned()
            .collect())
    }

    async fn create(&self, campaign: &NewCampaign) -> Result<Campaign, BackendError> {
        self.created.write().push(campaign.clone());
        self.check()?;

        let now = Utc::now();
        let mut campaigns = self.campaigns.write();
        let record = Campaign {
            id: format!("{:024x}", campaigns.len() + 1),
            title: campaign.title.clone(),
            description: campaign.description.clone(),
            hash: None,
            creator_address: campaign.creator_address.clone(),
            token_id: campaign.token_id.clone(),
            link: campaign.link.clone(),
            is_zora: campaign.is_zora,
            budget_percentage: campaign.budget_percentage,
            unique_keyword: None,
            split_address: campaign.split_address.clone(),
            campaign_start_date: campaign.campaign_start_date,
            campaign_end_date: campaign.campaign_end_date,
            is_finalized: false,
            keywords: campaign.keywords.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        campaigns.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_campaign(creator: &str) -> NewCampaign {
        NewCampaign {
            title: "Based Fellowship".into(),
            description: "Build on Base".into(),
            creator_address: creator.into(),
            token_id: Some("22216".into()),
            link: "0x2DD7f5527d1e234AB91EC9bBC6641eF169f95b07".into(),
            is_zora: false,
            split_address: "0x39AcB1a082B059086e0D78372FC8B12DA118B9B8".into(),
            budget_percentage: 20,
            campaign_start_date: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            campaign_end_date: Utc.with_ymd_and_hms(2025, 5, 11, 0, 0, 0).unwrap(),
            keywords: vec!["base".into()],
        }
    }

    #[tokio::test]
    async fn test_in_memory_create_and_lookup() {
        let backend = InMemoryBackend::new();
        let creator = "0xCE54cF5a0dE3843011cF20389C1b6a4AaC442d6A";
        let created = backend.create(&new_campaign(creator)).await.unwrap();

        assert!(!created.is_finalized);
        assert_eq!(backend.created().len(), 1);
        assert_eq!(backend.by_id(&created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(backend.by_id("missing").await.unwrap(), None);

        let mine = backend.by_address(&creator.to_lowercase()).await.unwrap();
        assert_eq!(mine, vec![created]);
    }

    #[tokio::test]
    async fn test_in_memory_failure() {
        let backend = InMemoryBackend::new();
        backend.fail_with(BackendError::Api("duplicate".into()));
        let err = backend.all().await.unwrap_err();
        assert_eq!(err.to_string(), "API error: duplicate");
    }

    #[test]
    fn test_url_segments_are_escaped() {
        let client = BackendClient::new(&BackendConfig {
            url: "http://localhost:8080/api".into(),
            timeout_secs: 5,
        })
        .unwrap();
        let url = client.url(&["bounty", "id", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/bounty/id/a%2Fb");
    }
}
