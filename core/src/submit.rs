//! Campaign submission
//!
//! Runs the write side of the workflow strictly in order: validate, resolve
//! the token, create the split, rewire payouts, save the campaign. A failed
//! step stops everything after it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ethers::types::Address;
use ethers::utils::to_checksum;
use thiserror::Error;

use crate::backend::{BackendError, CampaignBackend};
use crate::campaign::{Campaign, NewCampaign, TokenFamily};
use crate::chain::ChainWriter;
use crate::keywords::KeywordSet;
use crate::link::{detect_family, extract_token_address};
use crate::payout::{ClankerPayoutRewirer, PayoutError, ZoraPayoutRewirer};
use crate::split::{SplitBuilder, SplitError};
use crate::verify::VerifiedToken;

/// Submission errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("Invalid link format: {0}")]
    InvalidLink(String),
    #[error("Failed to create split: {0}")]
    Split(#[from] SplitError),
    #[error(transparent)]
    Payout(#[from] PayoutError),
    #[error("Failed to save campaign: {0}")]
    Backend(#[from] BackendError),
}

/// User-entered campaign details
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignForm {
    pub title: String,
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Share of rewards routed to the protocol, 1..=100
    pub budget_percentage: u8,
    pub keywords: KeywordSet,
}

/// Everything a submission needs
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub family: TokenFamily,
    /// Link or address as pasted
    pub link: String,
    /// Connected wallet
    pub creator: Option<Address>,
    /// Result of the verification step
    pub verified: Option<VerifiedToken>,
    pub form: CampaignForm,
}

/// Validated request, ready for the network steps
struct Checked<'a> {
    creator: Address,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    verified: Option<&'a VerifiedToken>,
}

impl SubmitRequest {
    fn check(&self) -> Result<Checked<'_>, SubmitError> {
        let form = &self.form;
        if form.title.trim().is_empty() {
            return Err(SubmitError::MissingField("title"));
        }
        if form.description.trim().is_empty() {
            return Err(SubmitError::MissingField("description"));
        }
        let creator = self.creator.ok_or(SubmitError::MissingField("creator address"))?;
        if form.budget_percentage == 0 {
            return Err(SubmitError::MissingField("budget percentage"));
        }
        if form.budget_percentage > 100 {
            return Err(SubmitError::InvalidField {
                field: "budget percentage",
                reason: format!("{} is above 100", form.budget_percentage),
            });
        }
        let start = form.start_date.ok_or(SubmitError::MissingField("start date"))?;
        let end = form.end_date.ok_or(SubmitError::MissingField("end date"))?;
        if start > end {
            return Err(SubmitError::InvalidField {
                field: "end date",
                reason: "must not be before the start date".into(),
            });
        }
        if form.keywords.is_empty() {
            return Err(SubmitError::MissingField("keywords"));
        }

        if let Some(verified) = &self.verified {
            if verified.family() != self.family {
                return Err(SubmitError::InvalidField {
                    field: "token details",
                    reason: format!("verified a {} token for a {} campaign", verified.family(), self.family),
                });
            }
        }
        if self.family == TokenFamily::Clanker && self.verified.is_none() {
            return Err(SubmitError::MissingField("token details"));
        }

        Ok(Checked {
            creator,
            start,
            end,
            verified: self.verified.as_ref(),
        })
    }
}

/// Drives the write side of campaign creation
pub struct Submitter {
    splits: SplitBuilder,
    clanker_payout: ClankerPayoutRewirer,
    zora_payout: ZoraPayoutRewirer,
    backend: Arc<dyn CampaignBackend>,
}

impl Submitter {
    pub fn new(
        writer: Option<Arc<dyn ChainWriter>>,
        split_factory: Address,
        protocol: Address,
        backend: Arc<dyn CampaignBackend>,
    ) -> Self {
        Self {
            splits: SplitBuilder::new(writer.clone(), split_factory, protocol),
            clanker_payout: ClankerPayoutRewirer::new(writer.clone()),
            zora_payout: ZoraPayoutRewirer::new(writer),
            backend,
        }
    }

    /// Submit a campaign and return the stored record
    pub async fn submit(&self, request: &SubmitRequest) -> Result<Campaign, SubmitError> {
        let checked = request.check()?;

        let token = extract_token_address(&request.link)
            .ok_or_else(|| SubmitError::InvalidLink(request.link.clone()))?;
        let token_address: Address = token
            .parse()
            .map_err(|_| SubmitError::InvalidLink(request.link.clone()))?;
        if let Some(detected) = detect_family(&request.link) {
            if detected != request.family {
                tracing::warn!(
                    "Link looks like a {} link but the campaign is {}",
                    detected,
                    request.family
                );
            }
        }

        if let Some(verified) = checked.verified {
            let verified_address = verified.token_address();
            if verified_address.parse::<Address>().ok() != Some(token_address) {
                return Err(SubmitError::InvalidField {
                    field: "token details",
                    reason: format!(
                        "verified token {} does not match link token {}",
                        verified_address, token
                    ),
                });
            }
        }

        let clanker = checked.verified.and_then(VerifiedToken::clanker);
        let recipient = match (request.family, clanker) {
            (TokenFamily::Clanker, Some(details)) => details.lp_locker_address,
            (TokenFamily::Clanker, None) => return Err(SubmitError::MissingField("token details")),
            (TokenFamily::Zora, _) => token_address,
        };

        let budget = request.form.budget_percentage;
        tracing::info!("Creating split for {:?} with {}% budget", recipient, budget);
        let split = self.splits.create_split(budget, recipient).await?;
        let split_address = to_checksum(&split, None);

        let hash = match (request.family, clanker) {
            (TokenFamily::Clanker, Some(details)) => {
                self.clanker_payout
                    .rewire(
                        &details.token_id,
                        &to_checksum(&details.lp_locker_address, None),
                        &split_address,
                    )
                    .await?
            }
            _ => {
                self.zora_payout
                    .rewire(&to_checksum(&token_address, None), &split_address)
                    .await?
            }
        };
        tracing::info!("Payout routed to split {} in {:?}", split_address, hash);

        let campaign = NewCampaign {
            title: request.form.title.trim().to_string(),
            description: request.form.description.trim().to_string(),
            creator_address: to_checksum(&checked.creator, None),
            token_id: clanker.map(|d| d.token_id.clone()),
            link: token,
            is_zora: request.family.is_zora(),
            split_address,
            budget_percentage: budget,
            campaign_start_date: checked.start,
            campaign_end_date: checked.end,
            keywords: request.form.keywords.iter().map(str::to_string).collect(),
        };
        let created = self.backend.create(&campaign).await?;

        tracing::info!("Campaign {} created", created.id);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::chain::{ChainError, InMemoryChain};
    use crate::payout::tests::locker_selector;
    use crate::split::tests::{factory, protocol, script_factory};
    use crate::verify::ClankerTokenDetails;
    use chrono::TimeZone;
    use ethers::types::H256;

    const TOKEN: &str = "0x2DD7f5527d1e234AB91EC9bBC6641eF169f95b07";

    fn locker() -> Address {
        Address::repeat_byte(0x10)
    }

    fn form() -> CampaignForm {
        CampaignForm {
            title: " Based Fellowship ".into(),
            description: "Build on Base".into(),
            start_date: Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2025, 5, 11, 0, 0, 0).unwrap()),
            budget_percentage: 20,
            keywords: ["Base", "builders"].into_iter().collect(),
        }
    }

    fn clanker_request() -> SubmitRequest {
        SubmitRequest {
            family: TokenFamily::Clanker,
            link: format!("https://www.clanker.world/clanker/{}", TOKEN),
            creator: Some(Address::repeat_byte(0xce)),
            verified: Some(VerifiedToken::Clanker(ClankerTokenDetails {
                token_id: "22216".into(),
                address: TOKEN.parse().unwrap(),
                lp_locker_address: locker(),
                name: None,
                symbol: None,
            })),
            form: form(),
        }
    }

    struct Harness {
        chain: Arc<InMemoryChain>,
        backend: Arc<InMemoryBackend>,
        submitter: Submitter,
    }

    fn harness() -> Harness {
        let chain = Arc::new(InMemoryChain::new(Address::repeat_byte(0xce)));
        script_factory(&chain, Address::repeat_byte(0x77));
        let backend = Arc::new(InMemoryBackend::new());
        let submitter = Submitter::new(
            Some(chain.clone() as Arc<dyn ChainWriter>),
            factory(),
            protocol(),
            backend.clone(),
        );
        Harness {
            chain,
            backend,
            submitter,
        }
    }

    #[tokio::test]
    async fn test_clanker_submission() {
        let h = harness();
        let campaign = h.submitter.submit(&clanker_request()).await.unwrap();

        let sent = h.chain.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, factory());
        assert_eq!(sent[1].to, locker());
        assert_eq!(sent[1].selector(), Some(locker_selector()));

        let posted = h.backend.created();
        assert_eq!(posted.len(), 1);
        let body = &posted[0];
        assert_eq!(body.title, "Based Fellowship");
        assert_eq!(body.token_id.as_deref(), Some("22216"));
        assert_eq!(body.link, TOKEN);
        assert!(!body.is_zora);
        assert_eq!(body.split_address, to_checksum(&Address::repeat_byte(0x77), None));
        assert_eq!(body.creator_address, to_checksum(&Address::repeat_byte(0xce), None));
        assert_eq!(body.keywords, vec!["base", "builders"]);
        assert_eq!(campaign.split_address, body.split_address);
    }

    #[tokio::test]
    async fn test_zora_submission_uses_coin_as_recipient() {
        let h = harness();
        let request = SubmitRequest {
            family: TokenFamily::Zora,
            link: "https://zora.co/coin/base:0x92cbce3c432b7e4d073d6f646dccd9bf1dfa0b6b".into(),
            verified: None,
            ..clanker_request()
        };
        h.submitter.submit(&request).await.unwrap();

        let sent = h.chain.sent();
        assert_eq!(sent.len(), 2);
        let coin: Address = "0x92cbce3c432b7e4d073d6f646dccd9bf1dfa0b6b".parse().unwrap();
        assert_eq!(sent[1].to, coin);

        let body = &h.backend.created()[0];
        assert!(body.is_zora);
        assert_eq!(body.token_id, None);
    }

    #[tokio::test]
    async fn test_missing_field_aborts_before_network() {
        let cases: Vec<(SubmitRequest, SubmitError)> = vec![
            (
                SubmitRequest {
                    form: CampaignForm { end_date: None, ..form() },
                    ..clanker_request()
                },
                SubmitError::MissingField("end date"),
            ),
            (
                SubmitRequest {
                    form: CampaignForm { title: "   ".into(), ..form() },
                    ..clanker_request()
                },
                SubmitError::MissingField("title"),
            ),
            (
                SubmitRequest {
                    form: CampaignForm { budget_percentage: 0, ..form() },
                    ..clanker_request()
                },
                SubmitError::MissingField("budget percentage"),
            ),
            (
                SubmitRequest {
                    form: CampaignForm { keywords: KeywordSet::new(), ..form() },
                    ..clanker_request()
                },
                SubmitError::MissingField("keywords"),
            ),
            (
                SubmitRequest {
                    verified: None,
                    ..clanker_request()
                },
                SubmitError::MissingField("token details"),
            ),
            (
                SubmitRequest {
                    creator: None,
                    ..clanker_request()
                },
                SubmitError::MissingField("creator address"),
            ),
        ];

        for (request, expected) in cases {
            let h = harness();
            assert_eq!(h.submitter.submit(&request).await.unwrap_err(), expected);
            assert!(h.chain.reads().is_empty());
            assert!(h.chain.sent().is_empty());
            assert!(h.backend.created().is_empty());
        }
    }

    #[tokio::test]
    async fn test_reversed_dates_rejected() {
        let h = harness();
        let mut request = clanker_request();
        request.form.start_date = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());

        let err = h.submitter.submit(&request).await.unwrap_err();
        assert!(matches!(err, SubmitError::InvalidField { field: "end date", .. }));
        assert!(h.chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_link() {
        let h = harness();
        let request = SubmitRequest {
            link: "https://example.com/token".into(),
            ..clanker_request()
        };
        let err = h.submitter.submit(&request).await.unwrap_err();
        assert!(matches!(err, SubmitError::InvalidLink(_)));
        assert!(h.chain.reads().is_empty());
    }

    #[tokio::test]
    async fn test_link_must_match_verified_token() {
        let h = harness();
        let request = SubmitRequest {
            link: "https://www.clanker.world/clanker/0x1111111111111111111111111111111111111111".into(),
            ..clanker_request()
        };

        let err = h.submitter.submit(&request).await.unwrap_err();
        assert!(matches!(err, SubmitError::InvalidField { field: "token details", .. }));
        assert!(h.chain.reads().is_empty());
        assert!(h.chain.simulated().is_empty());
        assert!(h.chain.sent().is_empty());
        assert!(h.backend.created().is_empty());
    }

    #[tokio::test]
    async fn test_payout_failure_skips_backend() {
        let h = harness();
        h.chain
            .fail_send(locker(), locker_selector(), ChainError::Reverted(H256::zero()));

        let err = h.submitter.submit(&clanker_request()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Payout(PayoutError::Chain(_))));
        assert!(h.backend.created().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_surfaces() {
        let h = harness();
        h.backend.fail_with(BackendError::Api("title taken".into()));

        let err = h.submitter.submit(&clanker_request()).await.unwrap_err();
        assert_eq!(err, SubmitError::Backend(BackendError::Api("title taken".into())));
    }
}
