//! Campaign creation wizard
//!
//! Three steps, each its own type:
//!
//! ```text
//! SelectType ──select──► AddLink ──verify──► FillDetails ──submit──► Campaign
//!     ▲                    │  ▲                  │
//!     └───────back─────────┘  └──────back────────┘
//! ```
//!
//! A token can only reach the details step by passing verification.

use ethers::types::Address;

use crate::campaign::{Campaign, TokenFamily};
use crate::link::extract_token_address;
use crate::submit::{CampaignForm, SubmitError, SubmitRequest, Submitter};
use crate::verify::{VerifiedToken, Verifiers, VerifyError};

/// Choosing the token family
#[derive(Debug, Clone, PartialEq)]
pub struct SelectType;

/// Pasting the token link
#[derive(Debug, Clone, PartialEq)]
pub struct AddLink {
    family: TokenFamily,
}

/// Entering campaign details for a verified token
#[derive(Debug, Clone, PartialEq)]
pub struct FillDetails {
    family: TokenFamily,
    link: String,
    verified: VerifiedToken,
}

/// Wizard in step `S`
#[derive(Debug, Clone, PartialEq)]
pub struct Wizard<S> {
    state: S,
}

impl Default for Wizard<SelectType> {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard<SelectType> {
    pub fn new() -> Self {
        Self { state: SelectType }
    }

    pub fn select(self, family: TokenFamily) -> Wizard<AddLink> {
        tracing::debug!("Wizard: {} selected", family);
        Wizard {
            state: AddLink { family },
        }
    }
}

impl Wizard<AddLink> {
    pub fn family(&self) -> TokenFamily {
        self.state.family
    }

    pub fn back(self) -> Wizard<SelectType> {
        Wizard::new()
    }

    /// Resolve and verify `link` for `user`.
    ///
    /// On failure the wizard stays on this step and is handed back with the
    /// error.
    pub async fn verify(
        self,
        link: &str,
        user: Address,
        verifiers: &Verifiers,
    ) -> Result<Wizard<FillDetails>, (Wizard<AddLink>, VerifyError)> {
        let token = match extract_token_address(link) {
            Some(token) => token,
            None => return Err((self, VerifyError::InvalidLink(link.to_string()))),
        };

        match verifiers.verify(self.state.family, &token, user).await {
            Ok(verified) => Ok(Wizard {
                state: FillDetails {
                    family: self.state.family,
                    link: link.to_string(),
                    verified,
                },
            }),
            Err(e) => {
                tracing::warn!("Verification failed ({}): {}", e.kind(), e);
                Err((self, e))
            }
        }
    }
}

impl Wizard<FillDetails> {
    pub fn family(&self) -> TokenFamily {
        self.state.family
    }

    pub fn link(&self) -> &str {
        &self.state.link
    }

    pub fn verified(&self) -> &VerifiedToken {
        &self.state.verified
    }

    /// Back to the link step, discarding the verification
    pub fn back(self) -> Wizard<AddLink> {
        Wizard {
            state: AddLink {
                family: self.state.family,
            },
        }
    }

    /// Build the submission for `form` from wallet `creator`
    pub fn request(&self, creator: Address, form: CampaignForm) -> SubmitRequest {
        SubmitRequest {
            family: self.state.family,
            link: self.state.link.clone(),
            creator: Some(creator),
            verified: Some(self.state.verified.clone()),
            form,
        }
    }

    /// Submit the campaign. The wizard stays usable if this fails.
    pub async fn submit(
        &self,
        submitter: &Submitter,
        creator: Address,
        form: CampaignForm,
    ) -> Result<Campaign, SubmitError> {
        submitter.submit(&self.request(creator, form)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backend::InMemoryBackend;
    use crate::chain::{ChainReader, ChainWriter, InMemoryChain};
    use crate::verify::clanker::tests::factory_response;
    use crate::verify::clanker::{factory_abi, ClankerVerifier};
    use crate::verify::zora::tests::{api_with, coin, creator, profile, COIN};
    use crate::verify::{VerificationKind, ZoraVerifier};
    use chrono::{TimeZone, Utc};

    fn verifiers(chain: Option<Arc<InMemoryChain>>) -> Verifiers {
        let api = api_with(Some(coin("1000", "profile-7")), Some(profile("profile-7")));
        Verifiers::new(
            ClankerVerifier::new(
                chain.map(|c| c as Arc<dyn ChainReader>),
                Address::repeat_byte(0xfa),
            ),
            ZoraVerifier::new(api),
        )
    }

    fn form() -> CampaignForm {
        CampaignForm {
            title: "Spotlight week".into(),
            description: "Post about SPOT".into(),
            start_date: Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2025, 5, 11, 0, 0, 0).unwrap()),
            budget_percentage: 10,
            keywords: ["spot"].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_zora_happy_path() {
        let wizard = Wizard::new().select(TokenFamily::Zora);
        let details = wizard
            .verify(&format!("https://zora.co/coin/base:{}", COIN), creator(), &verifiers(None))
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(details.family(), TokenFamily::Zora);
        assert_eq!(details.verified().token_address(), COIN);

        let chain = Arc::new(InMemoryChain::new(creator()));
        crate::split::tests::script_factory(&chain, Address::repeat_byte(0x77));
        let backend = Arc::new(InMemoryBackend::new());
        let submitter = Submitter::new(
            Some(chain.clone() as Arc<dyn ChainWriter>),
            crate::split::tests::factory(),
            crate::split::tests::protocol(),
            backend.clone(),
        );

        let campaign = details.submit(&submitter, creator(), form()).await.unwrap();
        assert!(campaign.is_zora);
        assert_eq!(backend.created().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_verification_stays_on_link_step() {
        let wizard = Wizard::new().select(TokenFamily::Clanker);
        let chain = Arc::new(InMemoryChain::new(Address::zero()));
        chain.respond(
            Address::repeat_byte(0xfa),
            factory_abi().unwrap().selector("getTokensDeployedByUser").unwrap(),
            Ok(factory_response(&[])),
        );

        let (wizard, err) = wizard
            .verify(
                "https://www.clanker.world/clanker/0x2DD7f5527d1e234AB91EC9bBC6641eF169f95b07",
                Address::zero(),
                &verifiers(Some(chain)),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), VerificationKind::NotOwner);
        assert_eq!(wizard.family(), TokenFamily::Clanker);
    }

    #[tokio::test]
    async fn test_unrecognised_link() {
        let wizard = Wizard::new().select(TokenFamily::Clanker);
        let (wizard, err) = wizard
            .verify("https://example.com", Address::zero(), &verifiers(None))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::InvalidLink(_)));
        assert_eq!(wizard.back(), Wizard::new());
    }

    #[tokio::test]
    async fn test_back_from_details_forgets_verification() {
        let details = Wizard::new()
            .select(TokenFamily::Zora)
            .verify(COIN, creator(), &verifiers(None))
            .await
            .map_err(|(_, e)| e)
            .unwrap();
        let link_step = details.back();
        assert_eq!(link_step.family(), TokenFamily::Zora);
    }
}
