//! CLI configuration
//!
//! The config file for the selected profile, with flags and environment
//! variables layered on top. Clients are built from the merged values.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use bountyhub_core::chain::EthersSigner;
use bountyhub_core::{
    AppConfig, BackendClient, CampaignBackend, ChainReader, ChainWriter, ClankerVerifier,
    EthersChain, Submitter, Verifiers, ZoraApiClient, ZoraVerifier,
};
use ethers::types::Address;

use crate::output::OutputFormat;

/// Values given on the command line or in the environment
#[derive(Debug, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub zora_api_key: Option<String>,
    pub protocol_address: Option<String>,
}

impl Overrides {
    /// Apply on top of `config`. The private key is never written to config.
    fn apply(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(url) = &self.backend_url {
            config.set("backend.url", url)?;
        }
        if let Some(url) = &self.rpc_url {
            config.set("chain.rpc_url", url)?;
        }
        if let Some(key) = &self.zora_api_key {
            config.set("zora.api_key", key)?;
        }
        if let Some(address) = &self.protocol_address {
            config.set("chain.protocol_address", address)?;
        }
        Ok(())
    }
}

/// Effective configuration for one invocation
pub struct Context {
    pub profile: Option<String>,
    pub config: AppConfig,
    private_key: Option<String>,
}

impl Context {
    pub fn load(profile: Option<&str>, overrides: Overrides) -> Result<Self> {
        let mut config = AppConfig::load(profile).context("failed to load configuration")?;
        overrides.apply(&mut config)?;
        tracing::debug!(
            "Backend {}, rpc {}, profile {}",
            config.backend.url,
            config.chain.rpc_url,
            profile.unwrap_or("default")
        );
        Ok(Self {
            profile: profile.map(String::from),
            config,
            private_key: overrides.private_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn default_format(&self) -> OutputFormat {
        self.config
            .output
            .default_format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    }

    pub fn backend(&self) -> Result<Arc<dyn CampaignBackend>> {
        Ok(Arc::new(BackendClient::new(&self.config.backend)?))
    }

    fn chain(&self) -> Result<EthersChain> {
        Ok(EthersChain::connect(&self.config.chain.rpc_url)?)
    }

    /// Signing wallet, if a private key was given
    pub fn signer(&self) -> Result<Option<Arc<EthersSigner>>> {
        match &self.private_key {
            Some(key) => {
                let signer = self.chain()?.with_wallet(key, self.config.chain.chain_id)?;
                Ok(Some(Arc::new(signer)))
            }
            None => Ok(None),
        }
    }

    /// `explicit` if given, otherwise the signing wallet's address
    pub fn wallet_address(&self, explicit: Option<&str>) -> Result<Address> {
        if let Some(raw) = explicit {
            return raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid address {}: {}", raw, e));
        }
        let signer = self
            .signer()?
            .context("no wallet: pass --address or set BOUNTYHUB_PRIVATE_KEY")?;
        Ok(signer.account())
    }

    pub fn verifiers(&self) -> Result<Verifiers> {
        let reader: Arc<dyn ChainReader> = Arc::new(self.chain()?);
        let clanker = ClankerVerifier::new(Some(reader), self.config.chain.clanker_factory()?);
        let zora = ZoraVerifier::new(Arc::new(ZoraApiClient::new(&self.config.zora)?));
        Ok(Verifiers::new(clanker, zora))
    }

    pub fn submitter(&self, writer: Option<Arc<dyn ChainWriter>>) -> Result<Submitter> {
        Ok(Submitter::new(
            writer,
            self.config.chain.split_factory()?,
            self.config.chain.protocol_address()?,
            self.backend()?,
        ))
    }
}
