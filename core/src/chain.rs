//! Chain access
//!
//! Contract reads and writes go through [`ChainReader`] and [`ChainWriter`].
//! [`EthersChain`] and [`EthersSigner`] speak JSON-RPC; [`InMemoryChain`]
//! is a scriptable stand-in for tests and local development.

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use ethers::abi::{parse_abi, Abi, Token};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, H256, U64};
use parking_lot::RwLock;
use thiserror::Error;

/// Chain errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("wallet error: {0}")]
    Wallet(String),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("transaction {0:?} reverted")]
    Reverted(H256),
    #[error("transaction {0:?} dropped before confirmation")]
    Dropped(H256),
    #[error("abi error: {0}")]
    Abi(String),
}

/// A contract function call: target plus ABI-encoded calldata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    pub data: Bytes,
}

impl ContractCall {
    pub fn new(to: Address, data: Bytes) -> Self {
        Self { to, data }
    }

    /// 4-byte function selector, if the calldata has one
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }

    fn to_tx(&self, from: Option<Address>) -> TypedTransaction {
        let mut tx = TransactionRequest::new().to(self.to).data(self.data.clone());
        if let Some(from) = from {
            tx = tx.from(from);
        }
        tx.into()
    }
}

/// Read-only chain access
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `eth_call` against the latest block
    async fn call(&self, call: &ContractCall) -> Result<Bytes, ChainError>;

    /// Deployed bytecode at `address` (empty when nothing is deployed)
    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError>;
}

/// Chain access through a signing wallet
#[async_trait]
pub trait ChainWriter: ChainReader {
    /// Address transactions are sent from
    fn account(&self) -> Address;

    /// `eth_call` from the wallet account, to surface reverts before sending
    async fn simulate(&self, call: &ContractCall) -> Result<Bytes, ChainError>;

    /// Send a transaction and wait for its receipt.
    ///
    /// Returns the transaction hash once the receipt reports success.
    async fn send(&self, call: &ContractCall) -> Result<H256, ChainError>;
}

/// Parsed human-readable ABI for a contract
pub(crate) struct ContractAbi(Abi);

impl ContractAbi {
    pub(crate) fn parse(signatures: &[&str]) -> Result<Self, ChainError> {
        parse_abi(signatures)
            .map(Self)
            .map_err(|e| ChainError::Abi(format!("invalid contract abi: {}", e)))
    }

    /// Parse once into `cell`, handing out the cached result afterwards
    pub(crate) fn cached(
        cell: &'static OnceLock<Result<Self, ChainError>>,
        signatures: &[&str],
    ) -> Result<&'static Self, ChainError> {
        cell.get_or_init(|| Self::parse(signatures))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub(crate) fn encode(&self, name: &str, args: &[Token]) -> Result<Bytes, ChainError> {
        let function = self
            .0
            .function(name)
            .map_err(|e| ChainError::Abi(e.to_string()))?;
        function
            .encode_input(args)
            .map(Bytes::from)
            .map_err(|e| ChainError::Abi(format!("{}: {}", name, e)))
    }

    pub(crate) fn decode(&self, name: &str, data: &[u8]) -> Result<Vec<Token>, ChainError> {
        let function = self
            .0
            .function(name)
            .map_err(|e| ChainError::Abi(e.to_string()))?;
        function
            .decode_output(data)
            .map_err(|e| ChainError::Abi(format!("{}: {}", name, e)))
    }

    /// Selector of `name`, for matching recorded calls
    pub(crate) fn selector(&self, name: &str) -> Option<[u8; 4]> {
        self.0.function(name).ok().map(|f| f.short_signature())
    }
}

// =============================================================================
// JSON-RPC
// =============================================================================

/// Read-only JSON-RPC chain client
#[derive(Clone)]
pub struct EthersChain {
    provider: Provider<Http>,
}

impl EthersChain {
    /// Connect to an HTTP JSON-RPC endpoint
    pub fn connect(rpc_url: &str) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ChainError::Rpc(format!("invalid rpc url {}: {}", rpc_url, e)))?;
        Ok(Self { provider })
    }

    /// Attach a local private key as the signing wallet
    pub fn with_wallet(&self, private_key: &str, chain_id: u64) -> Result<EthersSigner, ChainError> {
        let wallet = private_key
            .trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| ChainError::Wallet(e.to_string()))?
            .with_chain_id(chain_id);
        tracing::info!("Wallet connected: {:?}", wallet.address());
        Ok(EthersSigner {
            client: SignerMiddleware::new(self.provider.clone(), wallet),
        })
    }
}

#[async_trait]
impl ChainReader for EthersChain {
    async fn call(&self, call: &ContractCall) -> Result<Bytes, ChainError> {
        self.provider
            .call(&call.to_tx(None), None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        self.provider
            .get_code(address, None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}

/// JSON-RPC chain client with a local signing wallet
pub struct EthersSigner {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
}

#[async_trait]
impl ChainReader for EthersSigner {
    async fn call(&self, call: &ContractCall) -> Result<Bytes, ChainError> {
        self.client
            .call(&call.to_tx(None), None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        self.client
            .get_code(address, None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}

#[async_trait]
impl ChainWriter for EthersSigner {
    fn account(&self) -> Address {
        self.client.address()
    }

    async fn simulate(&self, call: &ContractCall) -> Result<Bytes, ChainError> {
        self.client
            .call(&call.to_tx(Some(self.account())), None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn send(&self, call: &ContractCall) -> Result<H256, ChainError> {
        let pending = self
            .client
            .send_transaction(call.to_tx(Some(self.account())), None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        let hash = pending.tx_hash();
        tracing::info!("Transaction sent: {:?}", hash);

        let receipt = pending
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .ok_or(ChainError::Dropped(hash))?;

        if receipt.status == Some(U64::from(1)) {
            tracing::info!("Transaction confirmed: {:?}", hash);
            Ok(hash)
        } else {
            Err(ChainError::Reverted(hash))
        }
    }
}

// =============================================================================
// In-memory
// =============================================================================

type CallKey = (Address, [u8; 4]);

/// Scriptable chain (for testing and development)
///
/// Reads are answered from canned responses keyed by target and selector.
/// Sends are recorded and may "deploy" code at a configured address.
pub struct InMemoryChain {
    account: Address,
    responses: RwLock<HashMap<CallKey, Result<Bytes, ChainError>>>,
    send_failures: RwLock<HashMap<CallKey, ChainError>>,
    deploys: RwLock<HashMap<CallKey, Address>>,
    code: RwLock<HashMap<Address, Bytes>>,
    reads: RwLock<Vec<ContractCall>>,
    simulated: RwLock<Vec<ContractCall>>,
    sent: RwLock<Vec<ContractCall>>,
}

impl InMemoryChain {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            responses: RwLock::new(HashMap::new()),
            send_failures: RwLock::new(HashMap::new()),
            deploys: RwLock::new(HashMap::new()),
            code: RwLock::new(HashMap::new()),
            reads: RwLock::new(Vec::new()),
            simulated: RwLock::new(Vec::new()),
            sent: RwLock::new(Vec::new()),
        }
    }

    /// Answer calls to `to` with `selector`
    pub fn respond(&self, to: Address, selector: [u8; 4], response: Result<Bytes, ChainError>) {
        self.responses.write().insert((to, selector), response);
    }

    /// Make sends to `to` with `selector` fail
    pub fn fail_send(&self, to: Address, selector: [u8; 4], error: ChainError) {
        self.send_failures.write().insert((to, selector), error);
    }

    /// A successful send to `to` with `selector` deploys code at `at`
    pub fn deploy_on_send(&self, to: Address, selector: [u8; 4], at: Address) {
        self.deploys.write().insert((to, selector), at);
    }

    pub fn set_code(&self, address: Address, code: Bytes) {
        self.code.write().insert(address, code);
    }

    pub fn reads(&self) -> Vec<ContractCall> {
        self.reads.read().clone()
    }

    pub fn simulated(&self) -> Vec<ContractCall> {
        self.simulated.read().clone()
    }

    pub fn sent(&self) -> Vec<ContractCall> {
        self.sent.read().clone()
    }

    fn key(call: &ContractCall) -> CallKey {
        (call.to, call.selector().unwrap_or_default())
    }

    fn answer(&self, call: &ContractCall) -> Result<Bytes, ChainError> {
        self.responses
            .read()
            .get(&Self::key(call))
            .cloned()
            .unwrap_or_else(|| Ok(Bytes::default()))
    }
}

#[async_trait]
impl ChainReader for InMemoryChain {
    async fn call(&self, call: &ContractCall) -> Result<Bytes, ChainError> {
        self.reads.write().push(call.clone());
        self.answer(call)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        Ok(self.code.read().get(&address).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ChainWriter for InMemoryChain {
    fn account(&self) -> Address {
        self.account
    }

    async fn simulate(&self, call: &ContractCall) -> Result<Bytes, ChainError> {
        self.simulated.write().push(call.clone());
        self.answer(call)
    }

    async fn send(&self, call: &ContractCall) -> Result<H256, ChainError> {
        let key = Self::key(call);
        if let Some(error) = self.send_failures.read().get(&key) {
            return Err(error.clone());
        }
        let nonce = {
            let mut sent = self.sent.write();
            sent.push(call.clone());
            sent.len() as u64
        };
        if let Some(at) = self.deploys.read().get(&key) {
            self.code.write().insert(*at, Bytes::from(vec![0x60, 0x80]));
        }
        Ok(H256::from_low_u64_be(nonce))
    }
}
