use std::future::IntoFuture;
use std::time::Duration;

use alloy::consensus::Transaction as ConsensusTransaction;
use alloy::primitives::B256;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::BlockNumberOrTag;
use async_trait::async_trait;

use crate::data::types::{
    BlockData, Category, ChainConfig, Origin, ReceiptInfo, Transaction, TxStatus,
};
use crate::error::NodeError;

/// A connected chain node. Every method makes at most one RPC call and never
/// retries.
#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn is_reachable(&self) -> bool;

    async fn current_block_number(&self) -> Result<u64, NodeError>;

    async fn get_transaction(&self, hash: B256) -> Result<Transaction, NodeError>;

    async fn get_receipt(&self, hash: B256) -> Result<ReceiptInfo, NodeError>;

    async fn get_block(&self, number: u64, with_bodies: bool) -> Result<BlockData, NodeError>;
}

/// Opens a [`NodeClient`] for a chain.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    async fn connect(&self, chain: &ChainConfig) -> Result<Box<dyn NodeClient>, NodeError>;
}

/// Connects to a chain's configured JSON-RPC endpoint over HTTP.
pub struct RpcConnector {
    timeout: Duration,
}

impl RpcConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl NodeConnector for RpcConnector {
    async fn connect(&self, chain: &ChainConfig) -> Result<Box<dyn NodeClient>, NodeError> {
        let rpc_url = chain
            .rpc_url
            .as_deref()
            .ok_or_else(|| NodeError::NotConfigured(chain.name.clone()))?;
        let provider = EthProvider::connect(rpc_url, self.timeout).await?;
        tracing::debug!(chain = %chain.name, chain_id = provider.chain_id(), "connected to node");
        Ok(Box::new(provider))
    }
}

/// The concrete provider type returned by `ProviderBuilder::new().on_http(url)`.
/// We use a trait-object-based wrapper to avoid spelling out the full generic type.
pub struct EthProvider {
    provider: Box<dyn Provider + Send + Sync>,
    chain_id: u64,
    timeout: Duration,
}

impl EthProvider {
    /// Connect to a node via HTTP RPC. Fails unless the node answers
    /// `eth_chainId` within the timeout.
    pub async fn connect(rpc_url: &str, timeout: Duration) -> Result<Self, NodeError> {
        let url = rpc_url
            .parse::<reqwest::Url>()
            .map_err(|e| NodeError::InvalidUrl {
                url: rpc_url.to_string(),
                reason: e.to_string(),
            })?;
        let provider = ProviderBuilder::new().on_http(url);
        let chain_id = with_timeout(timeout, provider.get_chain_id()).await?;
        Ok(Self {
            provider: Box::new(provider),
            chain_id,
            timeout,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

#[async_trait]
impl NodeClient for EthProvider {
    async fn is_reachable(&self) -> bool {
        with_timeout(self.timeout, self.provider.get_chain_id())
            .await
            .is_ok()
    }

    async fn current_block_number(&self) -> Result<u64, NodeError> {
        with_timeout(self.timeout, self.provider.get_block_number()).await
    }

    async fn get_transaction(&self, hash: B256) -> Result<Transaction, NodeError> {
        let tx = with_timeout(self.timeout, self.provider.get_transaction_by_hash(hash))
            .await?
            .ok_or_else(|| NodeError::NotFound(format!("transaction {hash}")))?;
        Ok(normalize(&tx, None))
    }

    async fn get_receipt(&self, hash: B256) -> Result<ReceiptInfo, NodeError> {
        let receipt = with_timeout(self.timeout, self.provider.get_transaction_receipt(hash))
            .await?
            .ok_or_else(|| NodeError::NotFound(format!("receipt for {hash}")))?;
        let status = if receipt.status() {
            TxStatus::Success
        } else {
            TxStatus::Failed
        };
        Ok(ReceiptInfo {
            status,
            block_number: receipt.block_number,
        })
    }

    async fn get_block(&self, number: u64, with_bodies: bool) -> Result<BlockData, NodeError> {
        let request = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number));
        let block = if with_bodies {
            with_timeout(self.timeout, request.full()).await?
        } else {
            with_timeout(self.timeout, request.hashes()).await?
        }
        .ok_or_else(|| NodeError::NotFound(format!("block {number}")))?;

        let timestamp = block.header.timestamp;
        let transactions = block
            .transactions
            .as_transactions()
            .map(|txs| {
                txs.iter()
                    .map(|t| {
                        let mut tx = normalize(t, Some(timestamp));
                        tx.block_number.get_or_insert(number);
                        tx
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(BlockData {
            number,
            timestamp,
            transactions,
        })
    }
}

/// Run one RPC call under the per-call timeout.
async fn with_timeout<T, E, F>(timeout: Duration, call: F) -> Result<T, NodeError>
where
    F: IntoFuture<Output = Result<T, E>>,
    NodeError: From<E>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(NodeError::from),
        Err(_) => Err(NodeError::Timeout(timeout)),
    }
}

/// Convert an alloy RPC transaction into our `Transaction`. This is the only
/// place node responses are inspected field by field.
fn normalize(tx: &alloy::rpc::types::Transaction, block_timestamp: Option<u64>) -> Transaction {
    Transaction {
        hash: *tx.inner.tx_hash(),
        from: Some(tx.inner.signer()),
        to: tx.inner.to(),
        value: tx.inner.value(),
        gas_limit: tx.inner.gas_limit(),
        gas_price: tx.inner.gas_price().or(tx.effective_gas_price),
        input: tx.inner.input().clone(),
        block_number: tx.block_number,
        block_timestamp,
        category: Category::Unknown,
        label: None,
        origin: Origin::Node,
        explorer_url: None,
        to_explorer_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::fixtures;

    #[tokio::test]
    async fn test_connector_requires_rpc_url() {
        let mut chain = fixtures::chain("TestChain");
        chain.rpc_url = None;
        let connector = RpcConnector::new(Duration::from_secs(1));
        match connector.connect(&chain).await {
            Err(NodeError::NotConfigured(name)) => assert_eq!(name, "TestChain"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connect should fail without an RPC url"),
        }
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let result = EthProvider::connect("not a url", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(NodeError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_with_timeout_elapses() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<u64, NodeError>(1)
        };
        let result = with_timeout(Duration::from_millis(10), slow).await;
        assert!(matches!(result, Err(NodeError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_value() {
        let fast = async { Ok::<u64, NodeError>(7) };
        assert_eq!(with_timeout(Duration::from_secs(1), fast).await.unwrap(), 7);
    }
}
