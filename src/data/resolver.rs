use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use tokio::time::Instant;

use crate::data::chains::ChainRegistry;
use crate::data::classifier;
use crate::data::explorer::ExplorerSource;
use crate::data::labels::EntityLabeler;
use crate::data::provider::{NodeClient, NodeConnector};
use crate::data::types::{
    ChainConfig, Origin, ResolutionResult, SourceOfTruth, Transaction, TransactionDetail,
};
use crate::error::ResolveError;

/// Most transactions a result may hold.
pub const MAX_RESULTS: usize = 10;

/// Most blocks the backward scan examines.
pub const SCAN_BLOCK_CEILING: u64 = 8000;

#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub max_results: usize,
    pub block_ceiling: u64,
    /// Wall-clock budget for the backward scan. `None` means the scan is
    /// bounded only by `block_ceiling`.
    pub time_budget: Option<Duration>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            block_ceiling: SCAN_BLOCK_CEILING,
            time_budget: None,
        }
    }
}

/// Validate a `0x` + 64 hex character transaction hash.
pub fn parse_tx_hash(input: &str) -> Result<B256, ResolveError> {
    let input = input.trim();
    let valid = input.len() == 66
        && input.starts_with("0x")
        && input[2..].bytes().all(|b| b.is_ascii_hexdigit());
    if !valid {
        return Err(ResolveError::InvalidHash(input.to_string()));
    }
    input
        .parse()
        .map_err(|_| ResolveError::InvalidHash(input.to_string()))
}

/// Sources of wallet activity, tried in this order until one has an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivitySource {
    NodeScan,
    ExplorerFallback,
}

const ACTIVITY_SOURCES: [ActivitySource; 2] =
    [ActivitySource::NodeScan, ActivitySource::ExplorerFallback];

enum SourceOutcome {
    Found(Vec<Transaction>, SourceOfTruth),
    Empty,
    Unavailable(String),
}

/// A seed transaction together with the node and chain it was found on.
struct Located<'a> {
    chain: &'a ChainConfig,
    client: Box<dyn NodeClient>,
    tx: Transaction,
}

/// Looks up transactions by hash across the configured chains and resolves
/// the recent activity of the sending wallet.
pub struct Resolver {
    registry: Arc<ChainRegistry>,
    connector: Arc<dyn NodeConnector>,
    explorer: Arc<dyn ExplorerSource>,
    labeler: Arc<dyn EntityLabeler>,
    settings: ScanSettings,
}

impl Resolver {
    pub fn new(
        registry: Arc<ChainRegistry>,
        connector: Arc<dyn NodeConnector>,
        explorer: Arc<dyn ExplorerSource>,
        labeler: Arc<dyn EntityLabeler>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            registry,
            connector,
            explorer,
            labeler,
            settings,
        }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Whether the chain's node accepts connections and answers requests.
    pub async fn probe(&self, chain: &ChainConfig) -> bool {
        match self.connector.connect(chain).await {
            Ok(client) => client.is_reachable().await,
            Err(e) => {
                tracing::debug!(chain = %chain.name, error = %e, "probe failed");
                false
            }
        }
    }

    /// Find a single transaction with its receipt status and block time.
    pub async fn lookup(
        &self,
        hash: &str,
        chain_hint: Option<&str>,
    ) -> Result<TransactionDetail, ResolveError> {
        let hash = parse_tx_hash(hash)?;

        for chain in self.registry.candidates(chain_hint) {
            let client = match self.connector.connect(chain).await {
                Ok(client) => client,
                Err(e) => {
                    tracing::debug!(chain = %chain.name, error = %e, "node unavailable");
                    continue;
                }
            };

            let found = async {
                let tx = client.get_transaction(hash).await?;
                let receipt = client.get_receipt(hash).await?;
                let block_number = receipt.block_number.or(tx.block_number);
                let timestamp = match block_number {
                    Some(number) => Some(client.get_block(number, false).await?.timestamp),
                    None => None,
                };
                Ok::<_, crate::error::NodeError>((tx, receipt, block_number, timestamp))
            }
            .await;

            let (mut tx, receipt, block_number, timestamp) = match found {
                Ok(found) => found,
                Err(e) => {
                    tracing::debug!(chain = %chain.name, %hash, error = %e, "transaction not found on chain");
                    continue;
                }
            };
            tx.block_number = block_number;
            tx.block_timestamp = timestamp;

            let from_label = match tx.from {
                Some(from) => self.labeler.label_for(from).await,
                None => None,
            };
            let to_label = match tx.to {
                Some(to) => self.labeler.label_for(to).await,
                None => None,
            };
            let tx = classifier::annotate(tx, self.labeler.as_ref()).await;

            tracing::info!(chain = %chain.name, %hash, status = %receipt.status, "transaction found");
            return Ok(TransactionDetail {
                tx,
                chain_name: chain.name.clone(),
                status: receipt.status,
                from_label,
                to_label,
            });
        }

        Err(ResolveError::NotFound(format!("{hash:#x}")))
    }

    /// Resolve up to ten recent transactions of the wallet that sent
    /// `seed_hash`, scanning backwards on the node and falling back to the
    /// chain's explorer when the scan finds nothing.
    pub async fn resolve(
        &self,
        seed_hash: &str,
        chain_hint: Option<&str>,
    ) -> Result<ResolutionResult, ResolveError> {
        let seed_hash = parse_tx_hash(seed_hash)?;
        let located = self.locate_seed(seed_hash, chain_hint).await?;
        let wallet = located
            .tx
            .from
            .ok_or_else(|| ResolveError::NotFound(format!("{seed_hash:#x}")))?;

        tracing::info!(chain = %located.chain.name, %wallet, "resolving wallet activity");

        let mut blocks_scanned = 0;
        let mut failure = None;

        for source in ACTIVITY_SOURCES {
            let outcome = match source {
                ActivitySource::NodeScan => {
                    let (outcome, scanned) = self.scan_node(&located, wallet).await;
                    blocks_scanned = scanned;
                    outcome
                }
                ActivitySource::ExplorerFallback => self.query_explorer(located.chain, wallet).await,
            };

            match outcome {
                SourceOutcome::Found(txs, source_of_truth) => {
                    return Ok(self
                        .assemble(seed_hash, wallet, located.chain, txs, source_of_truth, blocks_scanned)
                        .await);
                }
                SourceOutcome::Empty => {
                    failure = Some(ResolveError::NoActivity {
                        wallet: format!("{wallet:#x}"),
                    });
                }
                SourceOutcome::Unavailable(reason) => {
                    failure = Some(ResolveError::FallbackUnavailable {
                        chain: located.chain.name.clone(),
                        reason,
                    });
                }
            }
        }

        let failure = failure.unwrap_or_else(|| ResolveError::NoActivity {
            wallet: format!("{wallet:#x}"),
        });

        tracing::info!(%wallet, error = %failure, "wallet activity unresolved");
        Err(failure)
    }

    /// First chain that returns the seed transaction wins.
    async fn locate_seed(
        &self,
        hash: B256,
        chain_hint: Option<&str>,
    ) -> Result<Located<'_>, ResolveError> {
        for chain in self.registry.candidates(chain_hint) {
            let client = match self.connector.connect(chain).await {
                Ok(client) => client,
                Err(e) => {
                    tracing::debug!(chain = %chain.name, error = %e, "node unavailable");
                    continue;
                }
            };
            match client.get_transaction(hash).await {
                Ok(tx) => return Ok(Located { chain, client, tx }),
                Err(e) => {
                    tracing::debug!(chain = %chain.name, %hash, error = %e, "seed transaction not on chain");
                }
            }
        }
        Err(ResolveError::NotFound(format!("{hash:#x}")))
    }

    /// Walk blocks downward from the seed's block, collecting transactions
    /// sent from or to the wallet. Failed block fetches count as empty blocks.
    async fn scan_node(&self, located: &Located<'_>, wallet: Address) -> (SourceOutcome, u64) {
        let client = located.client.as_ref();
        let start = match located.tx.block_number {
            Some(number) => Some(number),
            None => match client.current_block_number().await {
                Ok(head) => Some(head),
                Err(e) => {
                    tracing::debug!(chain = %located.chain.name, error = %e, "could not read chain head");
                    None
                }
            },
        };

        let deadline = self.settings.time_budget.map(|budget| Instant::now() + budget);
        let mut collected: Vec<Transaction> = Vec::new();
        let mut scanned = 0u64;
        let mut next = start;

        while let Some(number) = next {
            if collected.len() >= self.settings.max_results
                || scanned >= self.settings.block_ceiling
            {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::warn!(scanned, "scan time budget exhausted");
                break;
            }

            match client.get_block(number, true).await {
                Ok(block) => {
                    for tx in block.transactions {
                        if tx.touches(wallet) {
                            collected.push(tx);
                            if collected.len() >= self.settings.max_results {
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(block = number, error = %e, "could not fetch block");
                }
            }

            scanned += 1;
            next = number.checked_sub(1);
        }

        tracing::debug!(scanned, matches = collected.len(), "node scan finished");
        let outcome = if collected.is_empty() {
            SourceOutcome::Empty
        } else {
            SourceOutcome::Found(collected, SourceOfTruth::NodeScan)
        };
        (outcome, scanned)
    }

    async fn query_explorer(&self, chain: &ChainConfig, wallet: Address) -> SourceOutcome {
        tracing::debug!(chain = %chain.name, %wallet, "node scan found nothing, asking explorer");
        match self
            .explorer
            .list_recent(chain, wallet, self.settings.max_results)
            .await
        {
            Ok(txs) if txs.is_empty() => SourceOutcome::Empty,
            Ok(txs) => {
                let txs = txs
                    .into_iter()
                    .map(|mut tx| {
                        tx.origin = Origin::Explorer;
                        tx.with_explorer_links(chain)
                    })
                    .collect();
                SourceOutcome::Found(txs, SourceOfTruth::ExplorerFallback)
            }
            Err(e) => {
                tracing::warn!(chain = %chain.name, error = %e, "explorer fallback unavailable");
                SourceOutcome::Unavailable(e.to_string())
            }
        }
    }

    /// Sort newest first (stable for equal blocks), cap, classify and total.
    async fn assemble(
        &self,
        seed_hash: B256,
        wallet: Address,
        chain: &ChainConfig,
        mut txs: Vec<Transaction>,
        source_of_truth: SourceOfTruth,
        blocks_scanned: u64,
    ) -> ResolutionResult {
        txs.sort_by_key(|tx| Reverse(tx.block_number.unwrap_or(0)));
        txs.truncate(self.settings.max_results);

        let mut transactions = Vec::with_capacity(txs.len());
        for tx in txs {
            transactions.push(classifier::annotate(tx, self.labeler.as_ref()).await);
        }
        let total_value = transactions
            .iter()
            .fold(U256::ZERO, |acc, tx| acc.saturating_add(tx.value));

        tracing::info!(
            chain = %chain.name,
            %wallet,
            count = transactions.len(),
            source = %source_of_truth,
            "wallet activity resolved"
        );

        ResolutionResult {
            seed_hash,
            wallet,
            chain_name: chain.name.clone(),
            transactions,
            total_value,
            source_of_truth,
            blocks_scanned,
        }
    }
}
