use alloy::primitives::{Address, Bytes, B256, U256};

/// Static description of one supported chain: where its node lives and how to
/// reach its block explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub name: String,
    pub aliases: Vec<String>,
    pub chain_id: u64,
    pub symbol: String,
    pub rpc_url: Option<String>,
    pub explorer: ExplorerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    pub api_base: String,
    /// Name of the environment variable the key was read from.
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub tx_url_template: String,
    pub addr_url_template: String,
}

impl ChainConfig {
    /// Case-insensitive match against the display name and any alias.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.name.eq_ignore_ascii_case(name) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    pub fn tx_url(&self, hash: &B256) -> String {
        self.explorer.tx_url_template.replace("{}", &format!("{hash:#x}"))
    }

    pub fn address_url(&self, address: &Address) -> String {
        self.explorer
            .addr_url_template
            .replace("{}", &format!("{address:#x}"))
    }
}

/// Where a transaction record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Node,
    Explorer,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Node => write!(f, "node"),
            Origin::Explorer => write!(f, "explorer"),
        }
    }
}

/// Coarse category derived from the call data and the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Transfer,
    Erc20Transfer,
    Erc721Transfer,
    ContractCreation,
    ContractInteraction,
    Unknown,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Transfer => write!(f, "Transfer"),
            Category::Erc20Transfer => write!(f, "ERC-20 Transfer"),
            Category::Erc721Transfer => write!(f, "ERC-721 Transfer"),
            Category::ContractCreation => write!(f, "Contract Creation"),
            Category::ContractInteraction => write!(f, "Contract Interaction"),
            Category::Unknown => write!(f, "Unknown"),
        }
    }
}

/// An entity label attached to one side of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityLabel {
    Source(String),
    Dest(String),
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityLabel::Source(label) => write!(f, "Source: {label}"),
            EntityLabel::Dest(label) => write!(f, "Dest: {label}"),
        }
    }
}

/// The one transaction shape used everywhere past the node and explorer
/// adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub hash: B256,
    pub from: Option<Address>,
    /// `None` means contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: Option<u128>,
    pub input: Bytes,
    pub block_number: Option<u64>,
    pub block_timestamp: Option<u64>,
    pub category: Category,
    pub label: Option<EntityLabel>,
    pub origin: Origin,
    pub explorer_url: Option<String>,
    pub to_explorer_url: Option<String>,
}

impl Transaction {
    /// True when the wallet is the sender or the recipient. A transaction
    /// without a sender never qualifies. `Address` equality is byte equality,
    /// so checksum casing in the source data does not matter.
    pub fn touches(&self, wallet: Address) -> bool {
        match self.from {
            Some(from) => from == wallet || self.to == Some(wallet),
            None => false,
        }
    }

    pub fn with_classification(mut self, category: Category, label: Option<EntityLabel>) -> Self {
        self.category = category;
        self.label = label;
        self
    }

    pub fn with_explorer_links(mut self, chain: &ChainConfig) -> Self {
        self.explorer_url = Some(chain.tx_url(&self.hash));
        self.to_explorer_url = self.to.map(|to| chain.address_url(&to));
        self
    }

    /// The label if one was found, otherwise the heuristic category.
    pub fn annotation(&self) -> String {
        match &self.label {
            Some(label) => label.to_string(),
            None => self.category.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failed,
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxStatus::Success => write!(f, "Success"),
            TxStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptInfo {
    pub status: TxStatus,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct BlockData {
    pub number: u64,
    pub timestamp: u64,
    /// Empty unless the block was fetched with bodies.
    pub transactions: Vec<Transaction>,
}

/// A single transaction looked up by hash, with its receipt status.
#[derive(Debug, Clone)]
pub struct TransactionDetail {
    pub tx: Transaction,
    pub chain_name: String,
    pub status: TxStatus,
    pub from_label: Option<String>,
    pub to_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOfTruth {
    NodeScan,
    ExplorerFallback,
}

impl std::fmt::Display for SourceOfTruth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceOfTruth::NodeScan => write!(f, "node-scan"),
            SourceOfTruth::ExplorerFallback => write!(f, "explorer-fallback"),
        }
    }
}

/// Recent activity of the wallet that sent a seed transaction.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    pub seed_hash: B256,
    pub wallet: Address,
    pub chain_name: String,
    /// Newest first, at most ten entries.
    pub transactions: Vec<Transaction>,
    pub total_value: U256,
    pub source_of_truth: SourceOfTruth,
    pub blocks_scanned: u64,
}
