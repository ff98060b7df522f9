use std::time::Duration;

use thiserror::Error;

/// Failures a caller of the resolver can see. Each variant renders as a
/// distinct message in the UI and on the command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid transaction hash format: {0}")]
    InvalidHash(String),

    #[error("Transaction {0} not found on the selected chain(s)")]
    NotFound(String),

    #[error("No recent transactions found for wallet {wallet}")]
    NoActivity { wallet: String },

    #[error("Explorer API error or missing API key for {chain}: {reason}. Check explorer keys in variables.env")]
    FallbackUnavailable { chain: String, reason: String },
}

/// A single failed node call. Always absorbed by the resolver.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("no RPC endpoint configured for {0}")]
    NotConfigured(String),

    #[error("invalid RPC url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0} not found")]
    NotFound(String),
}

impl From<alloy::transports::TransportError> for NodeError {
    fn from(err: alloy::transports::TransportError) -> Self {
        NodeError::Transport(err.to_string())
    }
}

/// A failed explorer call. Only surfaces as `ResolveError::FallbackUnavailable`.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("explorer API key missing (env var {env_var})")]
    MissingApiKey { env_var: String },

    #[error("no explorer configured for {0}")]
    NotConfigured(String),

    #[error("explorer request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}
