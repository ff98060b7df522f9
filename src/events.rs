use alloy::primitives::B256;

use crate::data::resolver::parse_tx_hash;
use crate::data::types::{ResolutionResult, TransactionDetail};
use crate::error::ResolveError;

/// Views the user can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Welcome,
    TransactionDetail(B256),
    WalletActivity(B256),
}

/// A validated search: a transaction hash and an optional chain restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub hash: B256,
    pub chain: Option<String>,
}

impl SearchQuery {
    pub fn parse(input: &str, chain: Option<&str>) -> Result<SearchQuery, ResolveError> {
        let hash = parse_tx_hash(input)?;
        let chain = chain
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok(SearchQuery { hash, chain })
    }
}

/// What a view asks to have written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Pdf,
    Csv,
    Json,
}

/// Events sent from background data tasks to the main app loop
#[derive(Debug)]
pub enum AppEvent {
    // Data loaded
    TransactionLoaded(Box<TransactionDetail>),
    ActivityLoaded(Box<ResolutionResult>),
    LookupFailed(ResolveError),

    // Export
    ExportRequested(ExportKind),
    ExportComplete(String),

    // Navigation
    Navigate(View),
    Back,

    // Status
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890";

    #[test]
    fn test_parse_tx_hash() {
        let query = SearchQuery::parse(HASH, None).unwrap();
        assert_eq!(format!("{:#x}", query.hash), HASH);
        assert!(query.chain.is_none());
    }

    #[test]
    fn test_parse_with_chain() {
        let query = SearchQuery::parse(HASH, Some(" polygon ")).unwrap();
        assert_eq!(query.chain.as_deref(), Some("polygon"));
    }

    #[test]
    fn test_parse_blank_chain_means_all() {
        let query = SearchQuery::parse(HASH, Some("   ")).unwrap();
        assert!(query.chain.is_none());
    }

    #[test]
    fn test_parse_whitespace_trimming() {
        assert!(SearchQuery::parse(&format!("  {HASH}  "), None).is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "0x", "hello world", "0xZZZZ", "19234567"] {
            assert!(matches!(
                SearchQuery::parse(input, None),
                Err(ResolveError::InvalidHash(_))
            ));
        }
    }

    #[test]
    fn test_parse_address_is_not_a_hash() {
        let address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        assert!(SearchQuery::parse(address, None).is_err());
    }
}
