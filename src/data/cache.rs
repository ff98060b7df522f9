use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use alloy::primitives::B256;
use lru::LruCache;

use crate::data::types::{ResolutionResult, TransactionDetail};

/// Mined transactions never change.
const TX_TTL: Duration = Duration::from_secs(3600);
/// Wallet activity grows as new blocks arrive.
const ACTIVITY_TTL: Duration = Duration::from_secs(60);

const TX_CACHE_SIZE: usize = 200;
const ACTIVITY_CACHE_SIZE: usize = 50;

/// Lookup key: the hash plus the normalized chain hint it was searched with.
type Key = (B256, Option<String>);

fn key(hash: B256, chain_hint: Option<&str>) -> Key {
    let hint = chain_hint
        .map(|c| c.trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty());
    (hash, hint)
}

fn capacity(size: usize) -> NonZeroUsize {
    NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN)
}

/// Per-session memo of finished lookups for the interactive UI, so that
/// moving back and forth between views does not repeat a block scan.
pub struct DataCache {
    transactions: LruCache<Key, (Instant, TransactionDetail)>,
    activity: LruCache<Key, (Instant, ResolutionResult)>,
}

impl DataCache {
    pub fn new() -> Self {
        Self {
            transactions: LruCache::new(capacity(TX_CACHE_SIZE)),
            activity: LruCache::new(capacity(ACTIVITY_CACHE_SIZE)),
        }
    }

    // --- Transaction Detail ---

    /// Get a cached transaction detail, returning a clone. Returns None if expired or missing.
    pub fn get_transaction(&mut self, hash: B256, chain_hint: Option<&str>) -> Option<TransactionDetail> {
        let key = key(hash, chain_hint);
        let entry = self.transactions.get(&key)?;
        if entry.0.elapsed() < TX_TTL {
            Some(entry.1.clone())
        } else {
            self.transactions.pop(&key);
            None
        }
    }

    pub fn put_transaction(&mut self, hash: B256, chain_hint: Option<&str>, detail: TransactionDetail) {
        self.transactions
            .put(key(hash, chain_hint), (Instant::now(), detail));
    }

    // --- Wallet Activity ---

    pub fn get_activity(&mut self, hash: B256, chain_hint: Option<&str>) -> Option<ResolutionResult> {
        let key = key(hash, chain_hint);
        let entry = self.activity.get(&key)?;
        if entry.0.elapsed() < ACTIVITY_TTL {
            Some(entry.1.clone())
        } else {
            self.activity.pop(&key);
            None
        }
    }

    pub fn put_activity(&mut self, hash: B256, chain_hint: Option<&str>, result: ResolutionResult) {
        self.activity
            .put(key(hash, chain_hint), (Instant::now(), result));
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, U256};

    use super::*;
    use crate::data::types::{SourceOfTruth, TxStatus, fixtures};

    fn detail() -> TransactionDetail {
        TransactionDetail {
            tx: fixtures::tx(1, Some(Address::repeat_byte(1)), None, 5),
            chain_name: "TestChain".into(),
            status: TxStatus::Success,
            from_label: None,
            to_label: None,
        }
    }

    #[test]
    fn test_transaction_roundtrip() {
        let mut cache = DataCache::new();
        let hash = B256::repeat_byte(1);
        assert!(cache.get_transaction(hash, None).is_none());
        cache.put_transaction(hash, None, detail());
        assert_eq!(cache.get_transaction(hash, None).unwrap().chain_name, "TestChain");
    }

    #[test]
    fn test_chain_hint_is_part_of_key() {
        let mut cache = DataCache::new();
        let hash = B256::repeat_byte(1);
        cache.put_transaction(hash, Some(" Sepolia "), detail());
        assert!(cache.get_transaction(hash, Some("sepolia")).is_some());
        assert!(cache.get_transaction(hash, None).is_none());
        // A blank hint is the same as no hint.
        cache.put_transaction(hash, Some(""), detail());
        assert!(cache.get_transaction(hash, None).is_some());
    }

    #[test]
    fn test_activity_roundtrip() {
        let mut cache = DataCache::new();
        let hash = B256::repeat_byte(2);
        let result = ResolutionResult {
            seed_hash: hash,
            wallet: Address::repeat_byte(1),
            chain_name: "TestChain".into(),
            transactions: vec![],
            total_value: U256::ZERO,
            source_of_truth: SourceOfTruth::ExplorerFallback,
            blocks_scanned: 8000,
        };
        cache.put_activity(hash, None, result);
        let cached = cache.get_activity(hash, None).unwrap();
        assert_eq!(cached.source_of_truth, SourceOfTruth::ExplorerFallback);
        assert!(cache.get_activity(B256::ZERO, None).is_none());
    }
}
