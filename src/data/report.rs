use alloy::primitives::U256;
use serde::Serialize;

use crate::data::types::{ResolutionResult, TransactionDetail};
use crate::utils;

/// Per-transaction series for the activity chart, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub gas: Vec<u64>,
    pub hashes: Vec<String>,
}

/// Everything the activity view and its exports render.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    pub wallet: String,
    pub chain: String,
    pub seed_hash: String,
    pub source_of_truth: String,
    pub chart: ChartSeries,
    pub tx_count: usize,
    /// Sum of values in ether, rounded to six places.
    pub total_value: f64,
    #[serde(skip)]
    pub total_value_wei: U256,
}

impl ActivityReport {
    pub fn from_result(result: &ResolutionResult) -> Self {
        let mut chart = ChartSeries::default();
        for tx in &result.transactions {
            let block = tx
                .block_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "pending".to_string());
            let time = tx
                .block_timestamp
                .and_then(utils::format_minute)
                .unwrap_or_else(|| "unknown time".to_string());
            chart.labels.push(format!("{block} • {time}"));
            chart.values.push(utils::wei_to_ether_f64(tx.value));
            chart.gas.push(tx.gas_limit);
            chart.hashes.push(format!("{:#x}", tx.hash));
        }

        Self {
            wallet: result.wallet.to_checksum(None),
            chain: result.chain_name.clone(),
            seed_hash: format!("{:#x}", result.seed_hash),
            source_of_truth: result.source_of_truth.to_string(),
            tx_count: chart.labels.len(),
            chart,
            total_value: utils::wei_to_ether_f64(result.total_value),
            total_value_wei: result.total_value,
        }
    }
}

/// Flat, ordered key/value rendering of a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    pub fields: Vec<(&'static str, String)>,
}

impl TxRecord {
    pub fn from_detail(detail: &TransactionDetail) -> Self {
        let tx = &detail.tx;
        let address = |a: Option<alloy::primitives::Address>| {
            a.map(|a| a.to_checksum(None)).unwrap_or_default()
        };

        let fields = vec![
            ("Hash", format!("{:#x}", tx.hash)),
            ("Chain", detail.chain_name.clone()),
            ("Status", detail.status.to_string()),
            ("From", address(tx.from)),
            ("To", address(tx.to)),
            ("Value (ETH)", utils::format_u256_exact(tx.value, 18)),
            ("Gas (limit)", tx.gas_limit.to_string()),
            (
                "Gas Price (wei)",
                tx.gas_price.map(|p| p.to_string()).unwrap_or_default(),
            ),
            (
                "Block",
                tx.block_number.map(|n| n.to_string()).unwrap_or_default(),
            ),
            (
                "Block Timestamp (UTC)",
                tx.block_timestamp
                    .and_then(utils::format_iso_timestamp)
                    .unwrap_or_default(),
            ),
        ];
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `key: value` lines in field order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.fields.iter().map(|(k, v)| format!("{k}: {v}"))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256};

    use super::*;
    use crate::data::types::{SourceOfTruth, TxStatus, fixtures};

    fn result() -> ResolutionResult {
        let wallet = Address::repeat_byte(0x11);
        let mut newer = fixtures::tx(0x01, Some(wallet), Some(Address::repeat_byte(0x22)), 1001);
        newer.value = U256::from(1_500_000_000_000_000_000u64);
        newer.block_timestamp = Some(1_700_000_000);
        newer.gas_limit = 50_000;
        let older = fixtures::tx(0x02, Some(wallet), None, 1000);

        ResolutionResult {
            seed_hash: B256::repeat_byte(0xaa),
            wallet,
            chain_name: "TestChain".into(),
            total_value: newer.value + older.value,
            transactions: vec![newer, older],
            source_of_truth: SourceOfTruth::NodeScan,
            blocks_scanned: 2,
        }
    }

    #[test]
    fn test_activity_report_keeps_every_transaction() {
        let result = result();
        let report = ActivityReport::from_result(&result);

        assert_eq!(report.tx_count, 2);
        assert_eq!(report.chart.labels.len(), 2);
        assert_eq!(
            report.chart.labels,
            vec!["1001 • 2023-11-14 22:13", "1000 • unknown time"]
        );
        assert_eq!(report.chart.values, vec![1.5, 0.0]);
        assert_eq!(report.chart.gas, vec![50_000, 21_000]);
        assert_eq!(
            report.chart.hashes,
            result
                .transactions
                .iter()
                .map(|t| format!("{:#x}", t.hash))
                .collect::<Vec<_>>()
        );
        assert_eq!(report.total_value, 1.5);
        assert_eq!(report.total_value_wei, result.total_value);
        assert_eq!(report.source_of_truth, "node-scan");
        assert_eq!(report.chain, "TestChain");
    }

    #[test]
    fn test_activity_report_json_shape() {
        let report = ActivityReport::from_result(&result());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["chart"]["labels"][0], "1001 • 2023-11-14 22:13");
        assert_eq!(json["chart"]["values"][0], 1.5);
        assert_eq!(json["tx_count"], 2);
        assert!(json.get("total_value_wei").is_none());
    }

    #[test]
    fn test_tx_record_field_order_and_values() {
        let mut tx = fixtures::tx(0xbb, Some(Address::repeat_byte(0x11)), None, 42);
        tx.value = U256::from(2_000_000_000_000_000_000u64);
        tx.gas_price = Some(30_000_000_000);
        tx.block_timestamp = Some(1_700_000_000);
        let detail = TransactionDetail {
            tx: tx.clone(),
            chain_name: "Sepolia Testnet".into(),
            status: TxStatus::Failed,
            from_label: None,
            to_label: None,
        };

        let record = TxRecord::from_detail(&detail);
        let keys: Vec<&str> = record.fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "Hash",
                "Chain",
                "Status",
                "From",
                "To",
                "Value (ETH)",
                "Gas (limit)",
                "Gas Price (wei)",
                "Block",
                "Block Timestamp (UTC)"
            ]
        );
        assert_eq!(record.get("Hash"), Some(format!("{:#x}", tx.hash).as_str()));
        assert_eq!(record.get("Status"), Some("Failed"));
        assert_eq!(record.get("To"), Some(""));
        assert_eq!(record.get("Value (ETH)"), Some("2"));
        assert_eq!(record.get("Gas Price (wei)"), Some("30000000000"));
        assert_eq!(record.get("Block"), Some("42"));
        assert_eq!(record.get("Block Timestamp (UTC)"), Some("2023-11-14T22:13:20+00:00"));
        assert_eq!(
            record.get("From").map(str::to_lowercase),
            Some(format!("{:#x}", Address::repeat_byte(0x11)))
        );
        assert_eq!(record.lines().nth(2).as_deref(), Some("Status: Failed"));
    }
}
