use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::Deserialize;

use crate::data::types::{Category, ChainConfig, Origin, Transaction};
use crate::error::ExplorerError;

/// Recent transactions for an address from an indexing explorer.
///
/// Three outcomes are kept apart on purpose:
/// - `Err(_)`: the explorer is misconfigured or unreachable,
/// - `Ok(vec![])`: the explorer answered and knows of no activity,
/// - `Ok(txs)`: newest-first transactions.
#[async_trait]
pub trait ExplorerSource: Send + Sync {
    async fn list_recent(
        &self,
        chain: &ChainConfig,
        address: Address,
        limit: usize,
    ) -> Result<Vec<Transaction>, ExplorerError>;
}

/// Etherscan-compatible `account/txlist` client.
pub struct ExplorerClient {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TxListResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplorerTx {
    hash: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    gas: String,
    #[serde(default)]
    gas_price: String,
    #[serde(default)]
    block_number: String,
    #[serde(default, rename = "timeStamp")]
    time_stamp: String,
    #[serde(default)]
    input: String,
}

impl ExplorerClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ExplorerSource for ExplorerClient {
    async fn list_recent(
        &self,
        chain: &ChainConfig,
        address: Address,
        limit: usize,
    ) -> Result<Vec<Transaction>, ExplorerError> {
        if chain.explorer.api_base.is_empty() {
            return Err(ExplorerError::NotConfigured(chain.name.clone()));
        }
        let api_key = chain
            .explorer
            .api_key
            .as_deref()
            .ok_or_else(|| ExplorerError::MissingApiKey {
                env_var: chain.explorer.api_key_env.clone(),
            })?;

        let address = format!("{address:#x}");
        let offset = limit.to_string();
        let params = [
            ("module", "account"),
            ("action", "txlist"),
            ("address", address.as_str()),
            ("startblock", "0"),
            ("endblock", "99999999"),
            ("page", "1"),
            ("offset", offset.as_str()),
            ("sort", "desc"),
            ("apikey", api_key),
        ];

        let response = self
            .client
            .get(&chain.explorer.api_base)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;
        let body: TxListResponse = response.json().await?;

        // Etherscan reports "No transactions found" as status "0", which is a
        // valid empty answer rather than a failure.
        if body.status != "1" {
            tracing::debug!(
                chain = %chain.name,
                status = %body.status,
                message = body.message.as_deref().unwrap_or_default(),
                "explorer returned no transactions"
            );
            return Ok(Vec::new());
        }
        let entries = match body.result {
            serde_json::Value::Array(entries) => entries,
            _ => return Ok(Vec::new()),
        };

        // Records are decoded one at a time so a bad row is skipped instead
        // of failing the whole reply.
        let txs = entries
            .into_iter()
            .filter_map(|raw| {
                let tx = serde_json::from_value::<ExplorerTx>(raw)
                    .ok()
                    .and_then(|entry| to_transaction(&entry));
                if tx.is_none() {
                    tracing::debug!(chain = %chain.name, "skipping unparseable explorer transaction");
                }
                tx
            })
            .take(limit)
            .collect();
        Ok(txs)
    }
}

/// Map one explorer record into our transaction shape. Only the hash is
/// mandatory; other fields fall back to empty values as the explorer sends
/// everything as strings.
fn to_transaction(entry: &ExplorerTx) -> Option<Transaction> {
    let hash: B256 = entry.hash.parse().ok()?;
    let input = entry
        .input
        .parse::<Bytes>()
        .unwrap_or_default();
    let block_timestamp = entry.time_stamp.parse::<u64>().ok().filter(|ts| *ts > 0);

    Some(Transaction {
        hash,
        from: parse_address(&entry.from),
        to: parse_address(&entry.to),
        value: entry.value.parse::<U256>().unwrap_or(U256::ZERO),
        gas_limit: entry.gas.parse().unwrap_or(0),
        gas_price: entry.gas_price.parse().ok(),
        input,
        block_number: entry.block_number.parse().ok(),
        block_timestamp,
        category: Category::Unknown,
        label: None,
        origin: Origin::Explorer,
        explorer_url: None,
        to_explorer_url: None,
    })
}

fn parse_address(raw: &str) -> Option<Address> {
    if raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::data::types::fixtures;

    const WALLET: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

    fn chain_for(server: &MockServer) -> ChainConfig {
        let mut chain = fixtures::chain("TestChain");
        chain.explorer.api_base = format!("{}/api", server.uri());
        chain
    }

    fn explorer_tx(hash_byte: u8, block: u64) -> serde_json::Value {
        serde_json::json!({
            "blockNumber": block.to_string(),
            "timeStamp": "1700000000",
            "hash": format!("{:#x}", B256::repeat_byte(hash_byte)),
            "from": WALLET,
            "to": "0x000000000000000000000000000000000000dead",
            "value": "1000000000000000000",
            "gas": "21000",
            "gasPrice": "30000000000",
            "input": "0x",
        })
    }

    #[tokio::test]
    async fn test_list_recent_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("module", "account"))
            .and(query_param("action", "txlist"))
            .and(query_param("address", WALLET))
            .and(query_param("offset", "10"))
            .and(query_param("sort", "desc"))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": [explorer_tx(1, 300), explorer_tx(2, 200), explorer_tx(3, 100)],
            })))
            .mount(&server)
            .await;

        let client = ExplorerClient::new(Duration::from_secs(5));
        let wallet: Address = WALLET.parse().unwrap();
        let txs = client
            .list_recent(&chain_for(&server), wallet, 10)
            .await
            .unwrap();

        assert_eq!(txs.len(), 3);
        assert!(txs.iter().all(|t| t.origin == Origin::Explorer));
        assert_eq!(txs[0].block_number, Some(300));
        assert_eq!(txs[0].from, Some(wallet));
        assert_eq!(txs[0].value, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(txs[0].gas_limit, 21_000);
        assert_eq!(txs[0].gas_price, Some(30_000_000_000));
        assert_eq!(txs[0].block_timestamp, Some(1_700_000_000));
        assert!(txs[0].input.is_empty());
    }

    #[tokio::test]
    async fn test_list_recent_no_transactions_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "0",
                "message": "No transactions found",
                "result": [],
            })))
            .mount(&server)
            .await;

        let client = ExplorerClient::new(Duration::from_secs(5));
        let txs = client
            .list_recent(&chain_for(&server), Address::ZERO, 10)
            .await
            .unwrap();
        assert!(txs.is_empty());
    }

    #[tokio::test]
    async fn test_list_recent_missing_key() {
        let server = MockServer::start().await;
        let mut chain = chain_for(&server);
        chain.explorer.api_key = None;

        let client = ExplorerClient::new(Duration::from_secs(5));
        let result = client.list_recent(&chain, Address::ZERO, 10).await;
        match result {
            Err(ExplorerError::MissingApiKey { env_var }) => assert_eq!(env_var, "TEST_EXPLORER_KEY"),
            other => panic!("expected missing key, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_recent_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = ExplorerClient::new(Duration::from_secs(5));
        let result = client
            .list_recent(&chain_for(&server), Address::ZERO, 10)
            .await;
        assert!(matches!(result, Err(ExplorerError::Http(_))));
    }

    #[tokio::test]
    async fn test_list_recent_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&server)
            .await;

        let client = ExplorerClient::new(Duration::from_secs(5));
        let result = client
            .list_recent(&chain_for(&server), Address::ZERO, 10)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_recent_skips_bad_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": [
                    explorer_tx(1, 300),
                    { "from": WALLET, "blockNumber": "250" },
                    { "hash": "not-a-hash", "blockNumber": "220" },
                    explorer_tx(2, 200),
                ],
            })))
            .mount(&server)
            .await;

        let client = ExplorerClient::new(Duration::from_secs(5));
        let txs = client
            .list_recent(&chain_for(&server), Address::ZERO, 10)
            .await
            .unwrap();
        let blocks: Vec<Option<u64>> = txs.iter().map(|t| t.block_number).collect();
        assert_eq!(blocks, vec![Some(300), Some(200)]);
    }

    #[test]
    fn test_to_transaction_contract_creation() {
        let entry = ExplorerTx {
            hash: format!("{:#x}", B256::repeat_byte(9)),
            from: WALLET.to_string(),
            to: String::new(),
            value: "0".to_string(),
            gas: "500000".to_string(),
            gas_price: String::new(),
            block_number: "42".to_string(),
            time_stamp: String::new(),
            input: "0x6080604052".to_string(),
        };
        let tx = to_transaction(&entry).unwrap();
        assert!(tx.to.is_none());
        assert_eq!(tx.input.len(), 5);
        assert_eq!(tx.block_number, Some(42));
        assert!(tx.block_timestamp.is_none());
        assert!(tx.gas_price.is_none());
    }

    #[test]
    fn test_to_transaction_bad_hash() {
        let entry = ExplorerTx {
            hash: "0x1234".to_string(),
            from: String::new(),
            to: String::new(),
            value: String::new(),
            gas: String::new(),
            gas_price: String::new(),
            block_number: String::new(),
            time_stamp: String::new(),
            input: String::new(),
        };
        assert!(to_transaction(&entry).is_none());
    }
}
