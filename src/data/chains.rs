use crate::data::types::{ChainConfig, ExplorerConfig};

struct ChainPreset {
    name: &'static str,
    aliases: &'static [&'static str],
    chain_id: u64,
    symbol: &'static str,
    rpc_env: &'static str,
    api_base: &'static str,
    api_key_env: &'static str,
    tx_url_template: &'static str,
    addr_url_template: &'static str,
}

/// Supported chains, in the order they are tried when no chain is selected.
const PRESETS: &[ChainPreset] = &[
    ChainPreset {
        name: "Ethereum Mainnet",
        aliases: &["ethereum", "eth", "mainnet"],
        chain_id: 1,
        symbol: "ETH",
        rpc_env: "WEB3_MAINNET",
        api_base: "https://api.etherscan.io/api",
        api_key_env: "ETHERSCAN_API_KEY",
        tx_url_template: "https://etherscan.io/tx/{}",
        addr_url_template: "https://etherscan.io/address/{}",
    },
    ChainPreset {
        name: "Sepolia Testnet",
        aliases: &["sepolia"],
        chain_id: 11155111,
        symbol: "ETH",
        rpc_env: "WEB3_SEPOLIA",
        api_base: "https://api-sepolia.etherscan.io/api",
        api_key_env: "ETHERSCAN_API_KEY",
        tx_url_template: "https://sepolia.etherscan.io/tx/{}",
        addr_url_template: "https://sepolia.etherscan.io/address/{}",
    },
    ChainPreset {
        name: "Polygon Mainnet",
        aliases: &["polygon", "matic"],
        chain_id: 137,
        symbol: "MATIC",
        rpc_env: "WEB3_POLYGON",
        api_base: "https://api.polygonscan.com/api",
        api_key_env: "POLYGONSCAN_API_KEY",
        tx_url_template: "https://polygonscan.com/tx/{}",
        addr_url_template: "https://polygonscan.com/address/{}",
    },
    ChainPreset {
        name: "Binance Smart Chain",
        aliases: &["bsc", "bnb"],
        chain_id: 56,
        symbol: "BNB",
        rpc_env: "WEB3_BSC",
        api_base: "https://api.bscscan.com/api",
        api_key_env: "BSCSCAN_API_KEY",
        tx_url_template: "https://bscscan.com/tx/{}",
        addr_url_template: "https://bscscan.com/address/{}",
    },
];

/// Immutable, ordered set of chain configurations. Built once at startup and
/// shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainConfig>,
}

impl ChainRegistry {
    pub fn new(chains: Vec<ChainConfig>) -> Self {
        Self { chains }
    }

    /// Build the registry from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the registry, reading RPC urls and explorer keys through `lookup`.
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let chains = PRESETS
            .iter()
            .map(|preset| {
                let rpc_url = read(preset.rpc_env);
                if rpc_url.is_none() {
                    tracing::warn!(chain = preset.name, env = preset.rpc_env, "no RPC endpoint configured");
                }
                ChainConfig {
                    name: preset.name.to_string(),
                    aliases: preset.aliases.iter().map(|a| a.to_string()).collect(),
                    chain_id: preset.chain_id,
                    symbol: preset.symbol.to_string(),
                    rpc_url,
                    explorer: ExplorerConfig {
                        api_base: preset.api_base.to_string(),
                        api_key_env: preset.api_key_env.to_string(),
                        api_key: read(preset.api_key_env),
                        tx_url_template: preset.tx_url_template.to_string(),
                        addr_url_template: preset.addr_url_template.to_string(),
                    },
                }
            })
            .collect();

        Self { chains }
    }

    /// Look up a chain by name or alias, ignoring case.
    pub fn get(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.matches(name))
    }

    /// Chains to search for a query: only the hinted chain when a hint is
    /// given (nothing if the hint is unknown), otherwise every chain in order.
    pub fn candidates(&self, hint: Option<&str>) -> Vec<&ChainConfig> {
        match hint.map(str::trim).filter(|h| !h.is_empty()) {
            Some(name) => self.get(name).into_iter().collect(),
            None => self.chains.iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.chains.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use alloy::primitives::{Address, B256};

    use super::*;

    fn registry_with(vars: &[(&str, &str)]) -> ChainRegistry {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ChainRegistry::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_registry_order() {
        let registry = registry_with(&[]);
        assert_eq!(
            registry.names(),
            vec![
                "Ethereum Mainnet",
                "Sepolia Testnet",
                "Polygon Mainnet",
                "Binance Smart Chain"
            ]
        );
        assert_eq!(registry.names().len(), 4);
    }

    #[test]
    fn test_rpc_urls_from_env() {
        let registry = registry_with(&[("WEB3_MAINNET", "https://eth.example"), ("WEB3_BSC", "  ")]);
        let eth = registry.get("Ethereum Mainnet").unwrap();
        assert_eq!(eth.rpc_url.as_deref(), Some("https://eth.example"));
        assert!(registry.get("bsc").unwrap().rpc_url.is_none());
        assert!(registry.get("polygon").unwrap().rpc_url.is_none());
    }

    #[test]
    fn test_explorer_keys_shared_by_env_var() {
        let registry = registry_with(&[("ETHERSCAN_API_KEY", "abc")]);
        assert_eq!(registry.get("mainnet").unwrap().explorer.api_key.as_deref(), Some("abc"));
        assert_eq!(registry.get("sepolia").unwrap().explorer.api_key.as_deref(), Some("abc"));
        assert!(registry.get("polygon").unwrap().explorer.api_key.is_none());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = registry_with(&[]);
        assert!(registry.get("ethereum mainnet").is_some());
        assert!(registry.get("POLYGON MAINNET").is_some());
        assert!(registry.get("Matic").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_candidates() {
        let registry = registry_with(&[]);
        assert_eq!(registry.candidates(None).len(), 4);
        assert_eq!(registry.candidates(Some("")).len(), 4);

        let hinted = registry.candidates(Some("polygon mainnet"));
        assert_eq!(hinted.len(), 1);
        assert_eq!(hinted[0].name, "Polygon Mainnet");

        assert!(registry.candidates(Some("solana")).is_empty());
    }

    #[test]
    fn test_polygon_config() {
        let registry = registry_with(&[]);
        let config = registry.get("polygon").unwrap();
        assert_eq!(config.chain_id, 137);
        assert_eq!(config.symbol, "MATIC");
        assert_eq!(config.explorer.api_key_env, "POLYGONSCAN_API_KEY");
    }

    #[test]
    fn test_sepolia_links_use_etherscan() {
        let registry = registry_with(&[]);
        let sepolia = registry.get("sepolia").unwrap();
        assert_eq!(
            sepolia.address_url(&Address::ZERO),
            "https://sepolia.etherscan.io/address/0x0000000000000000000000000000000000000000"
        );
        assert!(sepolia.tx_url(&B256::ZERO).starts_with("https://sepolia.etherscan.io/tx/0x"));
    }
}
