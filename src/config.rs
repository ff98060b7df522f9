use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::data::labels::ARKHAM_BASE;
use crate::data::resolver::ScanSettings;

#[derive(Parser, Debug)]
#[command(
    name = "tx-tracker",
    about = "Look up transactions by hash and trace the recent activity of their sender"
)]
pub struct Config {
    /// Only search this chain (e.g. "Polygon Mainnet")
    #[arg(long, global = true, env = "TX_TRACKER_CHAIN")]
    pub chain: Option<String>,

    /// Start the TUI with a transaction hash already searched
    #[arg(short, long)]
    pub search: Option<String>,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100")]
    pub tick_rate_ms: u64,

    /// Timeout for each node RPC call
    #[arg(long, default_value = "10")]
    pub rpc_timeout_secs: u64,

    /// Timeout for each explorer or label request
    #[arg(long, default_value = "10")]
    pub explorer_timeout_secs: u64,

    /// Wall-clock budget for the backward block scan. Unbounded when unset.
    #[arg(long, global = true)]
    pub scan_budget_secs: Option<u64>,

    /// Extra env file with RPC URLs and API keys
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Directory the TUI writes exports into
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Arkham Intelligence API key for entity labels
    #[arg(long, env = "ARKHAM_API_KEY", hide_env_values = true)]
    pub arkham_api_key: Option<String>,

    /// Arkham API base URL
    #[arg(long, default_value = ARKHAM_BASE)]
    pub arkham_base: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a single transaction record
    Lookup {
        /// Transaction hash (0x + 64 hex chars)
        hash: String,
    },
    /// Print the recent activity of the wallet that sent a transaction
    Activity {
        /// Seed transaction hash
        hash: String,
        /// Print the chart payload as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write a transaction summary PDF
    Export {
        /// Transaction hash
        hash: String,
        /// Output path (defaults to tx_<hash prefix>.pdf)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List the chains that are searched and how each is configured
    Chains {
        /// Also connect to each node and report whether it answers
        #[arg(long)]
        probe: bool,
    },
}

impl Config {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn explorer_timeout(&self) -> Duration {
        Duration::from_secs(self.explorer_timeout_secs)
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            time_budget: self.scan_budget_secs.map(Duration::from_secs),
            ..ScanSettings::default()
        }
    }

    /// Chain hint with blank values treated as "all chains".
    pub fn chain_hint(&self) -> Option<&str> {
        self.chain.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::resolver::{MAX_RESULTS, SCAN_BLOCK_CEILING};

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["tx-tracker"]).unwrap();
        assert!(config.command.is_none());
        assert_eq!(config.tick_rate_ms, 100);
        assert_eq!(config.rpc_timeout(), Duration::from_secs(10));
        assert_eq!(config.explorer_timeout(), Duration::from_secs(10));
        assert_eq!(config.arkham_base, ARKHAM_BASE);

        let settings = config.scan_settings();
        assert_eq!(settings.max_results, MAX_RESULTS);
        assert_eq!(settings.block_ceiling, SCAN_BLOCK_CEILING);
        assert!(settings.time_budget.is_none());
    }

    #[test]
    fn test_subcommands() {
        let config = Config::try_parse_from([
            "tx-tracker",
            "activity",
            "0xabc",
            "--json",
            "--chain",
            "Sepolia Testnet",
            "--scan-budget-secs",
            "30",
        ])
        .unwrap();
        assert_eq!(
            config.command,
            Some(Command::Activity {
                hash: "0xabc".into(),
                json: true
            })
        );
        assert_eq!(config.chain_hint(), Some("Sepolia Testnet"));
        assert_eq!(
            config.scan_settings().time_budget,
            Some(Duration::from_secs(30))
        );

        let config =
            Config::try_parse_from(["tx-tracker", "export", "0xabc", "--out", "x.pdf"]).unwrap();
        assert_eq!(
            config.command,
            Some(Command::Export {
                hash: "0xabc".into(),
                out: Some(PathBuf::from("x.pdf"))
            })
        );

        assert!(Config::try_parse_from(["tx-tracker", "lookup"]).is_err());
    }

    #[test]
    fn test_blank_chain_means_all() {
        let config = Config::try_parse_from(["tx-tracker", "--chain", "  "]).unwrap();
        assert_eq!(config.chain_hint(), None);
    }
}
