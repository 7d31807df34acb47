//! Faucet configuration

use crate::error::{FaucetError, FaucetResult};
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Faucet service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaucetConfig {
    /// Server address
    pub server_addr: String,

    /// JSON-RPC endpoint of the test network node
    pub rpc_url: String,

    /// Node-managed account that funds claims
    pub faucet_account: String,

    /// Name of the single supported test network
    pub test_net_name: String,

    /// Amount per direct claim (in wei)
    pub amount: String,

    /// Amount per tweet claim (in wei)
    pub tweet_amount: String,

    /// Faucet balance below which pre-checks fail (in wei)
    pub min_balance: String,

    /// Admission ceiling per window
    pub admission_limit: u32,

    /// Admission window length in milliseconds
    pub admission_window_ms: u64,

    /// How long a committed claim blocks its address (seconds)
    pub eligibility_window_secs: u64,

    /// How long an unresolved reservation blocks its address (seconds)
    pub reservation_timeout_secs: u64,

    /// Timeout for each chain RPC call (seconds)
    pub rpc_timeout_secs: u64,

    /// Database path
    pub db_path: String,

    /// Interval of the expired-record sweep (seconds, 0 disables it)
    pub purge_interval_secs: u64,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:8080".to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            faucet_account: "0x0000000000000000000000000000000000000000".to_string(),
            test_net_name: "testnet".to_string(),
            amount: "1000000000000000000".to_string(), // 1 ETH
            tweet_amount: "5000000000000000000".to_string(), // 5 ETH
            min_balance: "100000000000000000000".to_string(), // 100 ETH
            admission_limit: 200,
            admission_window_ms: 1000,
            eligibility_window_secs: 86400, // 24 hours
            reservation_timeout_secs: 300,
            rpc_timeout_secs: 30,
            db_path: "./faucet_data".to_string(),
            purge_interval_secs: 3600,
            cors_enabled: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl FaucetConfig {
    /// Load defaults, then an optional config file, then `FAUCET_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `FAUCET_LOGGING__LEVEL=debug`.
    pub fn load(path: Option<&Path>) -> FaucetResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            let path_str = path
                .to_str()
                .ok_or_else(|| FaucetError::Config(format!("Invalid config path: {:?}", path)))?;
            builder = builder.add_source(File::with_name(path_str));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("FAUCET")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| FaucetError::Config(format!("Failed to build configuration: {}", e)))?;

        settings
            .try_deserialize::<FaucetConfig>()
            .map_err(|e| FaucetError::Config(format!("Failed to deserialize configuration: {}", e)))
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> FaucetResult<()> {
        if self.test_net_name.trim().is_empty() {
            return Err(FaucetError::Config("test_net_name must not be empty".to_string()));
        }
        if self.admission_limit == 0 {
            return Err(FaucetError::Config("admission_limit must be positive".to_string()));
        }
        if self.admission_window_ms == 0 {
            return Err(FaucetError::Config("admission_window_ms must be positive".to_string()));
        }
        if self.eligibility_window_secs == 0 {
            return Err(FaucetError::Config("eligibility_window_secs must be positive".to_string()));
        }
        if self.reservation_timeout_secs == 0 {
            return Err(FaucetError::Config("reservation_timeout_secs must be positive".to_string()));
        }
        // A dispatch may run for the whole RPC timeout while holding its reservation.
        if self.reservation_timeout_secs <= self.rpc_timeout_secs {
            return Err(FaucetError::Config(format!(
                "reservation_timeout_secs ({}) must exceed rpc_timeout_secs ({})",
                self.reservation_timeout_secs, self.rpc_timeout_secs
            )));
        }
        self.amount_wei()?;
        self.tweet_amount_wei()?;
        self.min_balance_wei()?;
        Ok(())
    }

    pub fn amount_wei(&self) -> FaucetResult<u128> {
        parse_wei("amount", &self.amount)
    }

    pub fn tweet_amount_wei(&self) -> FaucetResult<u128> {
        parse_wei("tweet_amount", &self.tweet_amount)
    }

    pub fn min_balance_wei(&self) -> FaucetResult<u128> {
        parse_wei("min_balance", &self.min_balance)
    }

    /// Get admission window duration
    pub fn admission_window(&self) -> Duration {
        Duration::from_millis(self.admission_window_ms)
    }

    /// Get eligibility window duration
    pub fn eligibility_window(&self) -> Duration {
        Duration::from_secs(self.eligibility_window_secs)
    }

    /// Get reservation timeout duration
    pub fn reservation_timeout(&self) -> Duration {
        Duration::from_secs(self.reservation_timeout_secs)
    }

    /// Get RPC timeout duration
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

fn parse_wei(field: &str, value: &str) -> FaucetResult<u128> {
    value
        .trim()
        .parse::<u128>()
        .map_err(|e| FaucetError::Config(format!("{} is not a wei amount ({}): {}", field, value, e)))
}
