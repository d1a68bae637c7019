//! Configuration Loader
//!
//! Layers a TOML file under `MEMETRADER__*` environment variables, then
//! applies the two flat overrides `MEMETRADER_API_URL` and
//! `MEMETRADER_PRIVATE_KEY`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::evm::WalletProviderConfig;
use crate::adapters::http::{ApiConfig, DEFAULT_API_BASE_URL};

/// Default location of the config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/memetrader.toml";

pub const ENV_PREFIX: &str = "MEMETRADER";
pub const API_URL_ENV: &str = "MEMETRADER_API_URL";
pub const PRIVATE_KEY_ENV: &str = "MEMETRADER_PRIVATE_KEY";

/// Main configuration structure. Every section falls back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSection,
    pub chain: ChainSection,
    pub polling: PollingSection,
    pub assets: AssetsSection,
    pub logging: LoggingSection,
}

/// Backend REST API section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiSection {
    pub fn client_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Chain section. The defaults point at a local dev node with the
/// contracts at their first two deterministic deploy addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSection {
    pub rpc_url: String,
    pub factory_address: String,
    pub copy_trading_address: String,
    /// Signer key (NEVER commit this, prefer MEMETRADER_PRIVATE_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            factory_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            copy_trading_address: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".to_string(),
            private_key: None,
        }
    }
}

impl ChainSection {
    pub fn wallet_provider(&self) -> WalletProviderConfig {
        WalletProviderConfig {
            rpc_url: self.rpc_url.clone(),
            private_key: self.private_key.clone(),
            factory_address: self.factory_address.clone(),
            copy_trading_address: self.copy_trading_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSection {
    /// Copy-trading leaderboard refresh period
    pub trader_refresh_secs: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            trader_refresh_secs: 30,
        }
    }
}

impl PollingSection {
    pub fn trader_refresh(&self) -> Duration {
        Duration::from_secs(self.trader_refresh_secs)
    }
}

/// Local asset locations. `~` is expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    /// Directory holding `stock_data_1years/`
    pub root: String,
    /// Where wallet exports are written
    pub export_dir: String,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            root: "assets".to_string(),
            export_dir: "exports".to_string(),
        }
    }
}

impl AssetsSection {
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.root).as_ref())
    }

    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.export_dir).as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Failed to write config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Load configuration from a TOML file that must exist
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    load_with_env(Some(path), process_env())
}

/// Load configuration from `path` if it exists, defaults otherwise
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_with_env(Some(path), process_env())
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        load_with_env(None, process_env())
    }
}

fn process_env() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .collect()
}

/// Build the layered configuration against an explicit environment
pub fn load_with_env(
    path: Option<&Path>,
    env: HashMap<String, String>,
) -> Result<Config, ConfigError> {
    let api_url = env.get(API_URL_ENV).cloned();
    let private_key = env.get(PRIVATE_KEY_ENV).cloned();

    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(env)),
        )
        .set_override_option("api.base_url", api_url)?
        .set_override_option("chain.private_key", private_key)?
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url cannot be empty".to_string(),
            ));
        }

        if let Err(e) = reqwest::Url::parse(&self.api.base_url) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url is not a valid URL ({}): {}",
                self.api.base_url, e
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.chain.rpc_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chain.rpc_url cannot be empty".to_string(),
            ));
        }

        for (field, value) in [
            ("chain.factory_address", &self.chain.factory_address),
            ("chain.copy_trading_address", &self.chain.copy_trading_address),
        ] {
            if Address::from_str(value.trim()).is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "{} is not a valid address, got '{}'",
                    field, value
                )));
            }
        }

        if self.polling.trader_refresh_secs == 0 {
            return Err(ConfigError::ValidationError(
                "polling.trader_refresh_secs must be > 0".to_string(),
            ));
        }

        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be trace|debug|info|warn|error, got '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

/// Write a default config file. Refuses to overwrite unless `force`.
pub fn write_default_config<P: AsRef<Path>>(path: P, force: bool) -> Result<PathBuf, ConfigError> {
    let path = path.as_ref();
    if path.exists() && !force {
        return Err(ConfigError::ValidationError(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, body)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn create_valid_config() -> String {
        r#"
[api]
base_url = "https://memetrader.example.com/api"
timeout_secs = 10

[chain]
rpc_url = "https://rpc.example.com"
factory_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
copy_trading_address = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"

[polling]
trader_refresh_secs = 15

[assets]
root = "~/memetrader/assets"
export_dir = "out"

[logging]
level = "debug"
"#
        .to_string()
    }

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write(&create_valid_config());
        let config = load_with_env(Some(file.path()), HashMap::new()).unwrap();

        assert_eq!(config.api.base_url, "https://memetrader.example.com/api");
        assert_eq!(config.api.client_config().timeout, Duration::from_secs(10));
        assert_eq!(config.polling.trader_refresh(), Duration::from_secs(15));
        assert_eq!(config.logging.level, "debug");
        assert!(config.chain.private_key.is_none());
        assert!(config.assets.root_path().ends_with("memetrader/assets"));
        assert_eq!(config.assets.export_path(), PathBuf::from("out"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/memetrader.toml");
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_with_env(None, HashMap::new()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.polling.trader_refresh_secs, 30);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write("[polling]\ntrader_refresh_secs = 5\n");
        let config = load_with_env(Some(file.path()), HashMap::new()).unwrap();
        assert_eq!(config.polling.trader_refresh_secs, 5);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_env_overrides() {
        let file = write(&create_valid_config());
        let env = HashMap::from([
            (API_URL_ENV.to_string(), "http://10.0.0.2:3001/api".to_string()),
            (PRIVATE_KEY_ENV.to_string(), "0xdeadbeef".to_string()),
            ("MEMETRADER__POLLING__TRADER_REFRESH_SECS".to_string(), "60".to_string()),
        ]);

        let config = load_with_env(Some(file.path()), env).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.2:3001/api");
        assert_eq!(config.chain.private_key.as_deref(), Some("0xdeadbeef"));
        assert_eq!(config.polling.trader_refresh_secs, 60);
        assert_eq!(
            config.chain.wallet_provider().private_key.as_deref(),
            Some("0xdeadbeef")
        );
    }

    #[test]
    fn test_zero_refresh_rejected() {
        let file = write("[polling]\ntrader_refresh_secs = 0\n");
        let result = load_with_env(Some(file.path()), HashMap::new());
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_bad_address_rejected() {
        let mut config = Config::default();
        config.chain.factory_address = "0x1234".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::ValidationError(msg) if msg.contains("factory_address")
        ));
    }

    #[test]
    fn test_empty_api_url_rejected() {
        let mut config = Config::default();
        config.api.base_url = " ".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_write_default_config_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("memetrader.toml");

        write_default_config(&path, false).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[api]"));
        assert!(!contents.contains("private_key"));

        let config = load_with_env(Some(&path), HashMap::new()).unwrap();
        assert_eq!(config.chain.rpc_url, ChainSection::default().rpc_url);

        assert!(write_default_config(&path, false).is_err());
        assert!(write_default_config(&path, true).is_ok());
    }
}
