use super::routing::RoutingConfig;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BITGET_URL: &str = "https://api.bitget.com";
pub const DEFAULT_BINANCE_URL: &str = "https://api.binance.com";
pub const DEFAULT_QUIDAX_URL: &str = "https://app.quidax.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl ProviderConfig {
    fn new(base_url: &str) -> Self {
        ProviderConfig {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub bitget: Option<ProviderConfig>,
    pub binance: Option<ProviderConfig>,
    pub quidax: Option<ProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            bitget: Some(ProviderConfig::new(DEFAULT_BITGET_URL)),
            binance: Some(ProviderConfig::new(DEFAULT_BINANCE_URL)),
            quidax: Some(ProviderConfig::new(DEFAULT_QUIDAX_URL)),
        }
    }
}

impl ProvidersConfig {
    pub fn bitget_url(&self) -> &str {
        self.bitget
            .as_ref()
            .map_or(DEFAULT_BITGET_URL, |p| &p.base_url)
    }

    pub fn binance_url(&self) -> &str {
        self.binance
            .as_ref()
            .map_or(DEFAULT_BINANCE_URL, |p| &p.base_url)
    }

    pub fn quidax_url(&self) -> &str {
        self.quidax
            .as_ref()
            .map_or(DEFAULT_QUIDAX_URL, |p| &p.base_url)
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Applied to every outbound request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            routing: RoutingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file has been set up.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "p2p-rates", "p2p-rates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Checks the settings serde cannot express. Configs built in code skip
    /// `load_from_path`, so consumers call this too.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
