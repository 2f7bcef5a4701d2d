use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::format::ValueFormat;
use crate::league::LeagueKey;
use crate::stash::TabScope;
use crate::valuation::MAX_HISTORY;

/// Environment variable holding the account API session cookie.
pub const SESSION_ENV_VAR: &str = "POESESSID";

fn default_display_currency() -> String {
    "Chaos Orb".to_string()
}

/// Endpoints and client identity for the external APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub ninja_base_url: String,
    pub stash_base_url: String,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            ninja_base_url: "https://poe.ninja".to_string(),
            stash_base_url: "https://www.pathofexile.com".to_string(),
            user_agent: concat!("stashworth/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Refresh cadence and cache lifetimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// How old a league's rate table can be before `rates_for` refetches it.
    pub rates_staleness_secs: u64,

    /// Store TTL for cached rate tables.
    pub rates_ttl_secs: u64,

    /// Store TTL for report histories.
    pub history_ttl_secs: u64,

    /// Snapshots retained per report.
    pub max_history: usize,
}

impl RefreshConfig {
    pub fn rates_staleness(&self) -> Duration {
        Duration::from_secs(self.rates_staleness_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            rates_staleness_secs: 30 * 60,
            rates_ttl_secs: 60 * 60,
            history_ttl_secs: 30 * 24 * 60 * 60,
            max_history: MAX_HISTORY,
        }
    }
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places for rendered values.
    pub decimals: u32,

    /// Render values with thousands separators.
    pub grouping: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimals: 2,
            grouping: true,
        }
    }
}

impl DisplayConfig {
    pub fn value_format(&self) -> ValueFormat {
        ValueFormat {
            decimals: self.decimals,
            grouping: self.grouping,
        }
    }
}

/// A named net-worth report over a league's stash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: String,

    /// League as shown by the game; normalized before use as a key.
    pub league: String,

    /// Tab indices to value. Every visible tab when omitted.
    #[serde(default)]
    pub tabs: TabScope,

    /// Value only items priced from the currency category.
    #[serde(default)]
    pub currency_only: bool,

    #[serde(default = "default_display_currency")]
    pub display_currency: String,
}

impl ReportConfig {
    pub fn new(name: impl Into<String>, league: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            league: league.into(),
            tabs: TabScope::All,
            currency_only: false,
            display_currency: default_display_currency(),
        }
    }

    pub fn with_tabs(mut self, tabs: TabScope) -> Self {
        self.tabs = tabs;
        self
    }

    pub fn currency_only(mut self) -> Self {
        self.currency_only = true;
        self
    }

    pub fn with_display_currency(mut self, currency: impl Into<String>) -> Self {
        self.display_currency = currency.into();
        self
    }

    pub fn league_key(&self) -> LeagueKey {
        LeagueKey::new(&self.league)
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account whose stash is valued.
    pub account: String,

    /// Path to data directory. If relative, resolved from config file location.
    /// If not specified, defaults to the config file's directory.
    pub data_dir: Option<PathBuf>,

    pub api: ApiConfig,

    pub refresh: RefreshConfig,

    pub display: DisplayConfig,

    #[serde(rename = "report")]
    pub reports: Vec<ReportConfig>,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the data directory path.
    ///
    /// If `data_dir` is set and relative, it's resolved relative to `config_dir`.
    /// If `data_dir` is not set, returns `config_dir`.
    pub fn resolve_data_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.data_dir {
            Some(data_dir) if data_dir.is_absolute() => data_dir.clone(),
            Some(data_dir) => config_dir.join(data_dir),
            None => config_dir.to_path_buf(),
        }
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub account: String,
    pub data_dir: PathBuf,
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub display: DisplayConfig,
    pub reports: Vec<ReportConfig>,
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    ///
    /// The data directory is resolved relative to the config file's parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        let config = Config::load(&config_path)?;
        let data_dir = config.resolve_data_dir(config_dir);

        Ok(Self {
            account: config.account,
            data_dir,
            api: config.api,
            refresh: config.refresh,
            display: config.display,
            reports: config.reports,
        })
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// Without a file, the intended config directory is the data directory.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load(config_path);
        }

        let config_path = if config_path.is_relative() {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(config_path)
        } else {
            config_path.to_path_buf()
        };
        let config_dir = config_path
            .parent()
            .context("Config path has no parent directory")?;

        let config = Config::default();
        Ok(Self {
            account: config.account,
            data_dir: config_dir.to_path_buf(),
            api: config.api,
            refresh: config.refresh,
            display: config.display,
            reports: config.reports,
        })
    }

    pub fn report(&self, name: &str) -> Option<&ReportConfig> {
        self.reports.iter().find(|report| report.name == name)
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./stashworth.toml` if it exists in current directory
/// 2. `~/.local/share/stashworth/stashworth.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("stashworth.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("stashworth").join("stashworth.toml");
    }

    local_config
}

/// Read the session cookie from the environment.
pub fn session_from_env() -> Result<SecretString> {
    let value = std::env::var(SESSION_ENV_VAR)
        .with_context(|| format!("{SESSION_ENV_VAR} is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("{SESSION_ENV_VAR} is empty");
    }
    Ok(SecretString::from(value))
}
