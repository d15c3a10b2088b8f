//! Layered configuration: defaults, then an optional TOML file named by
//! `ALEA_CONFIG`, then `ALEA_*` environment variables. Command-line flags
//! are applied last by each command.

use serde::{Deserialize, Serialize};
use std::fs;

use alea_engine::bankroll::INITIAL_BANKROLL;
use alea_engine::table::TableCatalog;

pub const CONFIG_ENV: &str = "ALEA_CONFIG";
pub const SEED_ENV: &str = "ALEA_SEED";
pub const BANKROLL_ENV: &str = "ALEA_BANKROLL";
pub const TABLE_ENV: &str = "ALEA_TABLE";
pub const AI_ENV: &str = "ALEA_AI";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub bankroll: u32,
    pub table: String,
    pub ai: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            bankroll: INITIAL_BANKROLL,
            table: "bronze".into(),
            ai: "house".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub bankroll: ValueSource,
    pub table: ValueSource,
    pub ai: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            bankroll: ValueSource::Default,
            table: ValueSource::Default,
            ai: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.bankroll {
            cfg.bankroll = v;
            sources.bankroll = ValueSource::File;
        }
        if let Some(v) = f.table {
            cfg.table = v;
            sources.table = ValueSource::File;
        }
        if let Some(v) = f.ai {
            cfg.ai = v;
            sources.ai = ValueSource::File;
        }
    }

    if let Ok(seed) = std::env::var(SEED_ENV)
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {}", SEED_ENV, seed)))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(bankroll) = std::env::var(BANKROLL_ENV)
        && !bankroll.is_empty()
    {
        cfg.bankroll = bankroll.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid {}: {}", BANKROLL_ENV, bankroll))
        })?;
        sources.bankroll = ValueSource::Env;
    }
    if let Ok(table) = std::env::var(TABLE_ENV)
        && !table.is_empty()
    {
        cfg.table = table;
        sources.table = ValueSource::Env;
    }
    if let Ok(ai) = std::env::var(AI_ENV)
        && !ai.is_empty()
    {
        cfg.ai = ai;
        sources.ai = ValueSource::Env;
    }

    validate(&cfg)?;
    tracing::debug!(?cfg, "configuration resolved");
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    bankroll: Option<u32>,
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    ai: Option<String>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.bankroll == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: bankroll must be >0".into(),
        ));
    }
    if TableCatalog::default().get(&cfg.table).is_err() {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: unknown table {} (expected one of: {})",
            cfg.table,
            TableCatalog::default().ids().join(", ")
        )));
    }
    if let Err(e) = alea_ai::create_ai(&cfg.ai) {
        return Err(ConfigError::Invalid(format!("Invalid configuration: {}", e)));
    }
    Ok(())
}
