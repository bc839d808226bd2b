//! `notary` configuration.
//!
//! Settings resolve in order: command-line flag or environment variable,
//! then the TOML file given with `--config`, then the built-in default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use notary_ledger::{GenesisConfig, LedgerParams, Provenance, TransferCheck};
use notary_types::Amount;
use notary_utils::LogFormat;
use notary_work::Difficulty;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("provenance needs both a repository URL and a commit hash")]
    IncompleteProvenance,
}

/// Resolved settings for one invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryConfig {
    /// Snapshot file for the chain.
    #[serde(default = "default_chain")]
    pub chain: PathBuf,

    /// Unit-of-account label, applied only when a chain is created.
    #[serde(default = "default_unit_name")]
    pub unit_name: String,

    /// Label embedded in the genesis message.
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(default = "default_difficulty")]
    pub difficulty: u32,

    #[serde(default = "default_base_reward")]
    pub base_reward: u64,

    #[serde(default)]
    pub transfer_check: TransferCheck,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub provenance: Option<Provenance>,
}

fn default_chain() -> PathBuf {
    PathBuf::from("multicoin.dat")
}

fn default_unit_name() -> String {
    notary_ledger::params::DEFAULT_UNIT_NAME.to_string()
}

fn default_mode() -> String {
    notary_ledger::genesis::DEFAULT_MODE.to_string()
}

fn default_difficulty() -> u32 {
    Difficulty::DEFAULT.zeros()
}

fn default_base_reward() -> u64 {
    notary_ledger::params::DEFAULT_BASE_REWARD
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NotaryConfig {
    fn default() -> Self {
        Self {
            chain: default_chain(),
            unit_name: default_unit_name(),
            mode: default_mode(),
            difficulty: default_difficulty(),
            base_reward: default_base_reward(),
            transfer_check: TransferCheck::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            provenance: None,
        }
    }
}

impl NotaryConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parameters for a newly created chain.
    pub fn ledger_params(&self) -> LedgerParams {
        LedgerParams::default()
            .with_unit_name(self.unit_name.clone())
            .with_difficulty(Difficulty::new(self.difficulty))
            .with_base_reward(Amount::new(self.base_reward))
            .with_transfer_check(self.transfer_check)
    }

    pub fn genesis(&self) -> GenesisConfig {
        let genesis = GenesisConfig::new(self.mode.clone());
        match &self.provenance {
            Some(p) => genesis.with_provenance(p.clone()),
            None => genesis,
        }
    }
}

/// Values given on the command line or through the environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub chain: Option<PathBuf>,
    pub unit_name: Option<String>,
    pub mode: Option<String>,
    pub difficulty: Option<u32>,
    pub base_reward: Option<u64>,
    pub transfer_check: Option<TransferCheck>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub provenance_repo: Option<String>,
    pub provenance_commit: Option<String>,
}

impl ConfigOverrides {
    /// Layer these values over `base`.
    pub fn apply(self, mut base: NotaryConfig) -> Result<NotaryConfig, ConfigError> {
        if let Some(v) = self.chain {
            base.chain = v;
        }
        if let Some(v) = self.unit_name {
            base.unit_name = v;
        }
        if let Some(v) = self.mode {
            base.mode = v;
        }
        if let Some(v) = self.difficulty {
            base.difficulty = v;
        }
        if let Some(v) = self.base_reward {
            base.base_reward = v;
        }
        if let Some(v) = self.transfer_check {
            base.transfer_check = v;
        }
        if let Some(v) = self.log_level {
            base.log_level = v;
        }
        if let Some(v) = self.log_format {
            base.log_format = v;
        }
        base.provenance = match (self.provenance_repo, self.provenance_commit, base.provenance) {
            (Some(repo_url), Some(commit_hash), _) => Some(Provenance { repo_url, commit_hash }),
            (Some(repo_url), None, Some(p)) => Some(Provenance { repo_url, ..p }),
            (None, Some(commit_hash), Some(p)) => Some(Provenance { commit_hash, ..p }),
            (Some(_), None, None) | (None, Some(_), None) => return Err(ConfigError::IncompleteProvenance),
            (None, None, existing) => existing,
        };
        Ok(base)
    }
}
