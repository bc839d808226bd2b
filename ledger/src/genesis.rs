//! Genesis block creation.
//!
//! Block 0 links to the `"0"` sentinel, carries a [`GenesisPayload`] instead
//! of transactions, and is not mined. Its message embeds the operator's mode
//! label; provenance (repository origin and commit) is supplied by the caller
//! and stored verbatim.

use serde::{Deserialize, Serialize};

use notary_types::Timestamp;

use crate::block::{Block, Payload, PreviousHash};

/// Mode label used when none is configured.
pub const DEFAULT_MODE: &str = "tool";

/// Where the software that created a chain came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub repo_url: String,
    pub commit_hash: String,
}

/// Payload of block 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisPayload {
    pub message: String,
    pub provenance: Option<Provenance>,
}

/// Configuration for creating a genesis block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenesisConfig {
    /// Operator-supplied mode label, e.g. `"tool"` or `"simulate"`.
    pub mode: String,
    pub provenance: Option<Provenance>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
            provenance: None,
        }
    }
}

impl GenesisConfig {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            provenance: None,
        }
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    pub fn message(&self) -> String {
        format!("Genesis Block ({} mode)", self.mode)
    }
}

/// Create the genesis block for a given configuration.
pub fn create_genesis_block(config: &GenesisConfig, timestamp: Timestamp) -> Block {
    let payload = GenesisPayload {
        message: config.message(),
        provenance: config.provenance.clone(),
    };
    Block::new(0, timestamp, Payload::Genesis(payload), PreviousHash::Sentinel)
}
