//! Ledger parameters fixed at chain creation.

use serde::{Deserialize, Serialize};

use notary_types::Amount;
use notary_work::Difficulty;

/// Mining reward applied when no override is given.
pub const DEFAULT_BASE_REWARD: u64 = 100;

/// Unit-of-account label for new chains.
pub const DEFAULT_UNIT_NAME: &str = "MultiCoin";

/// When transfer balances are enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferCheck {
    /// Only the caller's pre-check at submission. Two queued transfers from
    /// one sender can jointly overdraw it.
    #[default]
    Admission,
    /// Additionally replay transfers at mining time. A transfer that would
    /// overdraw its sender stays pending and is left out of the block.
    Mining,
}

impl TransferCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admission => "admission",
            Self::Mining => "mining",
        }
    }
}

/// Per-chain parameters, persisted with the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    pub difficulty: Difficulty,
    pub base_reward: Amount,
    pub unit_name: String,
    pub transfer_check: TransferCheck,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::DEFAULT,
            base_reward: Amount::new(DEFAULT_BASE_REWARD),
            unit_name: DEFAULT_UNIT_NAME.to_string(),
            transfer_check: TransferCheck::default(),
        }
    }
}

impl LedgerParams {
    pub fn with_unit_name(mut self, unit_name: impl Into<String>) -> Self {
        self.unit_name = unit_name.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_base_reward(mut self, reward: Amount) -> Self {
        self.base_reward = reward;
        self
    }

    pub fn with_transfer_check(mut self, check: TransferCheck) -> Self {
        self.transfer_check = check;
        self
    }
}
