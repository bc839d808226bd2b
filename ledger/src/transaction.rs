//! Ledger transactions.
//!
//! A closed set of kinds; balance replay, lookup and rendering all match on
//! it exhaustively. The genesis block carries no transactions, see
//! [`crate::GenesisPayload`].

use serde::{Deserialize, Serialize};
use std::fmt;

use notary_types::{Address, Amount, Digest, Timestamp};

/// A pending or confirmed ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    /// Anchors a file fingerprint.
    Notarization {
        owner: Address,
        file_hash: Digest,
        filename: String,
        timestamp: Timestamp,
    },
    /// Minted by mining; not debited from anyone.
    Reward { recipient: Address, amount: Amount },
    /// A transfer between two addresses.
    Currency {
        sender: Address,
        recipient: Address,
        amount: Amount,
        timestamp: Timestamp,
    },
}

/// Discriminant of [`Transaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxKind {
    Notarization,
    Reward,
    Currency,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notarization => "notarization",
            Self::Reward => "reward",
            Self::Currency => "currency",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Transaction {
    pub fn notarization(
        owner: Address,
        file_hash: Digest,
        filename: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self::Notarization {
            owner,
            file_hash,
            filename: filename.into(),
            timestamp,
        }
    }

    pub fn reward(recipient: Address, amount: Amount) -> Self {
        Self::Reward { recipient, amount }
    }

    pub fn currency(sender: Address, recipient: Address, amount: Amount, timestamp: Timestamp) -> Self {
        Self::Currency {
            sender,
            recipient,
            amount,
            timestamp,
        }
    }

    pub fn kind(&self) -> TxKind {
        match self {
            Self::Notarization { .. } => TxKind::Notarization,
            Self::Reward { .. } => TxKind::Reward,
            Self::Currency { .. } => TxKind::Currency,
        }
    }

    /// The anchored fingerprint, for notarizations.
    pub fn notarized_hash(&self) -> Option<&Digest> {
        match self {
            Self::Notarization { file_hash, .. } => Some(file_hash),
            Self::Reward { .. } | Self::Currency { .. } => None,
        }
    }

    /// Net effect of this transaction on `address`'s balance.
    ///
    /// A transfer to oneself debits and credits the same amount.
    pub fn balance_delta(&self, address: &Address) -> i64 {
        match self {
            Self::Reward { recipient, amount } => {
                if recipient == address {
                    amount.as_signed()
                } else {
                    0
                }
            }
            Self::Currency {
                sender,
                recipient,
                amount,
                ..
            } => {
                let mut delta = 0i64;
                if sender == address {
                    delta = delta.saturating_sub(amount.as_signed());
                }
                if recipient == address {
                    delta = delta.saturating_add(amount.as_signed());
                }
                delta
            }
            Self::Notarization { .. } => 0,
        }
    }
}
