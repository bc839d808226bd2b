//! Structural verification of a whole chain.

use thiserror::Error;

use notary_types::Digest;

use crate::block::PreviousHash;
use crate::ledger::Ledger;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("chain has no blocks")]
    MissingGenesis,

    #[error("block 0 is not a well-formed genesis block")]
    GenesisMalformed,

    #[error("block at position {position} has index {found}")]
    IndexGap { position: u64, found: u64 },

    #[error("block {index} does not link to its predecessor")]
    BrokenLink { index: u64 },

    #[error("block {index} hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch { index: u64, stored: Digest, computed: Digest },

    #[error("block {index} does not meet difficulty {difficulty}")]
    InsufficientWork { index: u64, difficulty: u32 },

    #[error("block {index} carries a genesis payload")]
    UnexpectedGenesisPayload { index: u64 },
}

impl Ledger {
    /// Check every structural invariant of the chain.
    ///
    /// Genesis is exempt from the difficulty requirement.
    pub fn verify_integrity(&self) -> Result<(), IntegrityError> {
        let genesis = self.blocks.first().ok_or(IntegrityError::MissingGenesis)?;
        if genesis.index != 0 || !genesis.previous_hash.is_sentinel() || !genesis.is_genesis() {
            return Err(IntegrityError::GenesisMalformed);
        }

        let difficulty = self.params.difficulty;
        for (position, block) in self.blocks.iter().enumerate() {
            let position = position as u64;
            if block.index != position {
                return Err(IntegrityError::IndexGap {
                    position,
                    found: block.index,
                });
            }

            let computed = block.compute_hash();
            if computed != block.hash {
                return Err(IntegrityError::HashMismatch {
                    index: block.index,
                    stored: block.hash,
                    computed,
                });
            }

            if position == 0 {
                continue;
            }
            if block.is_genesis() {
                return Err(IntegrityError::UnexpectedGenesisPayload { index: block.index });
            }
            let previous = &self.blocks[(position - 1) as usize];
            if block.previous_hash != PreviousHash::Block(previous.hash) {
                return Err(IntegrityError::BrokenLink { index: block.index });
            }
            if !block.meets_difficulty(difficulty) {
                return Err(IntegrityError::InsufficientWork {
                    index: block.index,
                    difficulty: difficulty.zeros(),
                });
            }
        }
        Ok(())
    }
}
