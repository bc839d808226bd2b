//! The ledger: the block sequence plus the pending-transaction pool.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use notary_types::{Address, Amount, Digest, Timestamp};
use notary_work::{NonceSearch, SearchControl, WorkError};

use crate::block::{Block, Payload, PreviousHash};
use crate::error::LedgerError;
use crate::genesis::{create_genesis_block, GenesisConfig};
use crate::params::{LedgerParams, TransferCheck};
use crate::transaction::Transaction;

/// A confirmed notarization and the block that holds it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NotarizationRecord {
    pub block_index: u64,
    pub transaction: Transaction,
}

/// Summary figures for a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    /// Number of blocks, genesis included.
    pub height: u64,
    /// Transactions across all blocks; the genesis payload counts as one.
    pub tx_count: u64,
    pub tip_hash: Digest,
    /// Transactions waiting in the mempool.
    pub pending: u64,
}

/// Result of [`Ledger::mine_with`].
#[derive(Debug)]
pub enum MiningOutcome {
    Sealed(Block),
    /// Nothing pending and no reward due.
    NothingToMine,
    /// The search was stopped before a nonce was found. The ledger is
    /// unchanged; the candidate can be sealed later and committed.
    Interrupted(Candidate),
}

/// A block under construction, not yet part of the chain.
#[derive(Clone, Debug)]
pub struct Candidate {
    block: Block,
    /// Mempool positions of the transactions in `block`, ascending.
    included: Vec<usize>,
    deferred: usize,
    search: NonceSearch,
    sealed: bool,
}

impl Candidate {
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Transfers held back by the mining-time balance check.
    pub fn deferred(&self) -> usize {
        self.deferred
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Nonce the search will try next.
    pub fn next_nonce(&self) -> u64 {
        self.search.next_nonce()
    }

    /// Search for a nonce that meets the difficulty. Stopping early keeps the
    /// search position, so calling again continues where it left off.
    pub fn seal(&mut self, control: &SearchControl) -> Result<(), WorkError> {
        if self.sealed {
            return Ok(());
        }
        let hash_at = self.block.nonce_hasher();
        let solution = self.search.run(hash_at, control)?;
        self.block.nonce = solution.nonce;
        self.block.hash = solution.hash;
        self.sealed = true;
        debug!(
            index = self.block.index,
            nonce = solution.nonce,
            attempts = solution.attempts,
            "candidate sealed"
        );
        Ok(())
    }
}

/// An append-only chain of sealed blocks and the transactions waiting for
/// the next one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub(crate) blocks: Vec<Block>,
    pub(crate) mempool: Vec<Transaction>,
    pub(crate) params: LedgerParams,
}

impl Ledger {
    /// A fresh ledger holding only its genesis block.
    pub fn new(params: LedgerParams, genesis: &GenesisConfig, now: Timestamp) -> Self {
        let block = create_genesis_block(genesis, now);
        info!(
            mode = %genesis.mode,
            hash = %block.hash,
            unit = %params.unit_name,
            difficulty = params.difficulty.zeros(),
            "created genesis block"
        );
        Self {
            blocks: vec![block],
            mempool: Vec::new(),
            params,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn mempool(&self) -> &[Transaction] {
        &self.mempool
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    /// The most recent block. A ledger always holds at least its genesis.
    pub fn tip(&self) -> &Block {
        // `blocks` is never empty once constructed or loaded.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Queue a transaction for the next block.
    ///
    /// No validation happens here. Balance checks for transfers belong to the
    /// caller (see [`crate::Notary::transfer`]) and, under
    /// [`TransferCheck::Mining`], to mining.
    pub fn admit(&mut self, tx: Transaction) {
        info!(kind = %tx.kind(), pending = self.mempool.len() + 1, "transaction admitted");
        self.mempool.push(tx);
    }

    /// Build the next block from the mempool without searching for a nonce.
    ///
    /// Returns `None` when there is nothing to include and no reward is due.
    pub fn prepare_candidate(
        &self,
        miner: &Address,
        reward_override: Option<Amount>,
        now: Timestamp,
    ) -> Option<Candidate> {
        let (included, deferred) = self.select_transactions();
        if included.is_empty() && reward_override.map_or(true, |r| r.is_zero()) {
            debug!(deferred, "nothing to mine");
            return None;
        }

        let mut transactions: Vec<Transaction> = included.iter().map(|&i| self.mempool[i].clone()).collect();
        let reward = reward_override.unwrap_or(self.params.base_reward);
        if !reward.is_zero() {
            transactions.push(Transaction::reward(miner.clone(), reward));
        }

        let tip = self.tip();
        let block = Block::new(
            tip.index + 1,
            now,
            Payload::Transactions(transactions),
            PreviousHash::Block(tip.hash),
        );
        Some(Candidate {
            block,
            included,
            deferred,
            search: NonceSearch::new(self.params.difficulty),
            sealed: false,
        })
    }

    /// Mempool positions to include in the next block, and how many transfers
    /// were deferred.
    fn select_transactions(&self) -> (Vec<usize>, usize) {
        match self.params.transfer_check {
            TransferCheck::Admission => ((0..self.mempool.len()).collect(), 0),
            TransferCheck::Mining => {
                let mut running: HashMap<&Address, i64> = HashMap::new();
                let mut included = Vec::with_capacity(self.mempool.len());
                let mut deferred = 0;
                for (i, tx) in self.mempool.iter().enumerate() {
                    if let Transaction::Currency { sender, amount, .. } = tx {
                        let available = *running.entry(sender).or_insert_with(|| self.balance(sender));
                        if available < amount.as_signed() {
                            warn!(
                                sender = %sender,
                                available,
                                requested = amount.raw(),
                                "transfer deferred: would overdraw sender"
                            );
                            deferred += 1;
                            continue;
                        }
                    }
                    for address in tx_addresses(tx) {
                        let delta = tx.balance_delta(address);
                        let entry = running.entry(address).or_insert_with(|| self.balance(address));
                        *entry = entry.saturating_add(delta);
                    }
                    included.push(i);
                }
                (included, deferred)
            }
        }
    }

    /// Append a sealed candidate and drop its transactions from the mempool.
    pub fn commit(&mut self, candidate: Candidate) -> Result<Block, LedgerError> {
        let tip = self.tip();
        if candidate.block.index != tip.index + 1 || candidate.block.previous_hash != PreviousHash::Block(tip.hash) {
            return Err(LedgerError::StaleCandidate {
                reason: format!("tip moved to block {}", tip.index),
            });
        }
        let block_txs = candidate.block.transactions();
        let mempool_matches = candidate
            .included
            .iter()
            .zip(block_txs)
            .all(|(&i, tx)| self.mempool.get(i) == Some(tx));
        if !mempool_matches {
            return Err(LedgerError::StaleCandidate {
                reason: "mempool changed".to_string(),
            });
        }
        if !candidate.sealed
            || !candidate.block.hash_is_valid()
            || !candidate.block.meets_difficulty(self.params.difficulty)
        {
            return Err(LedgerError::Unsealed);
        }

        let Candidate { block, included, .. } = candidate;
        let mut position = 0;
        let mut next_included = included.iter().peekable();
        self.mempool.retain(|_| {
            let keep = next_included.next_if_eq(&&position).is_none();
            position += 1;
            keep
        });

        info!(
            index = block.index,
            hash = %block.hash,
            nonce = block.nonce,
            txs = block.transactions().len(),
            "block sealed"
        );
        self.blocks.push(block.clone());
        Ok(block)
    }

    /// Mine the next block, blocking until a nonce is found.
    ///
    /// `Ok(None)` when nothing is pending and no reward override is given.
    pub fn mine(
        &mut self,
        miner: &Address,
        reward_override: Option<Amount>,
        now: Timestamp,
    ) -> Result<Option<Block>, LedgerError> {
        let Some(mut candidate) = self.prepare_candidate(miner, reward_override, now) else {
            return Ok(None);
        };
        candidate.seal(&SearchControl::unbounded())?;
        self.commit(candidate).map(Some)
    }

    /// Mine under a step budget and/or a cancellation flag.
    pub fn mine_with(
        &mut self,
        miner: &Address,
        reward_override: Option<Amount>,
        now: Timestamp,
        control: &SearchControl,
    ) -> Result<MiningOutcome, LedgerError> {
        let Some(mut candidate) = self.prepare_candidate(miner, reward_override, now) else {
            return Ok(MiningOutcome::NothingToMine);
        };
        match candidate.seal(control) {
            Ok(()) => Ok(MiningOutcome::Sealed(self.commit(candidate)?)),
            Err(WorkError::Cancelled { next_nonce } | WorkError::BudgetExhausted { next_nonce }) => {
                debug!(next_nonce, "mining interrupted");
                Ok(MiningOutcome::Interrupted(candidate))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The first confirmed notarization of `file_hash`, by block then
    /// transaction order.
    pub fn find_notarization(&self, file_hash: &Digest) -> Option<NotarizationRecord> {
        self.notarizations_of(file_hash).next()
    }

    /// Every confirmed notarization of `file_hash`, oldest first.
    pub fn find_notarizations(&self, file_hash: &Digest) -> Vec<NotarizationRecord> {
        self.notarizations_of(file_hash).collect()
    }

    fn notarizations_of<'a>(&'a self, file_hash: &'a Digest) -> impl Iterator<Item = NotarizationRecord> + 'a {
        self.blocks.iter().flat_map(move |block| {
            block
                .transactions()
                .iter()
                .filter(move |tx| tx.notarized_hash() == Some(file_hash))
                .map(move |tx| NotarizationRecord {
                    block_index: block.index,
                    transaction: tx.clone(),
                })
        })
    }

    /// Confirmed balance of `address`, replayed from the block history.
    pub fn balance(&self, address: &Address) -> i64 {
        self.blocks
            .iter()
            .flat_map(|b| b.transactions())
            .fold(0i64, |acc, tx| acc.saturating_add(tx.balance_delta(address)))
    }

    /// Confirmed balance plus the effect of everything still pending.
    pub fn pending_balance(&self, address: &Address) -> i64 {
        self.mempool
            .iter()
            .fold(self.balance(address), |acc, tx| acc.saturating_add(tx.balance_delta(address)))
    }

    /// Transactions in non-genesis blocks.
    pub fn confirmed_tx_count(&self) -> u64 {
        self.blocks.iter().map(|b| b.transactions().len() as u64).sum()
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            height: self.blocks.len() as u64,
            tx_count: self.blocks.iter().map(|b| b.payload.entry_count() as u64).sum(),
            tip_hash: self.tip().hash,
            pending: self.mempool.len() as u64,
        }
    }
}

/// Addresses whose balance `tx` touches.
fn tx_addresses(tx: &Transaction) -> Vec<&Address> {
    match tx {
        Transaction::Reward { recipient, .. } => vec![recipient],
        Transaction::Currency { sender, recipient, .. } => vec![sender, recipient],
        Transaction::Notarization { .. } => Vec::new(),
    }
}
