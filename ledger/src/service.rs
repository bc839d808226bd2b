//! The command surface: one load, at most one mutation, one persist.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use notary_store::SnapshotStore;
use notary_types::{Address, Amount, Clock, Digest};

use crate::block::Block;
use crate::error::LedgerError;
use crate::genesis::GenesisConfig;
use crate::ledger::{Ledger, LedgerStats, NotarizationRecord};
use crate::params::LedgerParams;
use crate::render::render_chain;
use crate::transaction::Transaction;

/// Result of looking up a fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub digest: Digest,
    /// Every confirmed notarization of `digest`, oldest first.
    pub records: Vec<NotarizationRecord>,
}

impl Verification {
    /// The earliest notarization, if any.
    pub fn first(&self) -> Option<&NotarizationRecord> {
        self.records.first()
    }

    pub fn is_notarized(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Runs ledger commands against a snapshot store.
///
/// Every call loads the ledger, creating a genesis chain if the store is
/// empty. Read-only commands persist only a freshly created chain; mutating
/// commands persist on success and write nothing on failure.
pub struct Notary<S, C> {
    store: S,
    clock: C,
    params: LedgerParams,
    genesis: GenesisConfig,
}

impl<S: SnapshotStore, C: Clock> Notary<S, C> {
    /// `params` and `genesis` are used only when the store holds no chain.
    pub fn new(store: S, clock: C, params: LedgerParams, genesis: GenesisConfig) -> Self {
        Self {
            store,
            clock,
            params,
            genesis,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn open(&self) -> Result<(Ledger, bool), LedgerError> {
        Ok(Ledger::open_or_create(
            &self.store,
            self.params.clone(),
            &self.genesis,
            &self.clock,
        )?)
    }

    fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> Result<T, LedgerError> {
        let (ledger, created) = self.open()?;
        if created {
            ledger.persist(&self.store)?;
        }
        Ok(f(&ledger))
    }

    /// `f` reports whether it changed the ledger alongside its result.
    fn mutate<T>(&self, f: impl FnOnce(&mut Ledger) -> Result<(T, bool), LedgerError>) -> Result<T, LedgerError> {
        let (mut ledger, created) = self.open()?;
        let (out, changed) = f(&mut ledger)?;
        if changed || created {
            ledger.persist(&self.store)?;
        }
        Ok(out)
    }

    /// Fingerprint a file and queue its notarization under its base name.
    pub fn notarize(&self, owner: &Address, path: &Path) -> Result<Digest, LedgerError> {
        let digest = notary_crypto::digest_file(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.notarize_digest(owner, digest, &filename)?;
        Ok(digest)
    }

    /// Queue a notarization for a precomputed fingerprint.
    pub fn notarize_digest(&self, owner: &Address, digest: Digest, filename: &str) -> Result<(), LedgerError> {
        let now = self.clock.now();
        self.mutate(|ledger| {
            ledger.admit(Transaction::notarization(owner.clone(), digest, filename, now));
            Ok(((), true))
        })?;
        info!(owner = %owner, digest = %digest, filename, "notarization queued");
        Ok(())
    }

    /// Queue a transfer if the sender's confirmed balance covers it.
    ///
    /// Pending transfers are not counted against the sender.
    pub fn transfer(&self, sender: &Address, recipient: &Address, amount: Amount) -> Result<(), LedgerError> {
        let now = self.clock.now();
        self.mutate(|ledger| {
            let available = ledger.balance(sender);
            if available < amount.as_signed() {
                return Err(LedgerError::InsufficientFunds {
                    address: sender.clone(),
                    available,
                    requested: amount,
                });
            }
            ledger.admit(Transaction::currency(sender.clone(), recipient.clone(), amount, now));
            Ok(((), true))
        })
    }

    /// Mine pending transactions. `Ok(None)` when there was nothing to do.
    pub fn mine(&self, miner: &Address, reward_override: Option<Amount>) -> Result<Option<Block>, LedgerError> {
        let now = self.clock.now();
        self.mutate(|ledger| {
            let block = ledger.mine(miner, reward_override, now)?;
            let changed = block.is_some();
            Ok((block, changed))
        })
    }

    pub fn verify(&self, path: &Path) -> Result<Verification, LedgerError> {
        let digest = notary_crypto::digest_file(path)?;
        self.verify_digest(digest)
    }

    pub fn verify_digest(&self, digest: Digest) -> Result<Verification, LedgerError> {
        self.read(|ledger| Verification {
            digest,
            records: ledger.find_notarizations(&digest),
        })
    }

    pub fn balance(&self, address: &Address) -> Result<i64, LedgerError> {
        self.read(|ledger| ledger.balance(address))
    }

    pub fn pending_balance(&self, address: &Address) -> Result<i64, LedgerError> {
        self.read(|ledger| ledger.pending_balance(address))
    }

    pub fn stats(&self) -> Result<LedgerStats, LedgerError> {
        self.read(Ledger::stats)
    }

    pub fn print(&self) -> Result<String, LedgerError> {
        self.read(render_chain)
    }

    /// Load the chain and report its stats.
    ///
    /// A stored chain is verified while it loads, so any integrity failure
    /// surfaces as an error here. A freshly created genesis is persisted.
    pub fn check(&self) -> Result<LedgerStats, LedgerError> {
        self.read(Ledger::stats)
    }

    /// Unit-of-account label of the stored chain.
    pub fn unit_name(&self) -> Result<String, LedgerError> {
        self.read(|ledger| ledger.params().unit_name.clone())
    }
}
