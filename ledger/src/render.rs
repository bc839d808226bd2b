//! Human-readable chain listing.

use std::fmt;

use notary_utils::format_timestamp;

use crate::block::{Block, Payload};
use crate::ledger::Ledger;
use crate::transaction::Transaction;

const SEPARATOR_WIDTH: usize = 40;
const SHORT_HASH_LEN: usize = 10;

/// Render every block of the chain, oldest first.
pub fn render_chain(ledger: &Ledger) -> String {
    let unit = &ledger.params().unit_name;
    ledger
        .blocks()
        .iter()
        .map(|block| BlockListing { block, unit }.to_string())
        .collect()
}

struct BlockListing<'a> {
    block: &'a Block,
    unit: &'a str,
}

impl fmt::Display for BlockListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let block = self.block;
        writeln!(f, "Block {}", block.index)?;
        writeln!(f, "Timestamp: {}", format_timestamp(block.timestamp))?;
        match &block.payload {
            Payload::Genesis(genesis) => {
                writeln!(f, "Data: {}", genesis.message)?;
                let (repo, commit) = match &genesis.provenance {
                    Some(p) => (p.repo_url.as_str(), p.commit_hash.as_str()),
                    None => ("N/A", "N/A"),
                };
                writeln!(f, "Repo URL: {repo}")?;
                writeln!(f, "Commit Hash: {commit}")?;
            }
            Payload::Transactions(txs) => {
                writeln!(f, "Transactions:")?;
                for tx in txs {
                    writeln!(f, "  {}", describe(tx, self.unit))?;
                }
            }
        }
        writeln!(f, "Previous Hash: {}", block.previous_hash)?;
        writeln!(f, "Hash: {}", block.hash)?;
        writeln!(f, "Nonce: {}", block.nonce)?;
        writeln!(f, "{}", "-".repeat(SEPARATOR_WIDTH))
    }
}

/// One-line description of a transaction.
pub fn describe(tx: &Transaction, unit: &str) -> String {
    match tx {
        Transaction::Notarization {
            owner,
            file_hash,
            filename,
            ..
        } => format!(
            "[Notary] Owner: {owner}, File: {filename}, Hash: {}...",
            file_hash.short_hex(SHORT_HASH_LEN)
        ),
        Transaction::Reward { recipient, amount } => {
            format!("[Reward] To: {recipient}, Amount: {amount} {unit}")
        }
        Transaction::Currency {
            sender,
            recipient,
            amount,
            ..
        } => format!("[Currency] From: {sender}, To: {recipient}, Amount: {amount} {unit}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::{GenesisConfig, Provenance};
    use crate::params::LedgerParams;
    use notary_types::{Address, Amount, Digest, Timestamp};
    use notary_work::Difficulty;

    #[test]
    fn genesis_without_provenance() {
        let ledger = Ledger::new(LedgerParams::default(), &GenesisConfig::default(), Timestamp::new(0));
        let text = render_chain(&ledger);
        assert!(text.starts_with("Block 0\n"));
        assert!(text.contains("Data: Genesis Block (tool mode)"));
        assert!(text.contains("Repo URL: N/A"));
        assert!(text.contains("Commit Hash: N/A"));
        assert!(text.contains("Previous Hash: 0\n"));
        assert!(text.ends_with(&format!("{}\n", "-".repeat(40))));
    }

    #[test]
    fn genesis_with_provenance() {
        let genesis = GenesisConfig::new("tool").with_provenance(Provenance {
            repo_url: "https://example.org/notary.git".into(),
            commit_hash: "deadbeef".into(),
        });
        let ledger = Ledger::new(LedgerParams::default(), &genesis, Timestamp::new(0));
        let text = render_chain(&ledger);
        assert!(text.contains("Repo URL: https://example.org/notary.git"));
        assert!(text.contains("Commit Hash: deadbeef"));
    }

    #[test]
    fn transaction_lines() {
        let params = LedgerParams::default()
            .with_difficulty(Difficulty::new(0))
            .with_unit_name("Coin");
        let mut ledger = Ledger::new(params, &GenesisConfig::default(), Timestamp::new(0));
        ledger.admit(Transaction::notarization(
            Address::new("Alice"),
            Digest::new([0xAB; 32]),
            "deed.pdf",
            Timestamp::new(1),
        ));
        ledger.admit(Transaction::currency(
            Address::new("Alice"),
            Address::new("Bob"),
            Amount::new(50),
            Timestamp::new(1),
        ));
        ledger.mine(&Address::new("MinerX"), None, Timestamp::new(2)).unwrap();

        let text = render_chain(&ledger);
        assert!(text.contains("[Notary] Owner: Alice, File: deed.pdf, Hash: ababababab..."));
        assert!(text.contains("[Currency] From: Alice, To: Bob, Amount: 50 Coin"));
        assert!(text.contains("[Reward] To: MinerX, Amount: 100 Coin"));
        assert_eq!(text.matches(&"-".repeat(40)).count(), 2);
    }
}
