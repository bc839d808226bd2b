use proptest::prelude::*;

use notary_ledger::snapshot::{decode, encode};
use notary_ledger::{GenesisConfig, Ledger, LedgerParams, Transaction, TransferCheck};
use notary_types::{Address, Amount, Timestamp};
use notary_work::Difficulty;

const NAMES: [&str; 4] = ["Alice", "Bob", "Carol", "MinerX"];

fn name() -> impl Strategy<Value = Address> {
    prop::sample::select(NAMES.to_vec()).prop_map(Address::new)
}

fn transfer() -> impl Strategy<Value = Transaction> {
    (name(), name(), 0u64..200).prop_map(|(from, to, amount)| {
        Transaction::currency(from, to, Amount::new(amount), Timestamp::new(1))
    })
}

/// Batches of transfers, each followed by a mining step with an optional reward.
fn rounds() -> impl Strategy<Value = Vec<(Vec<Transaction>, Option<u64>)>> {
    prop::collection::vec(
        (
            prop::collection::vec(transfer(), 0..4),
            prop::option::of(0u64..150),
        ),
        1..5,
    )
}

fn run(check: TransferCheck, rounds: &[(Vec<Transaction>, Option<u64>)]) -> Ledger {
    let params = LedgerParams::default()
        .with_difficulty(Difficulty::new(1))
        .with_transfer_check(check);
    let mut ledger = Ledger::new(params, &GenesisConfig::default(), Timestamp::new(0));
    for (i, (txs, reward)) in rounds.iter().enumerate() {
        for tx in txs {
            ledger.admit(tx.clone());
        }
        ledger
            .mine(&Address::new("MinerX"), reward.map(Amount::new), Timestamp::new(i as u64 + 1))
            .unwrap();
    }
    ledger
}

proptest! {
    #[test]
    fn balances_sum_to_minted_rewards(rounds in rounds()) {
        let ledger = run(TransferCheck::Admission, &rounds);
        let minted: i64 = ledger
            .blocks()
            .iter()
            .flat_map(|b| b.transactions())
            .map(|tx| match tx {
                Transaction::Reward { amount, .. } => amount.as_signed(),
                _ => 0,
            })
            .sum();
        let total: i64 = NAMES.iter().map(|n| ledger.balance(&Address::new(*n))).sum();
        prop_assert_eq!(total, minted);
    }

    #[test]
    fn mining_check_never_overdraws(rounds in rounds()) {
        let ledger = run(TransferCheck::Mining, &rounds);
        for n in NAMES {
            prop_assert!(ledger.balance(&Address::new(n)) >= 0);
        }
    }

    #[test]
    fn mined_chains_pass_integrity(rounds in rounds()) {
        let ledger = run(TransferCheck::Admission, &rounds);
        prop_assert_eq!(ledger.verify_integrity(), Ok(()));
        prop_assert!(ledger.mempool().is_empty());
    }

    #[test]
    fn snapshot_round_trip(rounds in rounds(), pending in prop::collection::vec(transfer(), 0..3)) {
        let mut ledger = run(TransferCheck::Mining, &rounds);
        for tx in pending {
            ledger.admit(tx);
        }
        let decoded = decode(&encode(&ledger).unwrap()).unwrap();
        prop_assert_eq!(decoded, ledger);
    }
}
