//! `notary`: command-line front end for the notarization ledger.

mod config;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use config::{ConfigOverrides, NotaryConfig};
use notary_ledger::{GenesisConfig, Ledger, LedgerError, Notary, Transaction, TransferCheck, Verification};
use notary_store::{FileSnapshotStore, SnapshotStore};
use notary_types::{Address, Amount, Clock, Digest, SystemClock, Timestamp};
use notary_utils::LogFormat;

#[derive(Parser)]
#[command(
    name = "notary",
    version,
    about = "Notarize files and move a toy currency on a local proof-of-work chain"
)]
struct Cli {
    /// Snapshot file holding the chain [default: multicoin.dat].
    #[arg(long, env = "NOTARY_CHAIN")]
    chain: Option<PathBuf>,

    /// Unit-of-account name, applied only when a new chain is created
    /// [default: MultiCoin].
    #[arg(long, alias = "coin-name", env = "NOTARY_UNIT_NAME")]
    unit_name: Option<String>,

    /// Leading zero hex digits required of block hashes, for new chains.
    #[arg(long, env = "NOTARY_DIFFICULTY")]
    difficulty: Option<u32>,

    /// Mining reward for new chains.
    #[arg(long = "reward", env = "NOTARY_BASE_REWARD")]
    base_reward: Option<u64>,

    /// When transfers are balance-checked: "admission" or "mining".
    #[arg(long, env = "NOTARY_TRANSFER_CHECK", value_parser = parse_transfer_check)]
    transfer_check: Option<TransferCheck>,

    /// Label embedded in the genesis message [default: tool].
    #[arg(long, env = "NOTARY_MODE")]
    mode: Option<String>,

    /// Repository URL recorded in the genesis block of a new chain.
    #[arg(long, env = "NOTARY_PROVENANCE_REPO")]
    provenance_repo: Option<String>,

    /// Commit hash recorded in the genesis block of a new chain.
    #[arg(long, env = "NOTARY_PROVENANCE_COMMIT")]
    provenance_commit: Option<String>,

    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "NOTARY_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "warn,notary_ledger=debug".
    #[arg(long, env = "NOTARY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format: "human" or "json".
    #[arg(long, env = "NOTARY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Queue a file's fingerprint for notarization.
    Notarize {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Queue a currency transfer.
    Transfer {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: u64,
    },
    /// Mine a block with all pending transactions.
    Mine {
        /// Reward recipient [default: $USER, or local_miner].
        #[arg(long)]
        miner: Option<String>,
        /// Reward for this block instead of the chain's base reward.
        #[arg(long)]
        reward: Option<u64>,
    },
    /// Check whether a file (or a SHA-256 digest) has been notarized.
    Verify {
        #[arg(required_unless_present = "digest")]
        file: Option<PathBuf>,
        /// Hex SHA-256 digest to look up instead of a file.
        #[arg(long, conflicts_with = "file")]
        digest: Option<String>,
    },
    /// Show an address's balance.
    Balance {
        #[arg(long)]
        address: String,
    },
    /// Show chain statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Print the whole chain.
    Print,
    /// Verify chain integrity.
    Check,
    /// Run an in-memory currency simulation.
    Simulate,
}

fn parse_transfer_check(s: &str) -> Result<TransferCheck, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "admission" => Ok(TransferCheck::Admission),
        "mining" => Ok(TransferCheck::Mining),
        other => Err(format!("unknown transfer check '{other}', expected 'admission' or 'mining'")),
    }
}

fn default_miner() -> String {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "local_miner".to_string())
}

fn address(raw: &str) -> anyhow::Result<Address> {
    raw.parse::<Address>()
        .with_context(|| format!("invalid address '{raw}'"))
}

fn resolve_config(cli: &Cli) -> anyhow::Result<NotaryConfig> {
    let base = match &cli.config {
        Some(path) => NotaryConfig::from_toml_file(path)?,
        None => NotaryConfig::default(),
    };
    let overrides = ConfigOverrides {
        chain: cli.chain.clone(),
        unit_name: cli.unit_name.clone(),
        mode: cli.mode.clone(),
        difficulty: cli.difficulty,
        base_reward: cli.base_reward,
        transfer_check: cli.transfer_check,
        log_level: cli.log_level.clone(),
        log_format: cli.log_format,
        provenance_repo: cli.provenance_repo.clone(),
        provenance_commit: cli.provenance_commit.clone(),
    };
    Ok(overrides.apply(base)?)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    notary_utils::init_logging(config.log_format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    let notary = Notary::new(
        FileSnapshotStore::new(&config.chain),
        SystemClock,
        config.ledger_params(),
        config.genesis(),
    );
    tracing::debug!(chain = %config.chain.display(), "using chain");

    let mut stdout = std::io::stdout().lock();
    Ok(run(cli.command, &notary, &config, &mut stdout)?.into())
}

/// How a command ended when it did not fail outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    Rejected,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Rejected => ExitCode::FAILURE,
        }
    }
}

/// Execute one subcommand, writing its report to `out`.
fn run<S: SnapshotStore, C: Clock>(
    command: Command,
    notary: &Notary<S, C>,
    config: &NotaryConfig,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    match command {
        Command::Notarize { owner, file } => {
            let owner = address(&owner)?;
            let digest = notary
                .notarize(&owner, &file)
                .with_context(|| format!("failed to notarize {}", file.display()))?;
            writeln!(out, "Queued notarization of '{}' for {owner}", file.display())?;
            writeln!(out, "SHA-256: {digest}")?;
            writeln!(out, "Run `notary mine` to confirm it.")?;
        }
        Command::Transfer { from, to, amount } => {
            let (from, to, amount) = (address(&from)?, address(&to)?, Amount::new(amount));
            match notary.transfer(&from, &to, amount) {
                Ok(()) => writeln!(out, "Queued transfer of {amount} from {from} to {to}")?,
                Err(LedgerError::InsufficientFunds {
                    address,
                    available,
                    requested,
                }) => {
                    writeln!(
                        out,
                        "Transaction rejected: {address} has {available}, tried to send {requested}"
                    )?;
                    return Ok(Outcome::Rejected);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Mine { miner, reward } => {
            let miner = address(&miner.unwrap_or_else(default_miner))?;
            match notary.mine(&miner, reward.map(Amount::new))? {
                Some(block) => {
                    writeln!(out, "Block #{} mined", block.index)?;
                    writeln!(out, "Nonce: {}", block.nonce)?;
                    writeln!(out, "Hash: {}", block.hash)?;
                    writeln!(out, "Transactions: {}", block.transactions().len())?;
                }
                None => writeln!(out, "No pending transactions to mine.")?,
            }
        }
        Command::Verify { file, digest } => {
            let verification = match (digest, file) {
                (Some(hex), _) => {
                    let digest: Digest = hex.parse().with_context(|| format!("invalid digest '{hex}'"))?;
                    notary.verify_digest(digest)?
                }
                (None, Some(file)) => notary
                    .verify(&file)
                    .with_context(|| format!("failed to verify {}", file.display()))?,
                (None, None) => anyhow::bail!("either a file or --digest is required"),
            };
            report_verification(&verification, out)?;
        }
        Command::Balance { address: raw } => {
            let who = address(&raw)?;
            let unit = notary.unit_name()?;
            let confirmed = notary.balance(&who)?;
            let pending = notary.pending_balance(&who)?;
            writeln!(out, "Balance for {who}: {confirmed} {unit}")?;
            if pending != confirmed {
                writeln!(out, "Including pending transactions: {pending} {unit}")?;
            }
        }
        Command::Stats { json } => {
            let stats = notary.stats()?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else {
                writeln!(out, "Height: {}", stats.height)?;
                writeln!(out, "Transactions: {}", stats.tx_count)?;
                writeln!(out, "Pending: {}", stats.pending)?;
                writeln!(out, "Tip: {}", stats.tip_hash)?;
            }
        }
        Command::Print => write!(out, "{}", notary.print()?)?,
        Command::Check => {
            let stats = notary.check()?;
            writeln!(out, "Chain OK: {} blocks, tip {}", stats.height, stats.tip_hash)?;
        }
        Command::Simulate => simulate(config, out)?,
    }
    Ok(Outcome::Done)
}

fn report_verification(verification: &Verification, out: &mut impl Write) -> std::io::Result<()> {
    let Some(first) = verification.first() else {
        return writeln!(out, "Not notarized: {}", verification.digest);
    };
    if let Transaction::Notarization { owner, filename, .. } = &first.transaction {
        writeln!(out, "Verified: '{filename}' notarized by {owner} in block #{}", first.block_index)?;
    }
    writeln!(out, "SHA-256: {}", verification.digest)?;
    if verification.records.len() > 1 {
        let later: Vec<String> = verification.records[1..]
            .iter()
            .map(|r| format!("#{}", r.block_index))
            .collect();
        writeln!(out, "Notarized again in block(s) {}", later.join(", "))?;
    }
    Ok(())
}

/// Alice pays Bob 50 with no prior balance, MinerX mines the block.
fn simulate(config: &NotaryConfig, out: &mut impl Write) -> anyhow::Result<()> {
    const UNIT: &str = "SimCoin";
    let params = config.ledger_params().with_unit_name(UNIT);
    let mut ledger = Ledger::new(params, &GenesisConfig::new("simulate"), Timestamp::now());

    writeln!(out, "--- Round 1 ---")?;
    let (alice, bob, miner) = (Address::new("Alice"), Address::new("Bob"), Address::new("MinerX"));
    ledger.admit(Transaction::currency(alice.clone(), bob.clone(), Amount::new(50), Timestamp::now()));
    if let Some(block) = ledger.mine(&miner, None, Timestamp::now())? {
        writeln!(out, "Block #{} mined (nonce {})", block.index, block.nonce)?;
    }

    writeln!(out, "--- Final Balances ---")?;
    for who in [&alice, &bob, &miner] {
        writeln!(out, "Balance for {who}: {} {UNIT}", ledger.balance(who))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use notary_nullables::{NullClock, NullSnapshotStore};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "notary",
            "--chain",
            "ivxx_chain.dat",
            "--coin-name",
            "ivxx",
            "--transfer-check",
            "mining",
            "mine",
            "--miner",
            "ivxx",
            "--reward",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.chain, Some(PathBuf::from("ivxx_chain.dat")));
        assert_eq!(cli.unit_name.as_deref(), Some("ivxx"));
        assert_eq!(cli.transfer_check, Some(TransferCheck::Mining));
        match cli.command {
            Command::Mine { miner, reward } => {
                assert_eq!(miner.as_deref(), Some("ivxx"));
                assert_eq!(reward, Some(5));
            }
            _ => panic!("expected mine"),
        }
    }

    #[test]
    fn verify_needs_file_or_digest() {
        assert!(Cli::try_parse_from(["notary", "verify"]).is_err());
        assert!(Cli::try_parse_from(["notary", "verify", "a.txt"]).is_ok());
        assert!(Cli::try_parse_from(["notary", "verify", "--digest", "00"]).is_ok());
        assert!(Cli::try_parse_from(["notary", "verify", "a.txt", "--digest", "00"]).is_err());
    }

    #[test]
    fn transfer_check_parser() {
        assert_eq!(parse_transfer_check("Mining"), Ok(TransferCheck::Mining));
        assert!(parse_transfer_check("never").is_err());
    }

    fn test_notary() -> Notary<NullSnapshotStore, NullClock> {
        let config = NotaryConfig {
            difficulty: 1,
            ..Default::default()
        };
        Notary::new(
            NullSnapshotStore::new(),
            NullClock::new(1_700_000_000),
            config.ledger_params(),
            config.genesis(),
        )
    }

    fn run_to_string(notary: &Notary<NullSnapshotStore, NullClock>, args: &[&str]) -> (Outcome, String) {
        let cli = Cli::try_parse_from(std::iter::once("notary").chain(args.iter().copied())).unwrap();
        let mut out = Vec::new();
        let code = run(cli.command, notary, &NotaryConfig::default(), &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn overdraft_is_rejected_with_failure_status() {
        let notary = test_notary();
        let (code, out) = run_to_string(&notary, &["transfer", "--from", "Alice", "--to", "Bob", "--amount", "50"]);
        assert_eq!(code, Outcome::Rejected);
        assert_eq!(out, "Transaction rejected: Alice has 0, tried to send 50\n");
        assert_eq!(notary.stats().unwrap().pending, 0);
    }

    #[test]
    fn balance_report_shows_pending_when_it_differs() {
        let notary = test_notary();
        let (code, _) = run_to_string(&notary, &["mine", "--miner", "Alice", "--reward", "80"]);
        assert_eq!(code, Outcome::Done);

        let (_, out) = run_to_string(&notary, &["balance", "--address", "Alice"]);
        assert_eq!(out, "Balance for Alice: 80 MultiCoin\n");

        let (code, _) = run_to_string(&notary, &["transfer", "--from", "Alice", "--to", "Bob", "--amount", "30"]);
        assert_eq!(code, Outcome::Done);
        let (_, out) = run_to_string(&notary, &["balance", "--address", "Alice"]);
        assert_eq!(
            out,
            "Balance for Alice: 80 MultiCoin\nIncluding pending transactions: 50 MultiCoin\n"
        );
    }

    #[test]
    fn stats_json_fields() {
        let notary = test_notary();
        run_to_string(&notary, &["mine", "--miner", "m", "--reward", "1"]);
        let (_, out) = run_to_string(&notary, &["stats", "--json"]);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let stats = notary.stats().unwrap();
        assert_eq!(value["height"], 2);
        assert_eq!(value["tx_count"], 2);
        assert_eq!(value["pending"], 0);
        assert_eq!(value["tip_hash"], serde_json::to_value(stats.tip_hash).unwrap());
    }

    #[test]
    fn verify_unknown_digest() {
        let notary = test_notary();
        let hex = "ab".repeat(32);
        let (code, out) = run_to_string(&notary, &["verify", "--digest", &hex]);
        assert_eq!(code, Outcome::Done);
        assert_eq!(out, format!("Not notarized: {hex}\n"));
    }

    #[test]
    fn config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notary.toml");
        std::fs::write(&path, "chain = \"from-file.dat\"\ndifficulty = 3\n").unwrap();
        let cli = Cli::try_parse_from([
            "notary",
            "--config",
            path.to_str().unwrap(),
            "--difficulty",
            "1",
            "stats",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.chain, PathBuf::from("from-file.dat"));
        assert_eq!(config.difficulty, 1);
    }
}
