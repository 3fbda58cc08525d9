mod invariants;
mod ledger;

use clap::{Parser, Subcommand};
use invariant_violation::InvariantViolation;
use tracing_subscriber::EnvFilter;

use crate::invariants::{declare_all, transfer_invariants, verify, withdrawal_invariants};
use crate::ledger::{Ledger, transfer, withdraw};

#[derive(Parser)]
#[command(
    name = "invariant-cli",
    about = "Apply ledger transitions and check them against declared invariants"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print violations as a JSON record instead of the canonical message
    #[arg(long, global = true)]
    json: bool,

    /// Starting balance as NAME=AMOUNT (repeatable); defaults to alice=100, bob=50
    #[arg(long = "balance", value_parser = parse_balance)]
    balances: Vec<(String, i64)>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and declared invariants
    Info,
    /// Withdraw from one account
    Withdraw {
        /// Account to debit
        #[arg(short, long)]
        account: String,
        /// Amount to withdraw
        #[arg(short = 'n', long)]
        amount: i64,
    },
    /// Move money between two accounts
    Transfer {
        /// Account to debit
        #[arg(long)]
        from: String,
        /// Account to credit
        #[arg(long)]
        to: String,
        /// Amount to move
        #[arg(short = 'n', long)]
        amount: i64,
    },
}

fn parse_balance(raw: &str) -> Result<(String, i64), String> {
    let (name, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=AMOUNT, got `{raw}`"))?;
    let amount = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount in `{raw}`: {e}"))?;
    Ok((name.trim().to_owned(), amount))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    let Err(err) = run(cli) else {
        return Ok(());
    };
    match json_report(&err, json)? {
        Some(report) => {
            println!("{report}");
            std::process::exit(1);
        }
        None => Err(err),
    }
}

/// Structured JSON for a failed run, when `--json` was given and the failure
/// is an invariant violation. Anything else is reported by `main` as usual.
fn json_report(err: &anyhow::Error, json: bool) -> anyhow::Result<Option<String>> {
    if !json {
        return Ok(None);
    }
    match err.downcast_ref::<InvariantViolation<Ledger>>() {
        Some(violation) => Ok(Some(violation.to_structured_form().to_json_pretty()?)),
        None => Ok(None),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let table = declare_all();
    let before = if cli.balances.is_empty() {
        Ledger::seeded()
    } else {
        Ledger::from_balances(cli.balances)
    };

    match cli.command {
        Commands::Info => {
            println!("invariant-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("ledger: {before}");
            println!("declared invariants: {}", table.len());
            for name in table.names() {
                println!("  {name}");
            }
        }
        Commands::Withdraw { account, amount } => {
            tracing::info!(%account, amount, "applying withdrawal");
            let after = withdraw(&before, &account, amount)?;
            verify(&withdrawal_invariants(&table)?, &before, &after, &withdraw)?;
            println!("OK: {before} -> {after}");
        }
        Commands::Transfer { from, to, amount } => {
            tracing::info!(%from, %to, amount, "applying transfer");
            let after = transfer(&before, &from, &to, amount)?;
            verify(&transfer_invariants(&table)?, &before, &after, &transfer)?;
            println!("OK: {before} -> {after}");
        }
    }

    Ok(())
}
