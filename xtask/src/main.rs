use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for invariant-first")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc, demo
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Run the ledger demo: one passing and one violating transition
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_doc()?;
            run_demo()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Doc => run_doc()?,
        Commands::Demo => run_demo()?,
    }

    Ok(())
}

/// Run `cargo <args>` and report whether it exited successfully.
fn cargo(args: &[&str]) -> Result<bool> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    Ok(status.success())
}

fn require(args: &[&str]) -> Result<()> {
    if !cargo(args)? {
        anyhow::bail!("cargo {} failed", args[0]);
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    require(&["fmt", "--all", "--", "--check"])
}

fn run_clippy() -> Result<()> {
    require(&[
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ])
}

fn run_tests() -> Result<()> {
    require(&["test", "--workspace"])
}

fn run_doc() -> Result<()> {
    require(&["doc", "--workspace", "--no-deps"])
}

/// A valid transfer must exit 0 and an overdraft must exit non-zero.
fn run_demo() -> Result<()> {
    let base = ["run", "-q", "-p", "invariant-cli", "--"];

    let transfer = [&base[..], &["transfer", "--from", "alice", "--to", "bob", "-n", "20"]].concat();
    require(&transfer)?;

    let overdraft = [&base[..], &["--json", "withdraw", "--account", "bob", "-n", "80"]].concat();
    if cargo(&overdraft)? {
        anyhow::bail!("overdraft was not reported as an invariant violation");
    }
    println!("==> demo ok: overdraft rejected");
    Ok(())
}
