use std::collections::BTreeMap;
use std::fmt;

/// A transition that cannot be applied at all, as opposed to one that breaks an invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("balance of `{account}` overflows: {balance} {op} {amount}")]
    Overflow {
        account: String,
        balance: i64,
        op: char,
        amount: i64,
    },
}

/// Account balances, the state the demo transitions operate on.
///
/// BTreeMap keeps rendering order stable, so violation messages are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    balances: BTreeMap<String, i64>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ledger used when no `--balance` flags are given.
    pub fn seeded() -> Self {
        Self::from_balances([("alice".to_owned(), 100), ("bob".to_owned(), 50)])
    }

    pub fn from_balances(balances: impl IntoIterator<Item = (String, i64)>) -> Self {
        Self {
            balances: balances.into_iter().collect(),
        }
    }

    pub fn balance(&self, account: &str) -> Option<i64> {
        self.balances.get(account).copied()
    }

    /// Sum of all balances. Widened so that any set of `i64` balances fits.
    pub fn total(&self) -> i128 {
        self.balances.values().map(|b| i128::from(*b)).sum()
    }

    fn adjust(&mut self, account: &str, op: char, amount: i64) -> Result<(), LedgerError> {
        let balance = self.balances.entry(account.to_owned()).or_insert(0);
        let current = *balance;
        let next = match op {
            '+' => current.checked_add(amount),
            _ => current.checked_sub(amount),
        };
        *balance = next.ok_or_else(|| LedgerError::Overflow {
            account: account.to_owned(),
            balance: current,
            op,
            amount,
        })?;
        Ok(())
    }

    pub fn balances(&self) -> &BTreeMap<String, i64> {
        &self.balances
    }
}

/// Rendered like a dict dump: `{'alice': 100, 'bob': 50}`.
impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (account, balance)) in self.balances.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{account}': {balance}")?;
        }
        write!(f, "}}")
    }
}

/// Debit `amount` from `account`. Does not check for overdraft.
pub fn withdraw(ledger: &Ledger, account: &str, amount: i64) -> Result<Ledger, LedgerError> {
    let mut next = ledger.clone();
    next.adjust(account, '-', amount)?;
    Ok(next)
}

/// Move `amount` from `from` to `to`.
///
/// Only debits accounts that exist; transferring out of an unknown account
/// still credits the destination.
pub fn transfer(ledger: &Ledger, from: &str, to: &str, amount: i64) -> Result<Ledger, LedgerError> {
    let mut next = ledger.clone();
    if next.balances.contains_key(from) {
        next.adjust(from, '-', amount)?;
    }
    next.adjust(to, '+', amount)?;
    Ok(next)
}
