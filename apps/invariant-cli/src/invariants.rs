use anyhow::Context;
use invariant_common::display_name_of;
use invariant_declare::{InvariantMetadata, InvariantTable};
use invariant_violation::InvariantViolation;

use crate::ledger::Ledger;

/// A declared ledger invariant with its predicate type erased.
pub type LedgerInvariant = InvariantMetadata<'static, dyn Fn(&Ledger, &Ledger) -> bool>;

pub fn no_negative_balance(_before: &Ledger, after: &Ledger) -> bool {
    after.balances().values().all(|balance| *balance >= 0)
}

pub fn total_conserved(before: &Ledger, after: &Ledger) -> bool {
    before.total() == after.total()
}

pub fn total_never_increases(before: &Ledger, after: &Ledger) -> bool {
    after.total() <= before.total()
}

/// Declare every ledger invariant in a fresh table.
pub fn declare_all() -> InvariantTable {
    let mut table = InvariantTable::new();
    table
        .declare("balance never goes negative")
        .mark(no_negative_balance);
    table
        .declare("money is neither created nor destroyed")
        .mark(total_conserved);
    table
        .declare("no transition creates money")
        .mark(total_never_increases);
    table
}

/// Invariants that apply to a withdrawal. Money leaves the ledger, so
/// `total_conserved` does not.
pub fn withdrawal_invariants(table: &InvariantTable) -> anyhow::Result<Vec<LedgerInvariant>> {
    Ok(vec![
        lookup(table, &no_negative_balance)?,
        lookup(table, &total_never_increases)?,
    ])
}

/// Invariants that apply to a transfer: every declared one.
pub fn transfer_invariants(table: &InvariantTable) -> anyhow::Result<Vec<LedgerInvariant>> {
    Ok(vec![
        lookup(table, &no_negative_balance)?,
        lookup(table, &total_conserved)?,
        lookup(table, &total_never_increases)?,
    ])
}

fn lookup<F>(table: &InvariantTable, predicate: &'static F) -> anyhow::Result<LedgerInvariant>
where
    F: Fn(&Ledger, &Ledger) -> bool + 'static,
{
    table
        .extract_metadata(predicate)
        .map(|meta| meta.erase::<Ledger>())
        .with_context(|| format!("{} is not a declared invariant", display_name_of(predicate)))
}

/// Check invariants across a transition, stopping at the first broken one.
///
/// A broken invariant is returned as an [`InvariantViolation<Ledger>`] inside
/// the `anyhow::Error`; callers that want the structured form downcast it.
pub fn verify<T>(
    invariants: &[LedgerInvariant],
    before: &Ledger,
    after: &Ledger,
    transition: &T,
) -> anyhow::Result<()> {
    for invariant in invariants {
        if invariant.check(before, after) {
            tracing::info!(
                invariant = %invariant.name,
                transition = display_name_of(transition),
                "invariant holds"
            );
            continue;
        }

        return Err(InvariantViolation::new(
            invariant.name.clone(),
            invariant.description.clone(),
            before.clone(),
            after.clone(),
            transition,
        )
        .into());
    }
    Ok(())
}
