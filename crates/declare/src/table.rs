use std::any::TypeId;
use std::collections::HashMap;

use invariant_common::{display_name, is_singleton};

use crate::metadata::InvariantMetadata;

/// Tag attached to a marked predicate. Its presence is the marker flag.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tag {
    name: String,
    description: String,
}

/// Side table of declared invariants, keyed by predicate type.
///
/// Every fn item and non-capturing closure has its own zero-sized type, so the
/// `TypeId` of such a predicate identifies the function itself rather than any
/// particular copy of it. Type-erased predicates (fn pointers, `Box<dyn Fn>`,
/// `&dyn Fn`) and capturing closures share one type between many callables,
/// so [`Declaration::mark`] refuses them at compile time. Queries must be made
/// with the declared predicate itself; an erased handle to it reads as
/// unmarked. Use [`InvariantMetadata::erase`] to collect declared invariants
/// of different types together.
///
/// The table is an ordinary value: scope it to a test, a module or a whole
/// program as the caller sees fit.
#[derive(Debug, Default)]
pub struct InvariantTable {
    tags: HashMap<TypeId, Tag>,
}

impl InvariantTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start declaring an invariant with the given description.
    ///
    /// Nothing is recorded until [`Declaration::mark`] is applied to a predicate.
    pub fn declare(&mut self, description: impl Into<String>) -> Declaration<'_> {
        Declaration {
            table: self,
            description: description.into(),
            name: None,
        }
    }

    /// Metadata for `candidate` if it has been marked, `None` otherwise.
    ///
    /// `check_fn` in the result borrows `candidate` itself.
    pub fn extract_metadata<'a, F: 'static>(
        &self,
        candidate: &'a F,
    ) -> Option<InvariantMetadata<'a, F>> {
        self.tags
            .get(&TypeId::of::<F>())
            .map(|tag| InvariantMetadata {
                name: tag.name.clone(),
                description: tag.description.clone(),
                check_fn: candidate,
            })
    }

    /// Whether `candidate` carries an invariant marker.
    ///
    /// Accepts anything, callable or not; unmarked values are simply `false`.
    /// Pass the predicate itself: a reference to it, a fn pointer or a boxed
    /// copy of a marked predicate has a different type and reads as unmarked.
    pub fn is_marked<T: ?Sized + 'static>(&self, _candidate: &T) -> bool {
        self.tags.contains_key(&TypeId::of::<T>())
    }

    /// Number of marked predicates.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether nothing has been marked yet.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Names of all declared invariants, sorted. Duplicates are kept.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.values().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// A pending invariant declaration. Apply it with [`Declaration::mark`].
#[must_use = "a declaration does nothing until it marks a predicate"]
pub struct Declaration<'t> {
    table: &'t mut InvariantTable,
    description: String,
    name: Option<String>,
}

impl Declaration<'_> {
    /// Use an explicit name instead of the predicate's own name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark `predicate` and return it unchanged.
    ///
    /// Only fn items and non-capturing closures can be marked. Anything whose
    /// type is shared by other callables is rejected when the call is compiled:
    ///
    /// ```compile_fail
    /// use invariant_declare::InvariantTable;
    ///
    /// fn never_negative(_before: &i64, after: &i64) -> bool {
    ///     *after >= 0
    /// }
    ///
    /// let mut table = InvariantTable::new();
    /// let erased: fn(&i64, &i64) -> bool = never_negative;
    /// table.declare("never negative").mark(erased);
    /// ```
    ///
    /// ```compile_fail
    /// use invariant_declare::InvariantTable;
    ///
    /// let floor = 5_i64;
    /// let mut table = InvariantTable::new();
    /// table
    ///     .declare("stays above the floor")
    ///     .mark(move |_before: &i64, after: &i64| *after >= floor);
    /// ```
    pub fn mark<S, F>(self, predicate: F) -> F
    where
        S: ?Sized,
        F: Fn(&S, &S) -> bool + 'static,
    {
        const {
            assert!(
                is_singleton::<F>(),
                "invariant predicates must be fn items or non-capturing closures"
            )
        };

        let name = self
            .name
            .unwrap_or_else(|| display_name::<F>().to_owned());
        let tag = Tag {
            name,
            description: self.description,
        };

        let previous = self.table.tags.insert(TypeId::of::<F>(), tag.clone());
        match previous {
            Some(prev) => tracing::debug!(
                name = %tag.name,
                previous = %prev.name,
                "invariant re-declared"
            ),
            None => tracing::debug!(name = %tag.name, "invariant declared"),
        }

        predicate
    }
}

/// Free-function form of [`InvariantTable::declare`].
pub fn declare(table: &mut InvariantTable, description: impl Into<String>) -> Declaration<'_> {
    table.declare(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Account {
        balance: i64,
    }

    fn no_negative_balance(_before: &Account, after: &Account) -> bool {
        after.balance >= 0
    }

    fn balance_conserved(before: &Account, after: &Account) -> bool {
        before.balance == after.balance
    }

    fn never_marked(_before: &Account, _after: &Account) -> bool {
        true
    }

    #[test]
    fn table_starts_empty() {
        let table = InvariantTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.names().is_empty());
    }

    #[test]
    fn mark_defaults_name_to_predicate_name() {
        let mut table = InvariantTable::new();
        let check = table
            .declare("balance never goes negative")
            .mark(no_negative_balance);

        assert!(table.is_marked(&check));
        let meta = table.extract_metadata(&check).unwrap();
        assert_eq!(meta.name, "no_negative_balance");
        assert_eq!(meta.description, "balance never goes negative");
    }

    #[test]
    fn explicit_name_wins_over_predicate_name() {
        let mut table = InvariantTable::new();
        let check = table
            .declare("total is conserved")
            .name("conservation")
            .mark(balance_conserved);

        let meta = table.extract_metadata(&check).unwrap();
        assert_eq!(meta.name, "conservation");
        assert_eq!(table.names(), vec!["conservation"]);
    }

    #[test]
    fn marked_predicate_behaves_like_original() {
        let mut table = InvariantTable::new();
        let check = declare(&mut table, "balance never goes negative").mark(no_negative_balance);

        let before = Account { balance: 10 };
        let ok = Account { balance: 5 };
        let bad = Account { balance: -5 };
        assert_eq!(check(&before, &ok), no_negative_balance(&before, &ok));
        assert_eq!(check(&before, &bad), no_negative_balance(&before, &bad));
        assert!(!check(&before, &bad));
    }

    #[test]
    fn check_fn_is_the_candidate_itself() {
        let mut table = InvariantTable::new();
        let check = table.declare("conserved").mark(balance_conserved);

        let meta = table.extract_metadata(&check).unwrap();
        assert!(std::ptr::eq(meta.check_fn, &check));

        let before = Account { balance: 3 };
        let after = Account { balance: 4 };
        assert_eq!(meta.check(&before, &after), check(&before, &after));
        assert_eq!((meta.check_fn)(&before, &before), check(&before, &before));
    }

    #[test]
    fn marking_is_by_function_not_by_copy() {
        let mut table = InvariantTable::new();
        table.declare("never negative").mark(no_negative_balance);

        // A fresh reference to the same fn item is still the marked predicate.
        let again = no_negative_balance;
        assert!(table.is_marked(&again));
    }

    #[test]
    fn unmarked_callables_are_absent() {
        let mut table = InvariantTable::new();
        table.declare("never negative").mark(no_negative_balance);

        let lambda = |_: &Account, _: &Account| true;
        assert!(!table.is_marked(&never_marked));
        assert!(!table.is_marked(&lambda));
        assert!(table.extract_metadata(&never_marked).is_none());
        assert!(table.extract_metadata(&lambda).is_none());
    }

    #[test]
    fn erased_handles_never_alias_a_marked_predicate() {
        let mut table = InvariantTable::new();
        table.declare("never negative").mark(no_negative_balance);

        // Two different predicates behind the same fn pointer type.
        let marked_ptr: fn(&Account, &Account) -> bool = no_negative_balance;
        let other_ptr: fn(&Account, &Account) -> bool = never_marked;
        assert!(!table.is_marked(&marked_ptr));
        assert!(!table.is_marked(&other_ptr));
        assert!(table.extract_metadata(&other_ptr).is_none());

        let boxed: Box<dyn Fn(&Account, &Account) -> bool> = Box::new(no_negative_balance);
        assert!(!table.is_marked(&boxed));
        assert!(table.extract_metadata(&boxed).is_none());

        // The predicate itself is still found.
        assert!(table.is_marked(&no_negative_balance));
    }

    #[test]
    fn only_the_predicate_itself_is_marked() {
        let mut table = InvariantTable::new();
        let check = table.declare("never negative").mark(no_negative_balance);
        let by_ref = &check;
        let boxed = Box::new(check);

        assert!(table.is_marked(by_ref));
        assert!(!table.is_marked(&boxed));
        assert!(table.extract_metadata(&boxed).is_none());
    }

    #[test]
    fn erased_metadata_keeps_identity_and_behaviour() {
        let mut table = InvariantTable::new();
        let check = table.declare("never negative").mark(no_negative_balance);
        let conserved = table.declare("conserved").mark(balance_conserved);

        let all: Vec<InvariantMetadata<'_, dyn Fn(&Account, &Account) -> bool>> = vec![
            table.extract_metadata(&check).unwrap().erase(),
            table.extract_metadata(&conserved).unwrap().erase(),
        ];

        let before = Account { balance: 10 };
        let after = Account { balance: -5 };
        let broken: Vec<&str> = all
            .iter()
            .filter(|meta| !meta.check(&before, &after))
            .map(|meta| meta.name.as_str())
            .collect();
        assert_eq!(broken, vec!["no_negative_balance", "balance_conserved"]);
        assert!(std::ptr::eq(
            all[0].check_fn as *const _ as *const (),
            &check as *const _ as *const (),
        ));
    }

    #[test]
    fn non_callables_are_not_marked() {
        let table = InvariantTable::new();
        assert!(!table.is_marked(&42_u32));
        assert!(!table.is_marked("no_negative_balance"));
        assert!(!table.is_marked(&Account { balance: 0 }));
    }

    #[test]
    fn closures_can_be_marked() {
        let mut table = InvariantTable::new();
        let non_decreasing = table
            .declare("balance never decreases")
            .name("non_decreasing")
            .mark(|before: &Account, after: &Account| after.balance >= before.balance);

        let meta = table.extract_metadata(&non_decreasing).unwrap();
        assert_eq!(meta.name, "non_decreasing");
        assert!(meta.check(&Account { balance: 1 }, &Account { balance: 2 }));
    }

    #[test]
    fn redeclaring_overwrites_metadata() {
        let mut table = InvariantTable::new();
        let check = table.declare("first description").mark(no_negative_balance);
        let check = table.declare("second description").mark(check);

        let meta = table.extract_metadata(&check).unwrap();
        assert_eq!(meta.description, "second description");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn metadata_is_rederived_each_access() {
        let mut table = InvariantTable::new();
        let check = table.declare("first").mark(no_negative_balance);
        let first = table.extract_metadata(&check).unwrap().description;

        let check = table.declare("second").name("renamed").mark(check);
        let second = table.extract_metadata(&check).unwrap();

        assert_eq!(first, "first");
        assert_eq!(second.description, "second");
        assert_eq!(second.name, "renamed");
    }

    #[test]
    fn names_are_sorted() {
        let mut table = InvariantTable::new();
        table.declare("b").mark(no_negative_balance);
        table.declare("a").mark(balance_conserved);
        assert_eq!(table.names(), vec!["balance_conserved", "no_negative_balance"]);
    }

    #[test]
    fn metadata_display_and_debug() {
        let mut table = InvariantTable::new();
        let check = table.declare("total is conserved").mark(balance_conserved);
        let meta = table.extract_metadata(&check).unwrap();

        assert_eq!(meta.to_string(), "balance_conserved: total is conserved");
        let debug = format!("{meta:?}");
        assert!(debug.contains("balance_conserved"));
        assert!(debug.contains("total is conserved"));
        assert_eq!(meta.clone().name, meta.name);
    }
}
