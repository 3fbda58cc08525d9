//! Declare: mark plain `(before, after)` predicates as named, described invariants.
//!
//! Marking never wraps a predicate. [`Declaration::mark`] records a tag for
//! the predicate's type in an [`InvariantTable`] and hands back the very same
//! value, so the predicate stays directly callable with its own signature.
//!
//! # Invariants
//! - A predicate is marked iff the table holds a tag for its type.
//! - `check_fn` in extracted metadata is the candidate itself, never a copy.
//! - Re-marking overwrites; the latest declaration wins.
//! - Only fn items and non-capturing closures can be marked; their type names exactly one function.
//!
//! ```
//! use invariant_declare::InvariantTable;
//!
//! fn no_negative_balance(_before: &i64, after: &i64) -> bool {
//!     *after >= 0
//! }
//!
//! let mut table = InvariantTable::new();
//! let check = table
//!     .declare("balance never goes negative")
//!     .mark(no_negative_balance);
//!
//! let (before, after) = (10_i64, -5_i64);
//! assert!(check(&before, &before));
//! let meta = table.extract_metadata(&check).unwrap();
//! assert_eq!(meta.name, "no_negative_balance");
//! assert!(!meta.check(&before, &after));
//! ```

mod metadata;
mod table;

pub use metadata::InvariantMetadata;
pub use table::{Declaration, InvariantTable, declare};
