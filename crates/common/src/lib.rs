//! Common: naming conventions shared across the invariant crates.
//!
//! # Invariants
//! - A callable's display name is derived from its Rust type name only.
//! - The same callable always yields the same display name.
//! - Only singleton callables (fn items, non-capturing closures) are named by type.

mod naming;

pub use naming::{CLOSURE_SEGMENT, display_name, display_name_of, is_singleton, short_name};
