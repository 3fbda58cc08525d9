//! Violation: the error raised when a transition breaks a declared invariant.
//!
//! # Invariants
//! - Every violation carries the same five fields, in the same canonical message layout.
//! - The structured form and the message always agree on content.
//! - Nothing here catches or recovers from a violation; callers propagate it.

mod record;
mod violation;

pub use record::ViolationRecord;
pub use violation::InvariantViolation;
