use std::fmt::Display;

use invariant_common::{display_name_of, is_singleton};

use crate::record::ViolationRecord;

/// Raised when a state transition violates a declared invariant.
///
/// A violation is a logic error, not a runtime condition: it is built once,
/// at the moment a predicate returns `false`, and propagated to the top-level
/// caller. The states are held as given; pass owned snapshots or borrows,
/// whichever the caller can keep alive. Only their `Display` rendering is used.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct InvariantViolation<S> {
    invariant_name: String,
    invariant_description: String,
    before_state: S,
    after_state: S,
    transition: String,
    message: String,
}

impl<S: Display> InvariantViolation<S> {
    /// Build a violation for `transition`, naming it after its Rust item.
    ///
    /// `transition` must be a fn item or a non-capturing closure; a fn pointer
    /// or `dyn Fn` carries no name and is rejected at compile time. Use
    /// [`InvariantViolation::with_transition_name`] for those.
    ///
    /// ```compile_fail
    /// use invariant_violation::InvariantViolation;
    ///
    /// fn decrement(n: i64) -> i64 {
    ///     n - 1
    /// }
    ///
    /// let erased: fn(i64) -> i64 = decrement;
    /// InvariantViolation::new("non_negative", "stays positive", 0_i64, -1_i64, &erased);
    /// ```
    pub fn new<T>(
        invariant_name: impl Into<String>,
        invariant_description: impl Into<String>,
        before_state: S,
        after_state: S,
        transition: &T,
    ) -> Self {
        const {
            assert!(
                is_singleton::<T>(),
                "transitions must be fn items or non-capturing closures"
            )
        };

        Self::with_transition_name(
            invariant_name,
            invariant_description,
            before_state,
            after_state,
            display_name_of(transition),
        )
    }

    /// Build a violation for a transition known only by its display name.
    pub fn with_transition_name(
        invariant_name: impl Into<String>,
        invariant_description: impl Into<String>,
        before_state: S,
        after_state: S,
        transition: impl Into<String>,
    ) -> Self {
        let invariant_name = invariant_name.into();
        let invariant_description = invariant_description.into();
        let transition = transition.into();
        let message = format!(
            "Invariant violated: {invariant_name}\n\
             Description: {invariant_description}\n\
             Transition: {transition}\n\
             Before state: {before_state}\n\
             After state:  {after_state}"
        );

        tracing::error!(
            invariant = %invariant_name,
            transition = %transition,
            "invariant violated"
        );

        Self {
            invariant_name,
            invariant_description,
            before_state,
            after_state,
            transition,
            message,
        }
    }

    /// Structured form for logging and telemetry.
    pub fn to_structured_form(&self) -> ViolationRecord {
        ViolationRecord {
            error: ViolationRecord::KIND.to_owned(),
            invariant: self.invariant_name.clone(),
            description: self.invariant_description.clone(),
            transition: self.transition.clone(),
            before_state: self.before_state.to_string(),
            after_state: self.after_state.to_string(),
        }
    }
}

impl<S> InvariantViolation<S> {
    pub fn invariant_name(&self) -> &str {
        &self.invariant_name
    }

    pub fn invariant_description(&self) -> &str {
        &self.invariant_description
    }

    pub fn before_state(&self) -> &S {
        &self.before_state
    }

    pub fn after_state(&self) -> &S {
        &self.after_state
    }

    /// Display name of the transition that produced `after_state`.
    pub fn transition(&self) -> &str {
        &self.transition
    }

    /// The canonical multi-line message; same text as `Display`.
    pub fn message(&self) -> &str {
        &self.message
    }
}
