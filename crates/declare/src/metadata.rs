use std::fmt;

/// Identity of a declared invariant, re-derived from the table on each lookup.
pub struct InvariantMetadata<'a, F: ?Sized> {
    /// Stable identifier; defaults to the predicate's own name.
    pub name: String,
    /// Human-readable explanation. Informational only.
    pub description: String,
    /// The exact predicate the metadata was extracted for.
    pub check_fn: &'a F,
}

impl<F: ?Sized> InvariantMetadata<'_, F> {
    /// Run the predicate. Identical to calling `check_fn` directly.
    pub fn check<S: ?Sized>(&self, before: &S, after: &S) -> bool
    where
        F: Fn(&S, &S) -> bool,
    {
        (self.check_fn)(before, after)
    }
}

impl<'a, F> InvariantMetadata<'a, F> {
    /// Forget the predicate's concrete type so invariants over the same state
    /// can be collected together. `check_fn` still points at the same predicate.
    pub fn erase<S: ?Sized>(self) -> InvariantMetadata<'a, dyn Fn(&S, &S) -> bool + 'static>
    where
        F: Fn(&S, &S) -> bool + 'static,
    {
        InvariantMetadata {
            name: self.name,
            description: self.description,
            check_fn: self.check_fn,
        }
    }
}

impl<F: ?Sized> Clone for InvariantMetadata<'_, F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            check_fn: self.check_fn,
        }
    }
}

impl<F: ?Sized> fmt::Debug for InvariantMetadata<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvariantMetadata")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F: ?Sized> fmt::Display for InvariantMetadata<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}
