/// Path segment rustc uses for closures in type names.
pub const CLOSURE_SEGMENT: &str = "{{closure}}";

/// Whether the type `F` alone identifies a single callable.
///
/// Holds for fn items and non-capturing closures: they are zero-sized, so the
/// type has exactly one value. Fn pointers, boxed or borrowed `dyn Fn` and
/// capturing closures all fail it; many different callables share their type.
pub const fn is_singleton<F>() -> bool {
    std::mem::size_of::<F>() == 0
}

/// Display name of the callable type `F`.
///
/// Fn items and closures each have a unique type, so this is the closest
/// thing Rust has to a function's own name: `my_crate::ledger::withdraw`
/// becomes `"withdraw"`. Closures keep their enclosing item as a prefix
/// (`"check::{{closure}}"`) so they stay distinguishable in diagnostics.
pub fn display_name<F: ?Sized>() -> &'static str {
    short_name(std::any::type_name::<F>())
}

/// Display name of the type of `value`. See [`display_name`].
pub fn display_name_of<F: ?Sized>(_value: &F) -> &'static str {
    display_name::<F>()
}

/// Reduce a full type path to its trailing segment, dropping generic arguments.
///
/// Returns the input unchanged when it has no path structure to reduce
/// (fn pointer types, qualified paths starting with `<`).
pub fn short_name(full: &str) -> &str {
    let path = full.split('<').next().unwrap_or(full);
    if path.is_empty() {
        return full;
    }

    let mut segments = path.rsplit("::");
    let last = segments.next().unwrap_or(path);
    if last == CLOSURE_SEGMENT
        && let Some(parent) = segments.next()
    {
        let start = path.len() - last.len() - parent.len() - 2;
        return &path[start..];
    }
    last
}
