//! Change detection across the bundle graph.

use super::{Bundle, BuildError, Marker, Registry};

/// Whether `bundle` must be rebuilt.
///
/// A bundle has changed when it was never built in this process, was
/// invalidated, or any direct entry reports a new marker. Nested bundles are
/// checked recursively, and a nested bundle that was rebuilt through another
/// parent counts as a change too.
///
/// Stops at the first change. Markers of `bundle`'s own entries are remembered
/// and committed only after a successful build; nested bundles are compared
/// without touching their state, since only their own build may advance it.
pub fn has_changed(registry: &Registry, bundle: &Bundle) -> Result<bool, BuildError> {
    let mut stack = Vec::new();
    bundle.begin_check();
    check(registry, bundle, &mut stack, true)
}

fn check<'a>(
    registry: &'a Registry,
    bundle: &'a Bundle,
    stack: &mut Vec<&'a str>,
    observe: bool,
) -> Result<bool, BuildError> {
    if stack.contains(&bundle.name()) {
        return Err(cycle_error(stack, bundle.name()));
    }
    if bundle.generation() == 0 || bundle.is_stale() {
        return Ok(true);
    }

    stack.push(bundle.name());
    let result = check_entries(registry, bundle, stack, observe);
    stack.pop();
    result
}

fn check_entries<'a>(
    registry: &'a Registry,
    bundle: &'a Bundle,
    stack: &mut Vec<&'a str>,
    observe: bool,
) -> Result<bool, BuildError> {
    for entry in bundle.entries() {
        let changed = match registry.get(entry.name()) {
            Some(nested) => {
                let marker = Marker::Generation(nested.generation());
                let rebuilt = if observe {
                    entry.observe(marker)
                } else {
                    entry.differs(marker)
                };
                rebuilt || check(registry, nested, stack, false)?
            }
            None if observe => entry.observe_current()?,
            None => entry.peek_current()?,
        };
        if changed {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn cycle_error(stack: &[&str], name: &str) -> BuildError {
    let start = stack.iter().position(|n| *n == name).unwrap_or(0);
    let mut path: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
    path.push(name.to_string());
    BuildError::Cycle(path)
}
