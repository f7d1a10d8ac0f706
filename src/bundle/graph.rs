//! Nesting structure between bundle definitions.
//!
//! An entry whose name equals another bundle's name is a nested bundle.
//! Nesting must form a forest; cycles are reported with their full path.

use rustc_hash::FxHashMap;

use crate::config::BundleDefinitions;

/// Visit state for depth-first traversal.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Find a nesting cycle, returned as the path that closes it
/// (`["a.css", "b.css", "a.css"]`).
///
/// Bundles are visited in name order so the reported cycle is stable.
pub fn find_cycle(bundles: &BundleDefinitions) -> Option<Vec<String>> {
    let mut marks: FxHashMap<&str, Mark> = FxHashMap::default();
    let mut stack: Vec<&str> = Vec::new();

    for name in bundles.keys() {
        if let Some(cycle) = visit(bundles, name, &mut marks, &mut stack) {
            return Some(cycle);
        }
    }
    None
}

fn visit<'a>(
    bundles: &'a BundleDefinitions,
    name: &'a str,
    marks: &mut FxHashMap<&'a str, Mark>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    match marks.get(name) {
        Some(Mark::Done) => return None,
        Some(Mark::Visiting) => {
            let start = stack.iter().position(|n| *n == name).unwrap_or(0);
            let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Some(cycle);
        }
        None => {}
    }

    let (key, entries) = bundles.get_key_value(name)?;
    marks.insert(key, Mark::Visiting);
    stack.push(key);

    for entry in entries {
        if bundles.contains_key(entry.as_str())
            && let Some(cycle) = visit(bundles, entry, marks, stack)
        {
            return Some(cycle);
        }
    }

    stack.pop();
    marks.insert(key, Mark::Done);
    None
}
