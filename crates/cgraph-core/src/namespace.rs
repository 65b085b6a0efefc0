//! Dotted-name utilities shared across the definition store, scope tree and
//! class registry. A namespace is simply a `.`-joined path of identifiers;
//! this module never allocates a dedicated type for it because every
//! consumer wants a different borrow shape (`&str`, `String`, `Cow<str>`).

use std::path::Path;

/// Splits `namespace` into `(parent, simple_name)`. The empty string is not a
/// valid namespace and panics callers into fixing their input rather than
/// silently returning a degenerate split.
pub fn split_simple_name(namespace: &str) -> (&str, &str) {
    debug_assert!(!namespace.is_empty(), "namespace must not be empty");
    match namespace.rsplit_once('.') {
        Some((parent, name)) => (parent, name),
        None => ("", namespace),
    }
}

/// The last dotted component of `namespace`.
pub fn simple_name(namespace: &str) -> &str {
    split_simple_name(namespace).1
}

/// The namespace minus its last dotted component, or `""` for a top-level name.
pub fn parent_namespace(namespace: &str) -> &str {
    split_simple_name(namespace).0
}

pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

/// Right-anchored equality on dotted components: `a` and `b` are
/// attribute-equal if their final (simple-name) component matches, whatever
/// precedes it.
///
/// This over-matches when two unrelated classes share a simple name (e.g.
/// `pkg.a.Client` and `pkg.b.Client` are attribute-equal to each other). That
/// imprecision is accepted rather than fixed: the external-definition prune
/// this feeds is a best-effort heuristic, not a soundness-critical
/// resolution step.
pub fn attribute_equal(a: &str, b: &str) -> bool {
    simple_name(a) == simple_name(b)
}

/// Converts a source file path, relative to `package_root`, into a module
/// namespace. `__init__` modules collapse into their parent directory's
/// namespace since method/class attribution cannot distinguish a function
/// defined in `pkg/__init__.py` from one defined as `pkg`'s own top level.
pub fn path_to_module_namespace(entry: &Path, package_root: &Path) -> Option<String> {
    let relative = entry.strip_prefix(package_root).unwrap_or(entry);
    let mut components: Vec<String> = Vec::new();
    for component in relative.components() {
        let part = component.as_os_str().to_str()?;
        components.push(part.to_string());
    }
    if let Some(last) = components.last_mut() {
        if let Some(stripped) = last.strip_suffix(".py") {
            *last = stripped.to_string();
        }
    }
    if components.last().map(String::as_str) == Some("__init__") {
        components.pop();
    }
    if components.is_empty() {
        return None;
    }
    Some(components.join("."))
}
