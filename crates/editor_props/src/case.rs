use std::sync::LazyLock;

use regex::Regex;

/// An ASCII uppercase letter that is not at the start of a word.
static INNER_UPPERCASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\B)([A-Z])").expect("static regex is valid"));

/// Convert a component type name to its hyphenated form (`TextArea` -> `text-area`).
///
/// Names that are already hyphenated pass through unchanged apart from lowercasing.
pub fn to_line(name: &str) -> String {
    INNER_UPPERCASE.replace_all(name, "-${1}").to_lowercase()
}
