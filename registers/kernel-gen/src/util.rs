// Licensed under the Apache-2.0 license

//! Formatting helpers shared by the renderers.

/// Depth of the register list inside the generated document; rendered blocks
/// start this many tabs in before any caller-supplied nesting.
const BASE_DEPTH: usize = 2;

/// Returns the tab prefix for a line `depth` levels below the block start.
pub(crate) fn tabs(indent: usize, depth: usize) -> String {
    "\t".repeat(BASE_DEPTH + indent + depth)
}

/// Strips a leading `keyword` token from a captured value.
///
/// `MATCH 0x1234` becomes `0x1234`; `MATCHED` and `0x1234` are returned as is.
pub(crate) fn strip_keyword<'a>(value: &'a str, keyword: &str) -> &'a str {
    if keyword.is_empty() {
        return value;
    }
    match value.strip_prefix(keyword) {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => value,
    }
}
