use crate::address::strip_separators;

const MARKER: &str = "(base 16)";
const MARKER_COLUMN: usize = 11;

/// Reduces the registry text to `(prefix, vendor)` pairs, in document order.
///
/// Only lines carrying the base-16 marker at column 11 are kept; the hex
/// and address-block lines of each entry use a different layout and are
/// dropped. Prefixes are stored in lookup form (separators removed,
/// uppercase). Nothing is deduplicated.
pub fn compact(doc: &str) -> impl Iterator<Item = (String, &str)> {
    doc.lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            if line.find(MARKER)? != MARKER_COLUMN {
                return None;
            }
            let (prefix, vendor) = line.split_at(MARKER_COLUMN);
            Some((strip_separators(prefix.trim()), vendor[MARKER.len()..].trim()))
        })
}
