//! Segment-aligned path comparison shared by the tagging scheme and the
//! `PathPrefix` filter operator.

/// Separator between the segments of a materialized path.
pub const SEGMENT_SEPARATOR: char = '#';

/// Whether `prefix` is `path` itself or a whole-segment prefix of it.
///
/// `"3"` is a prefix of `"3#1"` but not of `"30"` or `"30#1"`.
pub fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEGMENT_SEPARATOR),
        None => false,
    }
}
