//! Case folding shared by import and search.

/// Unicode lowercase form of `text`.
///
/// Stored names and titles are folded with this at import time, search
/// fragments at query time, so both sides always agree.
pub(crate) fn fold(text: &str) -> String {
    text.to_lowercase()
}
