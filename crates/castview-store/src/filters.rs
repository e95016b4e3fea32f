//! Search-history filter table.
//!
//! The search view stores each query together with the filter it ran
//! under; the label shown for a stored entry comes from this table. The
//! lookup is total: unknown filter values fall back to the "All" label
//! instead of erroring, so old entries survive filter renames.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// A selectable search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFilter {
    /// Stored filter value
    pub value: &'static str,

    /// Display label
    pub label: &'static str,
}

/// Label used when a stored filter value is not recognized.
pub const DEFAULT_FILTER_LABEL: &str = "All";

/// The selectable search filters, in display order.
pub static SEARCH_FILTERS: &[SearchFilter] = &[
    SearchFilter { value: "all", label: "All" },
    SearchFilter { value: "games", label: "Game" },
    SearchFilter { value: "channels", label: "Channel" },
    SearchFilter { value: "streams", label: "Stream" },
];

static FILTER_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    SEARCH_FILTERS
        .iter()
        .map(|filter| (filter.value, filter.label))
        .collect()
});

/// Display label for a stored filter value.
///
/// Total: unknown values map to [`DEFAULT_FILTER_LABEL`].
pub fn filter_label(value: &str) -> &'static str {
    FILTER_LABELS
        .get(value)
        .copied()
        .unwrap_or(DEFAULT_FILTER_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_filters() {
        assert_eq!(filter_label("all"), "All");
        assert_eq!(filter_label("games"), "Game");
        assert_eq!(filter_label("channels"), "Channel");
        assert_eq!(filter_label("streams"), "Stream");
    }

    #[test]
    fn test_unknown_filter_falls_back() {
        assert_eq!(filter_label("unrecognized-key"), "All");
        assert_eq!(filter_label(""), "All");
    }

    #[test]
    fn test_display_order() {
        let values: Vec<_> = SEARCH_FILTERS.iter().map(|f| f.value).collect();
        assert_eq!(values, vec!["all", "games", "channels", "streams"]);
    }
}
