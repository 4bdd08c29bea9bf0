use std::collections::BTreeSet;

/// Keeps the listed buckets that are on the allow-list, in listing order.
///
/// Duplicates in `listed` are kept as they are.
pub fn filter_selected(listed: &[String], allow_list: &BTreeSet<String>) -> Vec<String> {
    listed
        .iter()
        .filter(|name| allow_list.contains(name.as_str()))
        .cloned()
        .collect()
}
