//! Missing-key computation between two language dictionaries.

use std::collections::{BTreeMap, HashMap};

/// Returns the entries present in `source` but absent from `target`, sorted
/// ascending by key. Membership is decided by exact key match only; values
/// never matter.
pub fn missing_entries(
    source: &HashMap<String, String>,
    target: &HashMap<String, String>,
) -> Vec<(String, String)> {
    let missing: BTreeMap<&String, &String> = source
        .iter()
        .filter(|(key, _)| !target.contains_key(*key))
        .collect();

    missing
        .into_iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// A target dictionary larger than its source usually means a stale or
/// oversized target file; worth a warning, never an error.
pub fn target_is_oversized(
    source: &HashMap<String, String>,
    target: &HashMap<String, String>,
) -> bool {
    target.len() > source.len()
}
