//! Merging collocation sets when a word is imported again.

use std::collections::HashSet;

use crate::types::CollocationsPattern;

/// Merge `incoming` into `existing`.
///
/// New patterns are added whole. For shared patterns, incoming items are
/// appended unless their text already exists (case-insensitive). Existing
/// items are never removed or reordered.
pub fn merge_collocations(
    existing: &CollocationsPattern,
    incoming: &CollocationsPattern,
) -> CollocationsPattern {
    let mut merged = existing.clone();

    for (pattern, items) in incoming {
        let target = merged.entry(pattern.clone()).or_default();
        let mut seen: HashSet<String> = target
            .iter()
            .map(|c| c.collocation.to_lowercase())
            .collect();
        for item in items {
            if seen.insert(item.collocation.to_lowercase()) {
                target.push(item.clone());
            }
        }
    }

    merged
}

/// Total number of collocations across all patterns.
pub fn count_collocations(collocations: &CollocationsPattern) -> usize {
    collocations.values().map(Vec::len).sum()
}
