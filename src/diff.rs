use crate::models::SeenSet;

/// Identifiers in `current` that were not seen on the previous run.
/// Identifiers only in `previous` are dropped, not reported.
pub fn new_ids(current: &SeenSet, previous: &SeenSet) -> SeenSet {
    current.difference(previous).cloned().collect()
}
