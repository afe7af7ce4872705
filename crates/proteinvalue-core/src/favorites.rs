use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User-flagged subset of tracked products.
///
/// Proper set semantics - toggling twice is a round trip, duplicates cannot
/// accumulate. Serializes as a plain id array, which is exactly the persisted
/// form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet {
    ids: BTreeSet<i64>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert if absent, remove if present. Returns whether the id is a
    /// favorite afterwards.
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn remove(&mut self, id: i64) -> bool {
        self.ids.remove(&id)
    }

    /// Drop every id not present in `valid_ids`. Returns how many were
    /// dropped. Invoked after delete/clear and at load so no dangling
    /// favorite id ever persists.
    pub fn prune(&mut self, valid_ids: impl IntoIterator<Item = i64>) -> usize {
        let valid: BTreeSet<i64> = valid_ids.into_iter().collect();
        let before = self.ids.len();
        self.ids.retain(|id| valid.contains(id));
        before - self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_a_set_operation() {
        let mut favs = FavoriteSet::new();
        assert!(favs.toggle(7));
        assert!(favs.contains(7));
        // toggling again removes, never duplicates
        assert!(!favs.toggle(7));
        assert!(!favs.contains(7));
        assert!(favs.is_empty());
    }

    #[test]
    fn prune_drops_dangling_ids() {
        let mut favs = FavoriteSet::new();
        favs.toggle(1);
        favs.toggle(2);
        favs.toggle(3);

        let dropped = favs.prune([2]);
        assert_eq!(dropped, 2);
        assert!(favs.contains(2));
        assert_eq!(favs.len(), 1);
    }

    #[test]
    fn serializes_as_id_array() {
        let mut favs = FavoriteSet::new();
        favs.toggle(5);
        favs.toggle(3);

        let json = serde_json::to_string(&favs).unwrap();
        assert_eq!(json, "[3,5]");

        let back: FavoriteSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, favs);
    }
}
