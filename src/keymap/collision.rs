//! Multimap from canonical accelerator to the bindings that use it.
//!
//! Every binding's bucket memberships are tracked alongside the buckets, so
//! removing or reindexing a binding always clears each bucket it occupied.

use super::accelerator::Accelerator;
use super::binding::BindingKey;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Default)]
pub struct CollisionIndex {
    buckets: BTreeMap<String, BTreeSet<BindingKey>>,
    occupied: HashMap<BindingKey, BTreeSet<String>>,
}

impl CollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<'a, I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (BindingKey, &'a [String])>,
    {
        let mut index = Self::new();
        for (key, entries) in bindings {
            index.insert(key, entries);
        }
        index
    }

    pub fn insert(&mut self, key: BindingKey, entries: &[String]) {
        for entry in entries {
            let accel = Accelerator::parse(entry);
            if accel.is_null() {
                continue;
            }
            let canonical = accel.canonical().to_string();
            self.buckets
                .entry(canonical.clone())
                .or_default()
                .insert(key);
            self.occupied.entry(key).or_default().insert(canonical);
        }
    }

    pub fn remove(&mut self, key: BindingKey) {
        let Some(canonicals) = self.occupied.remove(&key) else {
            return;
        };
        for canonical in canonicals {
            if let Some(bucket) = self.buckets.get_mut(&canonical) {
                bucket.remove(&key);
                if bucket.is_empty() {
                    self.buckets.remove(&canonical);
                }
            }
        }
    }

    pub fn reindex(&mut self, key: BindingKey, entries: &[String]) {
        self.remove(key);
        self.insert(key, entries);
    }

    /// Bindings using `accel`, matched under accelerator equality.
    pub fn holders(&self, accel: &str) -> Vec<BindingKey> {
        let accel = Accelerator::parse(accel);
        if accel.is_null() {
            return Vec::new();
        }
        self.buckets
            .get(accel.canonical())
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn accelerators_of(&self, key: BindingKey) -> Vec<String> {
        self.occupied
            .get(&key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Buckets holding two or more bindings, in accelerator order.
    pub fn collisions(&self) -> Vec<(String, Vec<BindingKey>)> {
        self.buckets
            .iter()
            .filter(|(_, bucket)| bucket.len() > 1)
            .map(|(canonical, bucket)| (canonical.clone(), bucket.iter().copied().collect()))
            .collect()
    }

    pub fn contains(&self, key: BindingKey) -> bool {
        self.occupied.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn aliases_share_one_bucket() {
        let a = entries(&["<Control>d", "", ""]);
        let b = entries(&["<Primary>d"]);
        let index = CollisionIndex::build([(BindingKey(1), a.as_slice()), (BindingKey(2), b.as_slice())]);
        assert_eq!(index.holders("<Ctrl>D"), vec![BindingKey(1), BindingKey(2)]);
        assert_eq!(
            index.collisions(),
            vec![("<Primary>d".to_string(), vec![BindingKey(1), BindingKey(2)])]
        );
    }

    #[test]
    fn reindex_leaves_other_holder_in_place() {
        let mut index = CollisionIndex::new();
        index.insert(BindingKey(1), &entries(&["<Super>d", "<Super>e"]));
        index.insert(BindingKey(2), &entries(&["<Super>d"]));

        index.reindex(BindingKey(1), &entries(&["<Super>f", ""]));

        assert_eq!(index.holders("<Super>d"), vec![BindingKey(2)]);
        assert!(index.holders("<Super>e").is_empty());
        assert_eq!(index.holders("<Super>f"), vec![BindingKey(1)]);
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn remove_clears_every_bucket() {
        let mut index = CollisionIndex::new();
        index.insert(BindingKey(7), &entries(&["<Alt>F1", "<Alt>F2", "junk"]));
        assert_eq!(index.accelerators_of(BindingKey(7)).len(), 2);
        index.remove(BindingKey(7));
        assert!(index.is_empty());
        assert!(!index.contains(BindingKey(7)));
        index.remove(BindingKey(7));
    }

    #[test]
    fn empty_slots_are_not_indexed() {
        let index = CollisionIndex::build([(BindingKey(1), entries(&["", ""]).as_slice())]);
        assert!(index.is_empty());
        assert!(index.holders("").is_empty());
    }
}
