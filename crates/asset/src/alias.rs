//! Stable partitioning of items by a derived key.

use std::collections::HashMap;
use std::hash::Hash;

/// Items sharing one key, in their original relative order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasGroup<K, T> {
    pub key: K,
    pub members: Vec<T>,
}

impl<K, T> AliasGroup<K, T> {
    /// More than one member: the group describes an array asset.
    pub fn is_array(&self) -> bool {
        self.members.len() > 1
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition `items` by `key_of`.
///
/// Keys are computed for every item first, then items are distributed. Groups
/// appear in first-seen key order; nothing is reordered within a group.
pub fn group_by<T, K, F>(items: impl IntoIterator<Item = T>, key_of: F) -> Vec<AliasGroup<K, T>>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let keyed: Vec<(K, T)> = items
        .into_iter()
        .map(|item| (key_of(&item), item))
        .collect();

    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<AliasGroup<K, T>> = Vec::new();

    for (key, item) in keyed {
        match slots.get(&key) {
            Some(&slot) => groups[slot].members.push(item),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push(AliasGroup {
                    key,
                    members: vec![item],
                });
            }
        }
    }

    groups
}
