//! A key collection over a fixed, caller-supplied list of keys.

use crate::traits::{KeyCollection, Keys};

/// Keys given up front rather than discovered from a backend.
///
/// Iteration yields the keys in the order they were given. Count and
/// membership are answered from the list directly without starting a
/// traversal.
///
/// ```rust
/// use keyshape_core_store::{ExplicitKeys, KeyCollection};
///
/// let keys = ExplicitKeys::new(vec!["config.json", "data.csv"]);
/// assert_eq!(keys.count(), 2);
/// assert!(keys.contains_key(&"data.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExplicitKeys<K> {
    keys: Vec<K>,
}

impl<K> ExplicitKeys<K> {
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn as_slice(&self) -> &[K] {
        &self.keys
    }
}

impl<K> FromIterator<K> for ExplicitKeys<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<K: PartialEq + Clone> KeyCollection for ExplicitKeys<K> {
    type Key = K;

    fn iter_keys(&self) -> Keys<'_, K> {
        Box::new(self.keys.iter().cloned())
    }

    fn count(&self) -> usize {
        self.keys.len()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.keys.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_given_order() {
        let keys: ExplicitKeys<u32> = [3, 1, 2].into_iter().collect();
        assert_eq!(keys.iter_keys().collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn overrides_agree_with_iteration() {
        let keys = ExplicitKeys::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(keys.count(), keys.iter_keys().count());
        assert!(keys.contains_key(&"a".to_string()));
        assert!(!keys.contains_key(&"c".to_string()));
    }

    #[test]
    fn empty() {
        let keys: ExplicitKeys<String> = ExplicitKeys::default();
        assert_eq!(keys.count(), 0);
        assert!(keys.as_slice().is_empty());
    }
}
